//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories

use crate::models::{Exercise, LogEntry};
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn mock_exercise(id: i64, name: &str, muscle: &str) -> Exercise {
  Exercise::new(id, name, muscle)
}

/// A stored log entry; ids and timestamps are derived from the arguments
pub fn mock_log_entry(exercise_id: i64, load: f64, reps: i64) -> LogEntry {
  LogEntry {
    id: Some(exercise_id * 1000 + reps),
    exercise_id,
    load,
    reps,
    logged_at: Some("2025-01-15T10:00:00+00:00".to_string()),
  }
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> =
      sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = 'kv_store'")
        .fetch_all(&pool)
        .await
        .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let exercise = mock_exercise(1, "Supino Reto", "Peitoral");
    assert_eq!(exercise.muscle, "Peitoral");

    let entry = mock_log_entry(1, 80.0, 10);
    assert_eq!(entry.exercise_id, 1);
    assert!(entry.logged_at.is_some());
  }
}

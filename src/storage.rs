//! Persistent key-value storage
//!
//! JSON values keyed by string, kept in the local SQLite database. Reads
//! never fail: a missing key, a read error or a value that no longer
//! deserializes all produce the caller's default.

use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Storage path error: {0}")]
  Path(String),
}

impl Serialize for StorageError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

#[derive(Clone)]
pub struct KeyValueStore {
  pool: DbPool,
}

impl KeyValueStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }

  /// Store `value` as JSON under `key`. Returns false when it could not be saved.
  pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
    match self.try_save(key, value).await {
      Ok(()) => true,
      Err(e) => {
        error!("Failed to save '{}' to storage: {}", key, e);
        false
      }
    }
  }

  async fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    sqlx::query(
      r#"
      INSERT INTO kv_store (key, value, updated_at)
      VALUES (?1, ?2, CURRENT_TIMESTAMP)
      ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
      "#,
    )
    .bind(key)
    .bind(json)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  pub async fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
    let raw = match self.raw(key).await {
      Ok(Some(raw)) => raw,
      Ok(None) => return default,
      Err(e) => {
        error!("Failed to read '{}' from storage: {}", key, e);
        return default;
      }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
      warn!("Stored value for '{}' is not usable: {}", key, e);
      default
    })
  }

  pub async fn raw(&self, key: &str) -> Result<Option<String>, StorageError> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
      .bind(key)
      .fetch_optional(&self.pool)
      .await?;
    Ok(value)
  }

  pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM kv_store WHERE key = ?1")
      .bind(key)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

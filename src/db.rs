use log::info;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tauri::Manager;

use crate::admin::EditWorkoutForm;
use crate::api::FitLogApi;
use crate::history::HistoryView;
use crate::registration::RegistrationForm;
use crate::search::ExerciseSearch;
use crate::storage::{KeyValueStore, StorageError};
use crate::supabase::SupabaseClient;
use crate::toast::ToastCenter;

pub type DbPool = SqlitePool;

/// Application state: one instance of every component.
pub struct AppState {
  pub store: KeyValueStore,
  pub toasts: ToastCenter,
  pub backend: Arc<SupabaseClient>,
  pub api: Arc<FitLogApi>,
  pub history: HistoryView,
  pub search: ExerciseSearch<FitLogApi>,
  pub registration: Mutex<RegistrationForm>,
  pub edit_form: tokio::sync::Mutex<EditWorkoutForm>,
}

/// Get the path to the database file
/// Stored in the platform app data dir, e.g. ~/.local/share/com.fitlog.desktop/fitlog.db
fn get_db_path<R: tauri::Runtime>(app: &tauri::AppHandle<R>) -> Result<PathBuf, StorageError> {
  let data_dir = app
    .path()
    .app_data_dir()
    .map_err(|e| StorageError::Path(format!("Failed to get app data dir: {}", e)))?;

  fs::create_dir_all(&data_dir).map_err(|e| StorageError::Path(e.to_string()))?;

  Ok(data_dir.join("fitlog.db"))
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db<R: tauri::Runtime>(
  app: &tauri::AppHandle<R>,
) -> Result<DbPool, StorageError> {
  let db_path = get_db_path(app)?;
  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  info!("Initializing database at: {}", db_path.display());

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}

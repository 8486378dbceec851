use crate::db::AppState;
use crate::storage::StorageError;
use serde_json::Value;
use std::sync::Arc;
use tauri::State;

/// Returns false when the value could not be saved
#[tauri::command]
pub async fn storage_save(
  state: State<'_, Arc<AppState>>,
  key: String,
  value: Value,
) -> Result<bool, StorageError> {
  Ok(state.store.save(&key, &value).await)
}

/// The stored value, or `default` when there is none usable
#[tauri::command]
pub async fn storage_load(
  state: State<'_, Arc<AppState>>,
  key: String,
  default: Option<Value>,
) -> Result<Value, StorageError> {
  Ok(state.store.load(&key, default.unwrap_or(Value::Null)).await)
}

#[tauri::command]
pub async fn storage_remove(state: State<'_, Arc<AppState>>, key: String) -> Result<(), StorageError> {
  state.store.remove(&key).await
}

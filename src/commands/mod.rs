pub mod admin;
pub mod catalog;
pub mod registration;
pub mod search;
pub mod storage;

use crate::db::AppState;
use crate::toast::{Toast, ToastKind};
use crate::util;
use std::sync::Arc;
use std::time::Duration;
use tauri::State;

/// ---------------------------------------------------------------------------
/// Toasts
/// ---------------------------------------------------------------------------

/// Async so the auto-dismiss timer has a runtime to run on
#[tauri::command]
pub async fn show_toast(
  state: State<'_, Arc<AppState>>,
  message: String,
  kind: Option<ToastKind>,
  duration_ms: Option<u64>,
) -> Result<u64, String> {
  let kind = kind.unwrap_or(ToastKind::Info);
  let id = match duration_ms {
    Some(ms) => state.toasts.show_for(message, kind, Duration::from_millis(ms)),
    None => state.toasts.show(message, kind),
  };
  Ok(id)
}

#[tauri::command]
pub fn dismiss_toast(state: State<'_, Arc<AppState>>, id: u64) -> bool {
  state.toasts.dismiss(id)
}

#[tauri::command]
pub fn get_active_toasts(state: State<'_, Arc<AppState>>) -> Vec<Toast> {
  state.toasts.active()
}

/// ---------------------------------------------------------------------------
/// Formatting Helpers
/// ---------------------------------------------------------------------------

#[tauri::command]
pub fn format_number(value: Option<f64>, decimals: Option<usize>) -> String {
  util::format_number(value, decimals.unwrap_or(1))
}

#[tauri::command]
pub fn format_date(date: String) -> String {
  util::format_date(&date)
}

#[tauri::command]
pub fn strip_accents(text: String) -> String {
  util::strip_accents(&text)
}

/// Whether mutating server requests carry a CSRF token
#[tauri::command]
pub fn get_csrf_status(state: State<'_, Arc<AppState>>) -> bool {
  state.api.guard().is_active()
}

mod admin;
mod api;
mod commands;
mod config;
mod csrf;
mod db;
mod history;
mod logging;
mod models;
mod registration;
mod search;
mod stats;
mod storage;
mod supabase;
mod toast;
mod util;

#[cfg(test)]
mod test_utils;

use api::FitLogApi;
use config::FitLogConfig;
use db::AppState;
use history::HistoryView;
use log::{info, warn};
use registration::RegistrationForm;
use search::{ExerciseSearch, SearchCallbacks, SearchConfig};
use serde::Serialize;
use std::error::Error;
use std::sync::{Arc, Mutex};
use storage::KeyValueStore;
use supabase::SupabaseClient;
use tauri::{AppHandle, Emitter, Manager, Runtime};
use toast::ToastCenter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let level = logging::level_from_env();
  if !logging::init(&level) {
    logging::init(logging::DEFAULT_LEVEL);
    warn!("Unknown log level '{}', using {}", level, logging::DEFAULT_LEVEL);
  }

  tauri::Builder::default()
    .setup(|app| {
      let config = FitLogConfig::from_env()?;
      let app_handle = app.handle().clone();
      let state = tauri::async_runtime::block_on(build_state(&app_handle, &config))?;
      app.manage(Arc::new(state));
      info!("FitLog ready (server {})", config.server_url);
      Ok(())
    })
    .invoke_handler(tauri::generate_handler![
      commands::show_toast,
      commands::dismiss_toast,
      commands::get_active_toasts,
      commands::format_number,
      commands::format_date,
      commands::strip_accents,
      commands::get_csrf_status,
      // Exercise history
      commands::catalog::load_exercises,
      commands::catalog::get_exercise_cards,
      commands::catalog::log_set,
      commands::catalog::get_muscle_summary,
      // Catalog search
      commands::search::search_input,
      commands::search::search_view,
      commands::search::search_load_more,
      commands::search::search_select,
      commands::search::search_clear,
      // Workout registration
      commands::registration::registration_open,
      commands::registration::registration_rows,
      commands::registration::registration_set_field,
      commands::registration::registration_load_last,
      commands::registration::registration_validate,
      commands::registration::registration_submit,
      // Admin
      commands::admin::edit_workout_open,
      commands::admin::edit_workout_check_id,
      commands::admin::edit_workout_close,
      commands::admin::deletion_prompt,
      commands::admin::delete_item,
      commands::admin::edit_exercise,
      commands::admin::create_workout,
      // Storage
      commands::storage::storage_save,
      commands::storage::storage_load,
      commands::storage::storage_remove,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}

/// ---------------------------------------------------------------------------
/// State Wiring
/// ---------------------------------------------------------------------------

fn emit<R: Runtime, S: Serialize + Clone>(app: &AppHandle<R>, event: &str, payload: S) {
  if let Err(e) = app.emit(event, payload) {
    warn!("Failed to emit {}: {}", event, e);
  }
}

async fn build_state<R: Runtime>(
  app: &AppHandle<R>,
  config: &FitLogConfig,
) -> Result<AppState, Box<dyn Error>> {
  let pool = db::initialize_db(app).await?;

  let toasts = ToastCenter::new(config.toast_duration);
  let handle = app.clone();
  toasts.subscribe(move |event| emit(&handle, "toast", event));

  let backend = Arc::new(SupabaseClient::new(&config.supabase_url, &config.supabase_key));
  let api = Arc::new(FitLogApi::connect(&config.server_url, &config.csrf_page).await?);

  let on_select = app.clone();
  let on_error = app.clone();
  let on_update = app.clone();
  let callbacks = SearchCallbacks::new()
    .on_select(move |exercise| emit(&on_select, "search://selected", exercise))
    .on_error(move |error| emit(&on_error, "search://error", error.to_string()))
    .on_update(move |view| emit(&on_update, "search://updated", view));

  let search = ExerciseSearch::new(
    api.clone(),
    SearchConfig {
      debounce: config.search_debounce,
      page_size: config.search_page_size,
      ..SearchConfig::default()
    },
    callbacks,
  );

  Ok(AppState {
    store: KeyValueStore::new(pool),
    history: HistoryView::new(backend.clone(), toasts.clone()),
    toasts,
    backend,
    api,
    search,
    registration: Mutex::new(RegistrationForm::default()),
    edit_form: tokio::sync::Mutex::new(Default::default()),
  })
}

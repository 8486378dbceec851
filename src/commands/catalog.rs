use crate::db::AppState;
use crate::history::ExerciseCard;
use crate::models::NewLogEntry;
use crate::stats::{muscle_summary, MuscleSummary};
use crate::supabase::BackendError;
use std::sync::Arc;
use tauri::State;

/// ---------------------------------------------------------------------------
/// Exercise History
/// ---------------------------------------------------------------------------

/// Fetch the catalog and every exercise's last set
#[tauri::command]
pub async fn load_exercises(
  state: State<'_, Arc<AppState>>,
) -> Result<Vec<ExerciseCard>, BackendError> {
  state.history.load().await
}

/// Cards from the last completed load, without fetching
#[tauri::command]
pub fn get_exercise_cards(state: State<'_, Arc<AppState>>) -> Vec<ExerciseCard> {
  state.history.cards()
}

#[tauri::command]
pub async fn log_set(
  state: State<'_, Arc<AppState>>,
  exercise_id: i64,
  load: String,
  reps: String,
) -> Result<NewLogEntry, BackendError> {
  state.history.submit(exercise_id, &load, &reps).await
}

/// ---------------------------------------------------------------------------
/// Statistics
/// ---------------------------------------------------------------------------

#[tauri::command]
pub async fn get_muscle_summary(
  state: State<'_, Arc<AppState>>,
) -> Result<Vec<MuscleSummary>, BackendError> {
  let (exercises, logs) = tokio::try_join!(
    state.backend.list_exercises(),
    state.backend.list_logs()
  )?;
  Ok(muscle_summary(&exercises, &logs))
}

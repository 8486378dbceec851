use crate::db::AppState;
use crate::registration::{
  submit_entries, ExerciseRow, PreviousValues, RegistrationError, RegistrationForm,
};
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tauri::State;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowField {
  Load,
  Reps,
  Sets,
}

fn form(mutex: &Mutex<RegistrationForm>) -> MutexGuard<'_, RegistrationForm> {
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Start a fresh form from the loaded exercise list
#[tauri::command]
pub fn registration_open(state: State<'_, Arc<AppState>>) -> Vec<ExerciseRow> {
  let rows: Vec<ExerciseRow> = state
    .history
    .cards()
    .into_iter()
    .map(|card| {
      let previous = card.previous.map(PreviousValues::from);
      ExerciseRow::new(card.exercise.id, &card.exercise.name, previous)
    })
    .collect();

  let mut form = form(&state.registration);
  *form = RegistrationForm::new(rows);
  form.rows().to_vec()
}

#[tauri::command]
pub fn registration_rows(state: State<'_, Arc<AppState>>) -> Vec<ExerciseRow> {
  form(&state.registration).rows().to_vec()
}

/// Update one input; the row comes back with its volume recomputed
#[tauri::command]
pub fn registration_set_field(
  state: State<'_, Arc<AppState>>,
  exercise_id: i64,
  field: RowField,
  text: String,
) -> Result<ExerciseRow, RegistrationError> {
  let mut form = form(&state.registration);
  let row = match field {
    RowField::Load => form.set_load(exercise_id, &text)?,
    RowField::Reps => form.set_reps(exercise_id, &text)?,
    RowField::Sets => form.set_sets(exercise_id, &text)?,
  };
  Ok(row.clone())
}

#[tauri::command]
pub async fn registration_load_last(
  state: State<'_, Arc<AppState>>,
) -> Result<Vec<ExerciseRow>, String> {
  let mut form = form(&state.registration);
  form.load_last_values(&state.toasts);
  Ok(form.rows().to_vec())
}

/// Flag partial rows. Returns the flagged exercise ids.
#[tauri::command]
pub fn registration_validate(state: State<'_, Arc<AppState>>) -> Vec<i64> {
  form(&state.registration).validate()
}

/// Validate, then insert one entry per filled row. Returns how many were saved.
#[tauri::command]
pub async fn registration_submit(state: State<'_, Arc<AppState>>) -> Result<usize, RegistrationError> {
  let entries = form(&state.registration).prepare_submission(&state.toasts)?;
  submit_entries(&state.backend, &state.toasts, &entries).await
}

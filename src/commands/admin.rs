use crate::admin::{
  self, confirm_and_delete, CreateWorkoutOutcome, DeletionRequest, DeletionTarget, EditWorkoutForm,
};
use crate::api::ApiError;
use crate::db::AppState;
use std::sync::Arc;
use tauri::State;

/// ---------------------------------------------------------------------------
/// Edit Workout Modal
/// ---------------------------------------------------------------------------

#[tauri::command]
pub async fn edit_workout_open(
  state: State<'_, Arc<AppState>>,
  original_id: String,
  code: String,
  name: String,
  description: String,
) -> Result<EditWorkoutForm, String> {
  let mut form = state.edit_form.lock().await;
  form.open(&original_id, &code, &name, &description);
  Ok(form.clone())
}

/// Returns the alert text while the edited id is taken
#[tauri::command]
pub async fn edit_workout_check_id(
  state: State<'_, Arc<AppState>>,
  new_id: String,
) -> Result<Option<String>, String> {
  let mut form = state.edit_form.lock().await;
  Ok(form.check_id(&state.api, &new_id).await)
}

#[tauri::command]
pub async fn edit_workout_close(state: State<'_, Arc<AppState>>) -> Result<(), String> {
  state.edit_form.lock().await.close();
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Deletion
/// ---------------------------------------------------------------------------

/// The question to put to the user before deleting. `label` is the
/// workout description or the exercise name.
#[tauri::command]
pub fn deletion_prompt(target: DeletionTarget, id: String, label: String) -> DeletionRequest {
  match target {
    DeletionTarget::Workout => DeletionRequest::workout(&id, &label),
    DeletionTarget::Exercise => DeletionRequest::exercise(&id, &label),
  }
}

/// `confirmed` is the webview's answer to the prompt. Returns whether the
/// deletion was issued.
#[tauri::command]
pub async fn delete_item(
  state: State<'_, Arc<AppState>>,
  request: DeletionRequest,
  confirmed: bool,
) -> Result<bool, ApiError> {
  let answer = move |_: &str| confirmed;
  confirm_and_delete(&state.api, &request, &answer).await
}

/// ---------------------------------------------------------------------------
/// Exercises and Workouts
/// ---------------------------------------------------------------------------

#[tauri::command]
pub async fn edit_exercise(
  state: State<'_, Arc<AppState>>,
  id: i64,
  name: String,
  muscle: String,
  workout: String,
) -> Result<(), String> {
  admin::edit_exercise(&state.toasts, id, &name, &muscle, &workout);
  Ok(())
}

#[tauri::command]
pub async fn create_workout(
  state: State<'_, Arc<AppState>>,
  id: String,
  name: String,
  description: String,
) -> Result<CreateWorkoutOutcome, String> {
  Ok(admin::create_workout(&state.api, &state.toasts, &id, &name, &description).await)
}

//! Admin helpers: the edit-workout modal with live id verification,
//! confirmed deletions and workout creation.

use log::{debug, error, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::api::{ApiError, FitLogApi};
use crate::models::NewWorkout;
use crate::toast::{ToastCenter, ToastKind};

pub const EDIT_EXERCISE_MESSAGE: &str = "Funcionalidade em desenvolvimento";
pub const MISSING_FIELDS_MESSAGE: &str = "Preencha todos os campos";
pub const INVALID_ID_MESSAGE: &str = "ID deve ser uma letra maiúscula";
pub const CREATE_FAILED_MESSAGE: &str = "Erro ao criar treino";
pub const CONNECTION_MESSAGE: &str = "Erro de conexão";

static WORKOUT_ID: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Z]$").expect("workout id pattern is valid"));

/// ---------------------------------------------------------------------------
/// Edit Workout
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditWorkoutForm {
  pub original_id: String,
  pub id: String,
  pub name: String,
  pub description: String,
  pub visible: bool,
  /// Shown under the id field while the edited id is taken
  pub alert: Option<String>,
}

impl EditWorkoutForm {
  pub fn open(&mut self, original_id: &str, code: &str, name: &str, description: &str) {
    self.original_id = original_id.to_string();
    self.id = code.to_string();
    self.name = name.to_string();
    self.description = description.to_string();
    self.alert = None;
    self.visible = true;
  }

  pub fn close(&mut self) {
    self.visible = false;
  }

  /// Verify the edited id on every change. The original id never triggers a
  /// request. A failed request is logged and leaves the alert as it was.
  pub async fn check_id(&mut self, api: &FitLogApi, new_id: &str) -> Option<String> {
    let new_id = new_id.to_uppercase();
    self.id = new_id.clone();

    if new_id == self.original_id {
      self.alert = None;
      return None;
    }

    match api.workout_exists(&new_id).await {
      Ok(true) => self.alert = Some(format!("O ID \"{}\" já está em uso.", new_id)),
      Ok(false) => self.alert = None,
      Err(e) => error!("Failed to verify workout id {}: {}", new_id, e),
    }
    self.alert.clone()
  }
}

/// ---------------------------------------------------------------------------
/// Deletion
/// ---------------------------------------------------------------------------

/// Blocking yes/no question put to the user
pub trait Confirm {
  fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
  F: Fn(&str) -> bool,
{
  fn confirm(&self, prompt: &str) -> bool {
    self(prompt)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionTarget {
  Workout,
  Exercise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionRequest {
  pub target: DeletionTarget,
  pub id: String,
  pub prompt: String,
}

impl DeletionRequest {
  pub fn workout(id: &str, description: &str) -> Self {
    Self {
      target: DeletionTarget::Workout,
      id: id.to_string(),
      prompt: format!(
        "Excluir treino {}?\nIsso também excluirá todos os exercícios e registros!",
        description
      ),
    }
  }

  pub fn exercise(id: &str, name: &str) -> Self {
    Self {
      target: DeletionTarget::Exercise,
      id: id.to_string(),
      prompt: format!(
        "Excluir exercício \"{}\"?\nIsso também excluirá todos os registros!",
        name
      ),
    }
  }
}

/// Ask, then delete. Returns whether the deletion was issued.
pub async fn confirm_and_delete<C>(
  api: &FitLogApi,
  request: &DeletionRequest,
  confirm: &C,
) -> Result<bool, ApiError>
where
  C: Confirm + ?Sized,
{
  if !confirm.confirm(&request.prompt) {
    debug!("Deletion of {:?} {} declined", request.target, request.id);
    return Ok(false);
  }

  match request.target {
    DeletionTarget::Workout => api.delete_workout(&request.id).await?,
    DeletionTarget::Exercise => api.delete_exercise(&request.id).await?,
  }
  info!("Deleted {:?} {}", request.target, request.id);
  Ok(true)
}

/// ---------------------------------------------------------------------------
/// Exercises and Workouts
/// ---------------------------------------------------------------------------

pub fn edit_exercise(toasts: &ToastCenter, id: i64, name: &str, muscle: &str, workout: &str) {
  debug!("Edit exercise {} ({}, {}, {})", id, name, muscle, workout);
  toasts.show(EDIT_EXERCISE_MESSAGE, ToastKind::Info);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CreateWorkoutOutcome {
  Invalid { message: String },
  Created { id: String },
  Rejected { message: String },
  ConnectionFailed,
}

/// Check the fields, then create the workout. Every outcome is also
/// reported as a toast.
pub async fn create_workout(
  api: &FitLogApi,
  toasts: &ToastCenter,
  id: &str,
  name: &str,
  description: &str,
) -> CreateWorkoutOutcome {
  let workout = NewWorkout {
    id: id.to_uppercase().trim().to_string(),
    name: name.trim().to_string(),
    description: description.trim().to_string(),
  };

  if workout.id.is_empty() || workout.name.is_empty() || workout.description.is_empty() {
    toasts.show(MISSING_FIELDS_MESSAGE, ToastKind::Warning);
    return CreateWorkoutOutcome::Invalid {
      message: MISSING_FIELDS_MESSAGE.to_string(),
    };
  }
  if !WORKOUT_ID.is_match(&workout.id) {
    toasts.show(INVALID_ID_MESSAGE, ToastKind::Warning);
    return CreateWorkoutOutcome::Invalid {
      message: INVALID_ID_MESSAGE.to_string(),
    };
  }

  match api.create_workout(&workout).await {
    Ok(response) if response.success => {
      info!("Workout {} created", workout.id);
      toasts.show(format!("Treino {} criado!", workout.id), ToastKind::Success);
      CreateWorkoutOutcome::Created { id: workout.id }
    }
    Ok(response) => {
      let message = response
        .error
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| CREATE_FAILED_MESSAGE.to_string());
      warn!("Workout {} rejected: {}", workout.id, message);
      toasts.show(message.clone(), ToastKind::Danger);
      CreateWorkoutOutcome::Rejected { message }
    }
    Err(e) => {
      error!("Failed to create workout {}: {}", workout.id, e);
      toasts.show(CONNECTION_MESSAGE, ToastKind::Danger);
      CreateWorkoutOutcome::ConnectionFailed
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

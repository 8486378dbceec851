//! Workout registration form: per-exercise load/reps/sets inputs with live
//! volume, prefill from the previous session and paired-field validation.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::models::{LastSet, NewLogEntry};
use crate::supabase::{BackendError, SupabaseClient};
use crate::toast::{ToastCenter, ToastKind};
use crate::util::{parse_decimal, parse_integer};

pub const DEFAULT_SETS: &str = "3";
pub const INCOMPLETE_MESSAGE: &str = "Preencha carga e repetições juntos";
pub const NO_PREVIOUS_MESSAGE: &str = "Nenhum dado anterior encontrado";
pub const SAVED_MESSAGE: &str = "Treino salvo com sucesso!";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
  #[error("Preencha carga e repetições juntos")]
  Incomplete { exercise_ids: Vec<i64> },

  #[error("No row for exercise {0}")]
  UnknownRow(i64),

  #[error("Failed to save entries: {0}")]
  Backend(#[from] BackendError),
}

impl Serialize for RegistrationError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Rows
/// ---------------------------------------------------------------------------

/// Values recorded the last time the exercise was done. `sets` is only
/// known when the page embeds it; a `logs_treino` row has no set count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousValues {
  pub load: f64,
  pub reps: i64,
  pub sets: Option<i64>,
}

impl From<LastSet> for PreviousValues {
  fn from(last: LastSet) -> Self {
    Self {
      load: last.load,
      reps: last.reps,
      sets: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseRow {
  pub exercise_id: i64,
  pub name: String,
  pub load: String,
  pub reps: String,
  pub sets: String,
  pub previous: Option<PreviousValues>,
  pub volume: f64,
  pub volume_label: String,
  pub flagged: bool,
}

impl ExerciseRow {
  pub fn new(exercise_id: i64, name: &str, previous: Option<PreviousValues>) -> Self {
    let mut row = Self {
      exercise_id,
      name: name.to_string(),
      load: String::new(),
      reps: String::new(),
      sets: DEFAULT_SETS.to_string(),
      previous,
      volume: 0.0,
      volume_label: String::new(),
      flagged: false,
    };
    row.recompute();
    row
  }

  /// carga × reps × series. Unreadable load or reps count as 0, unreadable
  /// (or zero) sets as 1.
  pub fn volume(&self) -> f64 {
    let load = parse_decimal(&self.load).unwrap_or(0.0);
    let reps = parse_integer(&self.reps).unwrap_or(0);
    let sets = parse_integer(&self.sets).filter(|&s| s != 0).unwrap_or(1);
    load * reps as f64 * sets as f64
  }

  fn recompute(&mut self) {
    self.volume = self.volume();
    self.volume_label = volume_label(self.volume);
  }

  fn has_load(&self) -> bool {
    !self.load.trim().is_empty()
  }

  fn has_reps(&self) -> bool {
    !self.reps.trim().is_empty()
  }

  /// Exactly one of load/reps filled
  pub fn is_partial(&self) -> bool {
    self.has_load() != self.has_reps()
  }

  fn entry(&self) -> Option<NewLogEntry> {
    if !self.has_load() || !self.has_reps() {
      return None;
    }
    let load = self.load.trim().parse::<f64>().ok()?;
    let reps = self.reps.trim().parse::<i64>().ok()?;
    if load < 0.0 || reps < 0 || !load.is_finite() {
      return None;
    }
    Some(NewLogEntry {
      exercise_id: self.exercise_id,
      load,
      reps,
    })
  }
}

/// "1200 kg"; anything not positive renders as "0 kg"
pub fn volume_label(volume: f64) -> String {
  if volume > 0.0 {
    format!("{} kg", volume)
  } else {
    "0 kg".to_string()
  }
}

/// ---------------------------------------------------------------------------
/// Form
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistrationForm {
  rows: Vec<ExerciseRow>,
}

impl RegistrationForm {
  pub fn new(rows: Vec<ExerciseRow>) -> Self {
    Self { rows }
  }

  pub fn rows(&self) -> &[ExerciseRow] {
    &self.rows
  }

  pub fn row(&self, exercise_id: i64) -> Option<&ExerciseRow> {
    self.rows.iter().find(|r| r.exercise_id == exercise_id)
  }

  fn edit<F>(&mut self, exercise_id: i64, apply: F) -> Result<&ExerciseRow, RegistrationError>
  where
    F: FnOnce(&mut ExerciseRow),
  {
    let row = self
      .rows
      .iter_mut()
      .find(|r| r.exercise_id == exercise_id)
      .ok_or(RegistrationError::UnknownRow(exercise_id))?;
    apply(row);
    row.recompute();
    Ok(row)
  }

  pub fn set_load(&mut self, exercise_id: i64, text: &str) -> Result<&ExerciseRow, RegistrationError> {
    self.edit(exercise_id, |row| row.load = text.to_string())
  }

  pub fn set_reps(&mut self, exercise_id: i64, text: &str) -> Result<&ExerciseRow, RegistrationError> {
    self.edit(exercise_id, |row| row.reps = text.to_string())
  }

  pub fn set_sets(&mut self, exercise_id: i64, text: &str) -> Result<&ExerciseRow, RegistrationError> {
    self.edit(exercise_id, |row| row.sets = text.to_string())
  }

  /// Copy the previous session's values into every row that has them.
  /// Returns how many rows were filled.
  pub fn load_last_values(&mut self, toasts: &ToastCenter) -> usize {
    let mut loaded = 0;
    for row in &mut self.rows {
      let Some(previous) = row.previous.clone() else {
        continue;
      };
      row.load = previous.load.to_string();
      row.reps = previous.reps.to_string();
      if let Some(sets) = previous.sets {
        row.sets = sets.to_string();
      }
      row.recompute();
      loaded += 1;
    }

    if loaded > 0 {
      toasts.show(format!("{} exercícios carregados!", loaded), ToastKind::Success);
    } else {
      toasts.show(NO_PREVIOUS_MESSAGE, ToastKind::Warning);
    }
    loaded
  }

  /// Flag every partially filled row. Returns the ids of the flagged rows.
  pub fn validate(&mut self) -> Vec<i64> {
    let mut invalid = Vec::new();
    for row in &mut self.rows {
      row.flagged = row.is_partial();
      if row.flagged {
        invalid.push(row.exercise_id);
      }
    }
    invalid
  }

  /// Validate and collect one entry per fully filled row. A partial row
  /// blocks the whole submission with a single message.
  pub fn prepare_submission(
    &mut self,
    toasts: &ToastCenter,
  ) -> Result<Vec<NewLogEntry>, RegistrationError> {
    let invalid = self.validate();
    if !invalid.is_empty() {
      warn!("Submission blocked, incomplete rows: {:?}", invalid);
      toasts.show(INCOMPLETE_MESSAGE, ToastKind::Danger);
      return Err(RegistrationError::Incomplete {
        exercise_ids: invalid,
      });
    }

    Ok(self.rows.iter().filter_map(ExerciseRow::entry).collect())
  }
}

/// Insert the prepared entries one by one, stopping at the first failure.
pub async fn submit_entries(
  backend: &SupabaseClient,
  toasts: &ToastCenter,
  entries: &[NewLogEntry],
) -> Result<usize, RegistrationError> {
  for entry in entries {
    if let Err(e) = backend.insert_log(entry).await {
      error!("Failed to save entry for exercise {}: {}", entry.exercise_id, e);
      return Err(e.into());
    }
  }

  info!("Saved {} entries", entries.len());
  if !entries.is_empty() {
    toasts.show(SAVED_MESSAGE, ToastKind::Success);
  }
  Ok(entries.len())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

/// A logged set as stored in `logs_treino`. Append-only from this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
  #[serde(default)]
  pub id: Option<i64>,
  #[serde(rename = "exercicio_id")]
  pub exercise_id: i64,
  #[serde(rename = "carga")]
  pub load: f64,
  pub reps: i64,
  /// Assigned by the backend on insert
  #[serde(rename = "data", default)]
  pub logged_at: Option<String>,
}

/// For inserting new log entries (without id, timestamp)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLogEntry {
  #[serde(rename = "exercicio_id")]
  pub exercise_id: i64,
  #[serde(rename = "carga")]
  pub load: f64,
  pub reps: i64,
}

/// Most recent load/reps recorded for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastSet {
  #[serde(rename = "carga")]
  pub load: f64,
  pub reps: i64,
}

impl LastSet {
  /// Badge text, e.g. "80kg x 10"
  pub fn badge(&self) -> String {
    format!("{}kg x {}", self.load, self.reps)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_badge_drops_trailing_zero() {
    assert_eq!(LastSet { load: 80.0, reps: 10 }.badge(), "80kg x 10");
    assert_eq!(LastSet { load: 22.5, reps: 12 }.badge(), "22.5kg x 12");
  }

  #[test]
  fn test_new_entry_uses_backend_column_names() {
    let entry = NewLogEntry {
      exercise_id: 3,
      load: 80.0,
      reps: 10,
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "exercicio_id": 3, "carga": 80.0, "reps": 10 })
    );
  }
}

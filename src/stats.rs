//! Per-muscle-group totals over the catalog and the logged sets.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{Exercise, LogEntry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleSummary {
  pub muscle: String,
  pub exercises: usize,
  pub entries: usize,
  /// Σ carga × reps
  pub volume: f64,
}

/// One summary per muscle group that has at least one exercise, sorted by
/// muscle name. Entries for exercises missing from the catalog are ignored.
pub fn muscle_summary(exercises: &[Exercise], logs: &[LogEntry]) -> Vec<MuscleSummary> {
  let mut groups: BTreeMap<&str, MuscleSummary> = BTreeMap::new();
  let mut muscle_of: HashMap<i64, &str> = HashMap::new();

  for exercise in exercises {
    muscle_of.insert(exercise.id, exercise.muscle.as_str());
    groups
      .entry(exercise.muscle.as_str())
      .or_insert_with(|| MuscleSummary {
        muscle: exercise.muscle.clone(),
        exercises: 0,
        entries: 0,
        volume: 0.0,
      })
      .exercises += 1;
  }

  for log in logs {
    let Some(summary) = muscle_of
      .get(&log.exercise_id)
      .and_then(|muscle| groups.get_mut(muscle))
    else {
      continue;
    };
    summary.entries += 1;
    summary.volume += log.load * log.reps as f64;
  }

  groups.into_values().collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{mock_exercise, mock_log_entry};

  #[test]
  fn test_summary_groups_and_sorts_by_muscle() {
    let exercises = vec![
      mock_exercise(1, "Supino Reto", "Peitoral"),
      mock_exercise(2, "Agachamento", "Quadríceps"),
      mock_exercise(3, "Crucifixo", "Peitoral"),
      mock_exercise(4, "Remada", "Costas"),
    ];
    let logs = vec![
      mock_log_entry(1, 80.0, 10),
      mock_log_entry(1, 82.5, 8),
      mock_log_entry(3, 20.0, 12),
      mock_log_entry(2, 100.0, 5),
      // Not in the catalog
      mock_log_entry(99, 50.0, 10),
    ];

    let summary = muscle_summary(&exercises, &logs);
    let muscles: Vec<&str> = summary.iter().map(|s| s.muscle.as_str()).collect();
    assert_eq!(muscles, vec!["Costas", "Peitoral", "Quadríceps"]);

    assert_eq!(
      summary[1],
      MuscleSummary {
        muscle: "Peitoral".into(),
        exercises: 2,
        entries: 3,
        volume: 800.0 + 660.0 + 240.0,
      }
    );
    // Exercise without logs still counts
    assert_eq!(summary[0].exercises, 1);
    assert_eq!(summary[0].entries, 0);
    assert_eq!(summary[0].volume, 0.0);
  }

  #[test]
  fn test_empty_catalog() {
    assert!(muscle_summary(&[], &[mock_log_entry(1, 10.0, 10)]).is_empty());
  }
}

//! Exercise list with the "Anterior" (previous set) badge, and logging a new set.

use log::{debug, error, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinSet;

use crate::models::{Exercise, LastSet, NewLogEntry};
use crate::supabase::{BackendError, SupabaseClient};
use crate::toast::{ToastCenter, ToastKind};
use crate::util::{parse_decimal, parse_integer};

pub const SAVED_MESSAGE: &str = "Carga registrada!";

/// One exercise as rendered, with its previous set when there is one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseCard {
  #[serde(flatten)]
  pub exercise: Exercise,
  pub previous: Option<LastSet>,
  pub badge: Option<String>,
}

#[derive(Default)]
struct HistoryState {
  generation: u64,
  exercises: Vec<Exercise>,
  previous: HashMap<i64, LastSet>,
}

impl HistoryState {
  fn cards(&self) -> Vec<ExerciseCard> {
    self
      .exercises
      .iter()
      .map(|exercise| {
        let previous = self.previous.get(&exercise.id).cloned();
        ExerciseCard {
          exercise: exercise.clone(),
          badge: previous.as_ref().map(LastSet::badge),
          previous,
        }
      })
      .collect()
  }
}

#[derive(Clone)]
pub struct HistoryView {
  backend: Arc<SupabaseClient>,
  toasts: ToastCenter,
  state: Arc<Mutex<HistoryState>>,
}

impl HistoryView {
  pub fn new(backend: Arc<SupabaseClient>, toasts: ToastCenter) -> Self {
    Self {
      backend,
      toasts,
      state: Arc::new(Mutex::new(HistoryState::default())),
    }
  }

  /// Fetch the catalog, then every exercise's newest entry concurrently.
  /// Results belonging to a load that has since been superseded are ignored.
  pub async fn load(&self) -> Result<Vec<ExerciseCard>, BackendError> {
    let generation = self.begin_load();

    let exercises = self.backend.list_exercises().await?;
    if !self.apply_catalog(generation, &exercises) {
      return Ok(self.cards());
    }

    let mut tasks = JoinSet::new();
    for exercise in &exercises {
      let backend = self.backend.clone();
      let id = exercise.id;
      tasks.spawn(async move { (id, backend.latest_log(id).await) });
    }

    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok((id, Ok(Some(last)))) => self.apply_previous(generation, id, last),
        Ok((_, Ok(None))) => {}
        Ok((id, Err(e))) => warn!("Could not load last set for exercise {}: {}", id, e),
        Err(e) => error!("History fetch task failed: {}", e),
      }
    }

    info!("Loaded {} exercises", exercises.len());
    Ok(self.cards())
  }

  /// Start a new load; every earlier generation is superseded from here on
  fn begin_load(&self) -> u64 {
    let mut state = self.lock();
    state.generation += 1;
    state.generation
  }

  /// Replace the catalog and clear the badges, unless `generation` is stale
  fn apply_catalog(&self, generation: u64, exercises: &[Exercise]) -> bool {
    let mut state = self.lock();
    if state.generation != generation {
      debug!("catalog load #{} superseded", generation);
      return false;
    }
    state.exercises = exercises.to_vec();
    state.previous.clear();
    true
  }

  fn apply_previous(&self, generation: u64, exercise_id: i64, last: LastSet) {
    let mut state = self.lock();
    if state.generation == generation {
      state.previous.insert(exercise_id, last);
    } else {
      debug!("dropping last set of exercise {} from load #{}", exercise_id, generation);
    }
  }

  pub fn cards(&self) -> Vec<ExerciseCard> {
    self.lock().cards()
  }

  pub fn previous(&self, exercise_id: i64) -> Option<LastSet> {
    self.lock().previous.get(&exercise_id).cloned()
  }

  pub fn badge(&self, exercise_id: i64) -> Option<String> {
    self.previous(exercise_id).map(|last| last.badge())
  }

  /// Log one set from the raw input texts. Text that is not a number is
  /// stored as zero. On failure nothing is shown and nothing is retried.
  pub async fn submit(
    &self,
    exercise_id: i64,
    load_text: &str,
    reps_text: &str,
  ) -> Result<NewLogEntry, BackendError> {
    let entry = NewLogEntry {
      exercise_id,
      load: parse_decimal(load_text).unwrap_or(0.0),
      reps: parse_integer(reps_text).unwrap_or(0),
    };

    match self.backend.insert_log(&entry).await {
      Ok(()) => {
        self.lock().previous.insert(
          exercise_id,
          LastSet {
            load: entry.load,
            reps: entry.reps,
          },
        );
        self.toasts.show(SAVED_MESSAGE, ToastKind::Success);
        Ok(entry)
      }
      Err(e) => {
        error!("Failed to log set for exercise {}: {}", exercise_id, e);
        Err(e)
      }
    }
  }

  fn lock(&self) -> MutexGuard<'_, HistoryState> {
    self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::mock_exercise;
  use mockito::{Matcher, Server};
  use std::time::Duration;

  async fn mock_catalog(server: &mut Server) {
    server
      .mock("GET", "/rest/v1/exercicios")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(
        r#"[{"id": 1, "nome": "Supino Reto", "musculo": "Peitoral"},
            {"id": 2, "nome": "Remada Curvada", "musculo": "Costas"}]"#,
      )
      .create_async()
      .await;
  }

  async fn mock_last(server: &mut Server, exercise_id: i64, body: &str) {
    server
      .mock("GET", "/rest/v1/logs_treino")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("exercicio_id".into(), format!("eq.{}", exercise_id)),
        Matcher::UrlEncoded("order".into(), "data.desc".into()),
        Matcher::UrlEncoded("limit".into(), "1".into()),
      ]))
      .with_status(200)
      .with_body(body)
      .create_async()
      .await;
  }

  fn view(server: &Server) -> (HistoryView, ToastCenter) {
    let toasts = ToastCenter::new(Duration::from_secs(3));
    let backend = Arc::new(SupabaseClient::new(&server.url(), "anon-key"));
    (HistoryView::new(backend, toasts.clone()), toasts)
  }

  #[tokio::test]
  async fn test_load_badges_from_newest_entry() {
    let mut server = Server::new_async().await;
    mock_catalog(&mut server).await;
    mock_last(&mut server, 1, r#"[{"carga": 80, "reps": 10}]"#).await;
    mock_last(&mut server, 2, "[]").await;

    let (history, _) = view(&server);
    let cards = history.load().await.unwrap();

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].badge.as_deref(), Some("80kg x 10"));
    assert_eq!(cards[0].previous, Some(LastSet { load: 80.0, reps: 10 }));
    // No prior log: no badge at all
    assert_eq!(cards[1].badge, None);
    assert_eq!(history.badge(2), None);
  }

  #[tokio::test]
  async fn test_failed_history_fetch_leaves_other_badges() {
    let mut server = Server::new_async().await;
    mock_catalog(&mut server).await;
    mock_last(&mut server, 1, r#"[{"carga": 60, "reps": 12}]"#).await;
    server
      .mock("GET", "/rest/v1/logs_treino")
      .match_query(Matcher::UrlEncoded("exercicio_id".into(), "eq.2".into()))
      .with_status(500)
      .create_async()
      .await;

    let (history, _) = view(&server);
    let cards = history.load().await.unwrap();

    assert_eq!(cards[0].badge.as_deref(), Some("60kg x 12"));
    assert_eq!(cards[1].badge, None);
  }

  #[tokio::test]
  async fn test_submit_inserts_exactly_one_row() {
    let mut server = Server::new_async().await;
    let insert = server
      .mock("POST", "/rest/v1/logs_treino")
      .match_body(Matcher::Json(serde_json::json!([
        { "exercicio_id": 7, "carga": 80.0, "reps": 10 }
      ])))
      .with_status(201)
      .expect(1)
      .create_async()
      .await;

    let (history, toasts) = view(&server);
    let entry = history.submit(7, "80", "10").await.unwrap();

    assert_eq!(
      entry,
      NewLogEntry {
        exercise_id: 7,
        load: 80.0,
        reps: 10
      }
    );
    insert.assert_async().await;
    assert_eq!(history.badge(7).as_deref(), Some("80kg x 10"));
    let shown: Vec<String> = toasts.active().into_iter().map(|t| t.message).collect();
    assert_eq!(shown, vec![SAVED_MESSAGE.to_string()]);
  }

  #[tokio::test]
  async fn test_submit_non_numeric_is_coerced_not_rejected() {
    let mut server = Server::new_async().await;
    let insert = server
      .mock("POST", "/rest/v1/logs_treino")
      .match_body(Matcher::Json(serde_json::json!([
        { "exercicio_id": 7, "carga": 0.0, "reps": 0 }
      ])))
      .with_status(201)
      .create_async()
      .await;

    let (history, _) = view(&server);
    history.submit(7, "pesado", "").await.unwrap();
    insert.assert_async().await;
  }

  #[tokio::test]
  async fn test_failed_submit_shows_no_confirmation() {
    let mut server = Server::new_async().await;
    server
      .mock("POST", "/rest/v1/logs_treino")
      .with_status(500)
      .create_async()
      .await;

    let (history, toasts) = view(&server);
    assert!(history.submit(7, "80", "10").await.is_err());
    assert!(toasts.active().is_empty());
    assert_eq!(history.badge(7), None);
  }

  #[tokio::test]
  async fn test_last_set_from_older_load_is_dropped() {
    let mut server = Server::new_async().await;
    mock_catalog(&mut server).await;
    mock_last(&mut server, 1, r#"[{"carga": 80, "reps": 10}]"#).await;
    mock_last(&mut server, 2, "[]").await;

    let (history, _) = view(&server);
    history.load().await.unwrap();
    history.load().await.unwrap();

    // A late answer from the first load arrives after the second finished
    history.apply_previous(1, 1, LastSet { load: 999.0, reps: 1 });

    assert_eq!(history.badge(1).as_deref(), Some("80kg x 10"));
    assert_eq!(history.previous(1), Some(LastSet { load: 80.0, reps: 10 }));
  }

  #[tokio::test]
  async fn test_superseded_catalog_does_not_replace_newer() {
    let server = Server::new_async().await;
    let (history, _) = view(&server);

    let first = history.begin_load();
    let second = history.begin_load();
    let newer = vec![mock_exercise(3, "Agachamento", "Pernas")];
    let older = vec![
      mock_exercise(1, "Supino Reto", "Peitoral"),
      mock_exercise(2, "Remada Curvada", "Costas"),
    ];

    assert!(history.apply_catalog(second, &newer));
    history.apply_previous(second, 3, LastSet { load: 100.0, reps: 5 });
    assert!(!history.apply_catalog(first, &older));

    let cards = history.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].exercise, newer[0]);
    assert_eq!(cards[0].badge.as_deref(), Some("100kg x 5"));
  }
}

//! Hosted database client (Supabase PostgREST)
//!
//! Only the calls the views need: the exercise catalog, the latest log entry
//! of one exercise, all log entries, and inserting a log entry.

use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;

use crate::models::{Exercise, LastSet, LogEntry, NewLogEntry};

const EXERCISES_TABLE: &str = "exercicios";
const LOGS_TABLE: &str = "logs_treino";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Backend returned {status}: {body}")]
  Status { status: u16, body: String },
}

impl Serialize for BackendError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

async fn ensure_success(response: Response) -> Result<Response, BackendError> {
  if response.status().is_success() {
    return Ok(response);
  }
  let status = response.status().as_u16();
  let body = response.text().await.unwrap_or_default();
  Err(BackendError::Status { status, body })
}

/// ---------------------------------------------------------------------------
/// Client
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SupabaseClient {
  http: Client,
  base_url: String,
  api_key: String,
}

impl SupabaseClient {
  pub fn new(base_url: &str, api_key: &str) -> Self {
    Self {
      http: Client::new(),
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key: api_key.to_string(),
    }
  }

  fn table_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.base_url, table)
  }

  fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
    builder
      .header("apikey", &self.api_key)
      .header("Authorization", format!("Bearer {}", self.api_key))
  }

  /// All catalog exercises
  pub async fn list_exercises(&self) -> Result<Vec<Exercise>, BackendError> {
    let request = self
      .http
      .get(self.table_url(EXERCISES_TABLE))
      .query(&[("select", "*")]);
    let response = self.authorized(request).send().await?;
    let exercises = ensure_success(response).await?.json().await?;
    Ok(exercises)
  }

  /// The newest entry for an exercise: ordered by timestamp, one row.
  pub async fn latest_log(&self, exercise_id: i64) -> Result<Option<LastSet>, BackendError> {
    let filter = format!("eq.{}", exercise_id);
    let request = self.http.get(self.table_url(LOGS_TABLE)).query(&[
      ("select", "carga,reps"),
      ("exercicio_id", filter.as_str()),
      ("order", "data.desc"),
      ("limit", "1"),
    ]);
    let response = self.authorized(request).send().await?;
    let mut rows: Vec<LastSet> = ensure_success(response).await?.json().await?;
    Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
  }

  /// Every log entry, newest first
  pub async fn list_logs(&self) -> Result<Vec<LogEntry>, BackendError> {
    let request = self
      .http
      .get(self.table_url(LOGS_TABLE))
      .query(&[("select", "*"), ("order", "data.desc")]);
    let response = self.authorized(request).send().await?;
    let logs = ensure_success(response).await?.json().await?;
    Ok(logs)
  }

  /// Insert exactly one log row
  pub async fn insert_log(&self, entry: &NewLogEntry) -> Result<(), BackendError> {
    debug!(
      "Inserting log for exercise {}: {} x {}",
      entry.exercise_id, entry.load, entry.reps
    );
    let request = self
      .http
      .post(self.table_url(LOGS_TABLE))
      .header("Prefer", "return=minimal")
      .json(&[entry]);
    let response = self.authorized(request).send().await?;
    ensure_success(response).await?;
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::Matcher;

  #[tokio::test]
  async fn test_list_exercises_sends_api_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("GET", "/rest/v1/exercicios")
      .match_query(Matcher::UrlEncoded("select".into(), "*".into()))
      .match_header("apikey", "anon-key")
      .match_header("authorization", "Bearer anon-key")
      .with_status(200)
      .with_body(
        r#"[{"id": 1, "nome": "Supino Reto", "musculo": "Peitoral"},
            {"id": 2, "nome": "Agachamento", "musculo": "Quadríceps"}]"#,
      )
      .create_async()
      .await;

    let client = SupabaseClient::new(&server.url(), "anon-key");
    let exercises = client.list_exercises().await.unwrap();

    assert_eq!(exercises.len(), 2);
    assert_eq!(exercises[1], Exercise::new(2, "Agachamento", "Quadríceps"));
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_latest_log_requests_one_row_newest_first() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("GET", "/rest/v1/logs_treino")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("select".into(), "carga,reps".into()),
        Matcher::UrlEncoded("exercicio_id".into(), "eq.3".into()),
        Matcher::UrlEncoded("order".into(), "data.desc".into()),
        Matcher::UrlEncoded("limit".into(), "1".into()),
      ]))
      .with_status(200)
      .with_body(r#"[{"carga": 82.5, "reps": 8}]"#)
      .create_async()
      .await;

    let client = SupabaseClient::new(&server.url(), "anon-key");
    let last = client.latest_log(3).await.unwrap();

    assert_eq!(last, Some(LastSet { load: 82.5, reps: 8 }));
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_latest_log_none_when_no_rows() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/rest/v1/logs_treino")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body("[]")
      .create_async()
      .await;

    let client = SupabaseClient::new(&server.url(), "anon-key");
    assert_eq!(client.latest_log(9).await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_insert_log_posts_single_row() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/rest/v1/logs_treino")
      .match_body(Matcher::Json(serde_json::json!([
        { "exercicio_id": 5, "carga": 80.0, "reps": 10 }
      ])))
      .with_status(201)
      .expect(1)
      .create_async()
      .await;

    let client = SupabaseClient::new(&server.url(), "anon-key");
    client
      .insert_log(&NewLogEntry {
        exercise_id: 5,
        load: 80.0,
        reps: 10,
      })
      .await
      .unwrap();

    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_insert_log_failure_status() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/rest/v1/logs_treino")
      .with_status(401)
      .with_body(r#"{"message": "JWT expired"}"#)
      .create_async()
      .await;

    let client = SupabaseClient::new(&server.url(), "anon-key");
    let err = client
      .insert_log(&NewLogEntry {
        exercise_id: 5,
        load: 80.0,
        reps: 10,
      })
      .await
      .unwrap_err();
    assert!(matches!(err, BackendError::Status { status: 401, .. }));
  }
}

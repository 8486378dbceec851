//! Client for the FitLog web server: catalog search, workout id
//! verification, workout creation and the admin deletion endpoints.

use log::{debug, warn};
use reqwest::{Client, Response};
use serde::Serialize;
use std::future::Future;

use crate::csrf::{CsrfGuard, GuardedClient};
use crate::models::{CreateWorkoutResponse, Exercise, NewWorkout, WorkoutExists};

/// ---------------------------------------------------------------------------
/// Endpoints
/// ---------------------------------------------------------------------------

const SEARCH_PATH: &str = "/api/buscar-exercicios";
const VERIFY_WORKOUT_PATH: &str = "/api/verificar-treino";
const CREATE_WORKOUT_PATH: &str = "/version/api/criar-treino";
const DELETE_WORKOUT_PATH: &str = "/admin/excluir/treino";
const DELETE_EXERCISE_PATH: &str = "/admin/excluir/exercicio";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Server returned {status}: {body}")]
  Status { status: u16, body: String },
}

impl Serialize for ApiError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
  if response.status().is_success() {
    return Ok(response);
  }
  let status = response.status().as_u16();
  let body = response.text().await.unwrap_or_default();
  Err(ApiError::Status { status, body })
}

/// ---------------------------------------------------------------------------
/// Search Source
/// ---------------------------------------------------------------------------

/// Anything that can answer a catalog search term.
pub trait SearchSource: Send + Sync + 'static {
  fn search(&self, term: &str) -> impl Future<Output = Result<Vec<Exercise>, ApiError>> + Send;
}

/// ---------------------------------------------------------------------------
/// Server Client
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FitLogApi {
  client: GuardedClient,
  base_url: String,
}

impl FitLogApi {
  pub fn new(base_url: &str, guard: CsrfGuard) -> Self {
    Self {
      client: GuardedClient::new(Client::new(), guard),
      base_url: base_url.trim_end_matches('/').to_string(),
    }
  }

  /// Fetch `page_path` once to read the CSRF token, then build the client.
  /// The client keeps the session cookie set by that page, since the token
  /// is only valid together with it. A page that cannot be loaded leaves
  /// the guard inactive.
  pub async fn connect(base_url: &str, page_path: &str) -> Result<Self, ApiError> {
    let http = Client::builder().cookie_store(true).build()?;
    let page_url = format!("{}{}", base_url.trim_end_matches('/'), page_path);

    let guard = match http.get(&page_url).send().await {
      Ok(response) => match response.text().await {
        Ok(html) => CsrfGuard::from_page(&html),
        Err(e) => {
          warn!("Could not read {}: {}", page_url, e);
          CsrfGuard::disabled()
        }
      },
      Err(e) => {
        warn!("Could not load {} for the CSRF token: {}", page_url, e);
        CsrfGuard::disabled()
      }
    };

    Ok(Self {
      client: GuardedClient::new(http, guard),
      base_url: base_url.trim_end_matches('/').to_string(),
    })
  }

  pub fn guard(&self) -> &CsrfGuard {
    self.client.guard()
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// `GET /api/buscar-exercicios?termo=<term>`
  pub async fn search_exercises(&self, term: &str) -> Result<Vec<Exercise>, ApiError> {
    debug!("Searching catalog for '{}'", term);
    let response = self
      .client
      .get(&self.url(SEARCH_PATH))
      .query(&[("termo", term)])
      .send()
      .await?;
    let exercises = ensure_success(response).await?.json().await?;
    Ok(exercises)
  }

  /// `GET /api/verificar-treino?id=<id>`
  pub async fn workout_exists(&self, id: &str) -> Result<bool, ApiError> {
    let response = self
      .client
      .get(&self.url(VERIFY_WORKOUT_PATH))
      .query(&[("id", id)])
      .send()
      .await?;
    let body: WorkoutExists = ensure_success(response).await?.json().await?;
    Ok(body.exists)
  }

  /// `POST /version/api/criar-treino`. Rejections come back as
  /// `{success: false, error}`, often with a 4xx status, so the body is read
  /// whatever the status.
  pub async fn create_workout(&self, workout: &NewWorkout) -> Result<CreateWorkoutResponse, ApiError> {
    let response = self
      .client
      .post(&self.url(CREATE_WORKOUT_PATH))
      .json(workout)
      .send()
      .await?;

    let status = response.status().as_u16();
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|_| ApiError::Status { status, body })
  }

  /// Delete a workout; the server also drops its exercises and logs.
  pub async fn delete_workout(&self, id: &str) -> Result<(), ApiError> {
    self.delete(DELETE_WORKOUT_PATH, id).await
  }

  /// Delete an exercise; the server also drops its logs.
  pub async fn delete_exercise(&self, id: &str) -> Result<(), ApiError> {
    self.delete(DELETE_EXERCISE_PATH, id).await
  }

  // The admin deletion routes are plain navigations that redirect back to
  // the admin page once done.
  async fn delete(&self, base_path: &str, id: &str) -> Result<(), ApiError> {
    let url = self.url(&format!("{}/{}", base_path, url_segment(id)));
    debug!("Deleting via {}", url);
    let response = self.client.get(&url).send().await?;
    ensure_success(response).await?;
    Ok(())
  }
}

fn url_segment(id: &str) -> String {
  url::form_urlencoded::byte_serialize(id.as_bytes())
    .collect::<String>()
    .replace('+', "%20")
}

impl SearchSource for FitLogApi {
  async fn search(&self, term: &str) -> Result<Vec<Exercise>, ApiError> {
    self.search_exercises(term).await
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

/// Payload for creating a workout (treino). `id` is a single uppercase letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkout {
  pub id: String,
  #[serde(rename = "nome")]
  pub name: String,
  #[serde(rename = "descricao")]
  pub description: String,
}

/// Response of the workout creation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWorkoutResponse {
  pub success: bool,
  #[serde(default)]
  pub error: Option<String>,
}

/// Response of the workout id verification endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExists {
  #[serde(rename = "existe")]
  pub exists: bool,
}

use serde::{Deserialize, Serialize};

/// Catalog entry. The same shape comes back from the hosted `exercicios`
/// table and from the server's catalog search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
  pub id: i64,
  #[serde(rename = "nome")]
  pub name: String,
  /// Target muscle group
  #[serde(rename = "musculo", default)]
  pub muscle: String,
}

impl Exercise {
  pub fn new(id: i64, name: &str, muscle: &str) -> Self {
    Self {
      id,
      name: name.to_string(),
      muscle: muscle.to_string(),
    }
  }
}

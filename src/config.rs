use std::env;
use std::str::FromStr;
use std::time::Duration;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
const DEFAULT_CSRF_PAGE: &str = "/";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
const DEFAULT_SEARCH_PAGE_SIZE: usize = 50;
const DEFAULT_TOAST_DURATION_MS: u64 = 3000;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  Missing(String),

  #[error("Invalid value for {name}: {value}")]
  Invalid { name: String, value: String },
}

/// ---------------------------------------------------------------------------
/// Application Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FitLogConfig {
  pub supabase_url: String,
  pub supabase_key: String,
  pub server_url: String,
  pub csrf_page: String,
  pub search_debounce: Duration,
  pub search_page_size: usize,
  pub toast_duration: Duration,
}

impl FitLogConfig {
  /// Reads the configuration from the process environment.
  /// `.env` loading is left to the caller so tests see only what they set.
  pub fn from_env() -> Result<Self, ConfigError> {
    Ok(Self {
      supabase_url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
      supabase_key: required("SUPABASE_KEY")?,
      server_url: optional("FITLOG_SERVER_URL")
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
        .trim_end_matches('/')
        .to_string(),
      csrf_page: optional("FITLOG_CSRF_PAGE").unwrap_or_else(|| DEFAULT_CSRF_PAGE.to_string()),
      search_debounce: Duration::from_millis(parsed(
        "FITLOG_SEARCH_DEBOUNCE_MS",
        DEFAULT_SEARCH_DEBOUNCE_MS,
      )?),
      search_page_size: positive("FITLOG_SEARCH_PAGE_SIZE", DEFAULT_SEARCH_PAGE_SIZE)?,
      toast_duration: Duration::from_millis(parsed(
        "FITLOG_TOAST_DURATION_MS",
        DEFAULT_TOAST_DURATION_MS,
      )?),
    })
  }
}

fn required(name: &str) -> Result<String, ConfigError> {
  optional(name).ok_or_else(|| ConfigError::Missing(name.into()))
}

fn optional(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
  match optional(name) {
    Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
      name: name.into(),
      value,
    }),
    None => Ok(default),
  }
}

/// Like [`parsed`], but zero is rejected
fn positive(name: &str, default: usize) -> Result<usize, ConfigError> {
  let value = parsed(name, default)?;
  if value == 0 {
    return Err(ConfigError::Invalid {
      name: name.into(),
      value: value.to_string(),
    });
  }
  Ok(value)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

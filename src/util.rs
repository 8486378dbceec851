//! Formatting, coercion and timing helpers shared by the views.

use chrono::NaiveDate;
use regex::Regex;
use std::future::Future;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use unicode_normalization::UnicodeNormalization;

static DECIMAL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("decimal pattern is valid")
});

static INTEGER_PREFIX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("integer pattern is valid"));

/// ---------------------------------------------------------------------------
/// Number Formatting and Coercion
/// ---------------------------------------------------------------------------

/// Fixed-decimal rendering, "-" when there is no finite number to show.
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
  match value {
    Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
    _ => "-".to_string(),
  }
}

/// Lenient decimal parse: uses the leading numeric part of the input,
/// so "82.5kg" reads as 82.5 and "kg" reads as nothing.
pub fn parse_decimal(text: &str) -> Option<f64> {
  let text = text.trim();
  DECIMAL_PREFIX
    .find(text)
    .and_then(|m| m.as_str().parse::<f64>().ok())
    .filter(|v| v.is_finite())
}

/// Lenient integer parse, same rules as [`parse_decimal`] ("10.5" reads as 10).
pub fn parse_integer(text: &str) -> Option<i64> {
  let text = text.trim();
  INTEGER_PREFIX
    .find(text)
    .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// ---------------------------------------------------------------------------
/// Text Helpers
/// ---------------------------------------------------------------------------

/// Remove diacritics: "Tríceps Pulley" -> "Triceps Pulley"
pub fn strip_accents(text: &str) -> String {
  text
    .nfd()
    .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
    .collect()
}

/// ISO date (YYYY-MM-DD) to DD/MM/YYYY. Unparseable input comes back as is.
pub fn format_date(iso: &str) -> String {
  if iso.is_empty() {
    return String::new();
  }
  match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
    Ok(date) => date.format("%d/%m/%Y").to_string(),
    Err(_) => iso.to_string(),
  }
}

/// ---------------------------------------------------------------------------
/// Debounce
/// ---------------------------------------------------------------------------

/// Runs only the last submitted job once `wait` has passed without another
/// submission. Cancelling reaches only a job that is still waiting; a job
/// whose quiet period has elapsed runs to completion.
pub struct Debouncer {
  wait: Duration,
  pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
  pub fn new(wait: Duration) -> Self {
    Self {
      wait,
      pending: Mutex::new(None),
    }
  }

  /// Must be called from within a Tokio runtime.
  pub fn call<F>(&self, job: F)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    let wait = self.wait;
    let timer = tokio::spawn(async move {
      tokio::time::sleep(wait).await;
      // Detached so a later cancel() cannot interrupt the job itself
      tokio::spawn(job);
    });

    let previous = self
      .pending
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .replace(timer);
    if let Some(previous) = previous {
      previous.abort();
    }
  }

  pub fn cancel(&self) {
    let pending = self
      .pending
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .take();
    if let Some(pending) = pending {
      pending.abort();
    }
  }
}

impl Drop for Debouncer {
  fn drop(&mut self) {
    self.cancel();
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  #[test]
  fn test_format_number() {
    assert_eq!(format_number(Some(82.456), 1), "82.5");
    assert_eq!(format_number(Some(80.0), 2), "80.00");
    assert_eq!(format_number(None, 1), "-");
    assert_eq!(format_number(Some(f64::NAN), 1), "-");
  }

  #[test]
  fn test_parse_decimal_uses_leading_number() {
    assert_eq!(parse_decimal("80"), Some(80.0));
    assert_eq!(parse_decimal(" 82.5kg"), Some(82.5));
    assert_eq!(parse_decimal(".5"), Some(0.5));
    assert_eq!(parse_decimal("kg"), None);
    assert_eq!(parse_decimal(""), None);
  }

  #[test]
  fn test_parse_integer_truncates() {
    assert_eq!(parse_integer("10"), Some(10));
    assert_eq!(parse_integer("10.7"), Some(10));
    assert_eq!(parse_integer("-3x"), Some(-3));
    assert_eq!(parse_integer("x3"), None);
  }

  #[test]
  fn test_strip_accents() {
    assert_eq!(strip_accents("Tríceps Testa"), "Triceps Testa");
    assert_eq!(strip_accents("Abdômen, Glúteos e Pescoço"), "Abdomen, Gluteos e Pescoco");
    assert_eq!(strip_accents("Supino"), "Supino");
  }

  #[test]
  fn test_format_date() {
    assert_eq!(format_date("2024-03-09"), "09/03/2024");
    assert_eq!(format_date(""), "");
    assert_eq!(format_date("09/03/2024"), "09/03/2024");
  }

  #[tokio::test(start_paused = true)]
  async fn test_debouncer_runs_only_last_job() {
    let debouncer = Debouncer::new(Duration::from_millis(300));
    let runs = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(AtomicUsize::new(0));

    for value in 1..=3 {
      let runs = runs.clone();
      let last = last.clone();
      debouncer.call(async move {
        runs.fetch_add(1, Ordering::SeqCst);
        last.store(value, Ordering::SeqCst);
      });
      tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(runs.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(250)).await;
    for _ in 0..10 {
      tokio::task::yield_now().await;
    }

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(last.load(Ordering::SeqCst), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn test_debouncer_cancel_drops_pending_job() {
    let debouncer = Debouncer::new(Duration::from_millis(300));
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = runs.clone();
    debouncer.call(async move {
      counter.fetch_add(1, Ordering::SeqCst);
    });
    debouncer.cancel();

    tokio::time::sleep(Duration::from_secs(1)).await;
    for _ in 0..10 {
      tokio::task::yield_now().await;
    }
    assert_eq!(runs.load(Ordering::SeqCst), 0);
  }
}

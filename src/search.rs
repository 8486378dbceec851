//! Search-as-you-type over the server catalog
//!
//! Keystrokes are debounced; short terms hide the panel without a request.
//! The full result list is cached and shown a page at a time. Every request
//! carries a sequence number and only the response to the newest request is
//! applied.

use log::{debug, error};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::api::{ApiError, SearchSource};
use crate::models::Exercise;
use crate::util::Debouncer;

pub const LOADING_MESSAGE: &str = "Carregando...";
pub const EMPTY_MESSAGE: &str = "Nenhum exercício encontrado";
pub const ERROR_MESSAGE: &str = "Erro ao carregar resultados";

#[derive(Debug, Clone)]
pub struct SearchConfig {
  pub min_chars: usize,
  pub debounce: Duration,
  pub page_size: usize,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      min_chars: 2,
      debounce: Duration::from_millis(300),
      page_size: 50,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Result Pagination
/// ---------------------------------------------------------------------------

/// Cached results and how many of them are on screen
#[derive(Debug, Clone)]
pub struct ResultPage {
  results: Vec<Exercise>,
  displayed: usize,
  page_size: usize,
}

impl ResultPage {
  pub fn new(page_size: usize) -> Self {
    Self {
      results: Vec::new(),
      displayed: page_size,
      page_size,
    }
  }

  pub fn replace(&mut self, results: Vec<Exercise>) {
    self.results = results;
    self.displayed = self.page_size;
  }

  pub fn clear(&mut self) {
    self.replace(Vec::new());
  }

  pub fn visible(&self) -> &[Exercise] {
    &self.results[..self.displayed.min(self.results.len())]
  }

  /// Results not yet shown, `None` once everything is visible
  pub fn remaining(&self) -> Option<usize> {
    let remaining = self.results.len().saturating_sub(self.displayed);
    (remaining > 0).then_some(remaining)
  }

  pub fn load_more(&mut self) {
    self.displayed += self.page_size;
  }

  pub fn total(&self) -> usize {
    self.results.len()
  }

  pub fn get(&self, index: usize) -> Option<&Exercise> {
    self.visible().get(index)
  }
}

/// ---------------------------------------------------------------------------
/// Rendered State
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SearchView {
  Hidden,
  Loading { message: String },
  Error { message: String },
  Empty { message: String },
  Results {
    rows: Vec<Exercise>,
    remaining: Option<usize>,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
  Hidden,
  Loading,
  Error,
  Shown,
}

struct SearchState {
  panel: Panel,
  page: ResultPage,
  latest_seq: u64,
}

/// ---------------------------------------------------------------------------
/// Callbacks
/// ---------------------------------------------------------------------------

type SelectFn = Box<dyn Fn(&Exercise) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&ApiError) + Send + Sync>;
type UpdateFn = Box<dyn Fn(&SearchView) + Send + Sync>;

/// Caller hooks: a result was picked, a fetch failed, the panel changed.
#[derive(Default)]
pub struct SearchCallbacks {
  on_select: Option<SelectFn>,
  on_error: Option<ErrorFn>,
  on_update: Option<UpdateFn>,
}

impl SearchCallbacks {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn on_select(mut self, f: impl Fn(&Exercise) + Send + Sync + 'static) -> Self {
    self.on_select = Some(Box::new(f));
    self
  }

  pub fn on_error(mut self, f: impl Fn(&ApiError) + Send + Sync + 'static) -> Self {
    self.on_error = Some(Box::new(f));
    self
  }

  pub fn on_update(mut self, f: impl Fn(&SearchView) + Send + Sync + 'static) -> Self {
    self.on_update = Some(Box::new(f));
    self
  }
}

/// ---------------------------------------------------------------------------
/// Search Controller
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InputOutcome {
  /// Term too short: panel hidden, nothing requested
  Hidden,
  /// Request `seq` will go out once the quiet period passes
  Scheduled { seq: u64 },
}

pub struct ExerciseSearch<S: SearchSource> {
  source: Arc<S>,
  config: SearchConfig,
  state: Arc<Mutex<SearchState>>,
  callbacks: Arc<SearchCallbacks>,
  debouncer: Debouncer,
}

impl<S: SearchSource> ExerciseSearch<S> {
  pub fn new(source: Arc<S>, config: SearchConfig, callbacks: SearchCallbacks) -> Self {
    let state = SearchState {
      panel: Panel::Hidden,
      page: ResultPage::new(config.page_size),
      latest_seq: 0,
    };
    Self {
      source,
      debouncer: Debouncer::new(config.debounce),
      config,
      state: Arc::new(Mutex::new(state)),
      callbacks: Arc::new(callbacks),
    }
  }

  /// Handle the input's new text. Must run inside a Tokio runtime.
  pub fn input(&self, text: &str) -> InputOutcome {
    self.debouncer.cancel();
    let term = text.trim().to_string();

    if term.chars().count() < self.config.min_chars {
      {
        let mut state = lock(&self.state);
        state.panel = Panel::Hidden;
        // Anything still in flight answers an older question now
        state.latest_seq += 1;
      }
      self.notify();
      return InputOutcome::Hidden;
    }

    let seq = {
      let mut state = lock(&self.state);
      state.panel = Panel::Loading;
      state.latest_seq += 1;
      state.latest_seq
    };
    self.notify();

    let source = self.source.clone();
    let state = self.state.clone();
    let callbacks = self.callbacks.clone();
    self.debouncer.call(async move {
      debug!("search #{} for '{}'", seq, term);
      let result = source.search(&term).await;
      apply_response(&state, &callbacks, seq, result);
    });

    InputOutcome::Scheduled { seq }
  }

  pub fn view(&self) -> SearchView {
    render(&lock(&self.state))
  }

  /// Show another page from the cache. No request is made.
  pub fn load_more(&self) -> SearchView {
    lock(&self.state).page.load_more();
    self.notify();
    self.view()
  }

  /// Pick a visible result and hand it to `on_select`. Nothing is visible
  /// while the panel is hidden, loading or showing an error.
  pub fn select(&self, index: usize) -> Option<Exercise> {
    let chosen = {
      let state = lock(&self.state);
      if state.panel != Panel::Shown {
        return None;
      }
      state.page.get(index).cloned()?
    };
    if let Some(on_select) = &self.callbacks.on_select {
      on_select(&chosen);
    }
    Some(chosen)
  }

  pub fn clear(&self) {
    lock(&self.state).page.clear();
  }

  fn notify(&self) {
    if let Some(on_update) = &self.callbacks.on_update {
      on_update(&self.view());
    }
  }
}

fn apply_response(
  state: &Mutex<SearchState>,
  callbacks: &SearchCallbacks,
  seq: u64,
  result: Result<Vec<Exercise>, ApiError>,
) {
  let view = {
    let mut state = lock(state);
    if seq < state.latest_seq {
      debug!("dropping stale search response #{} (latest #{})", seq, state.latest_seq);
      return;
    }
    match &result {
      Ok(results) => {
        state.panel = Panel::Shown;
        state.page.replace(results.clone());
      }
      Err(_) => state.panel = Panel::Error,
    }
    render(&state)
  };

  if let Err(e) = &result {
    error!("Search failed: {}", e);
    if let Some(on_error) = &callbacks.on_error {
      on_error(e);
    }
  }
  if let Some(on_update) = &callbacks.on_update {
    on_update(&view);
  }
}

fn render(state: &SearchState) -> SearchView {
  match state.panel {
    Panel::Hidden => SearchView::Hidden,
    Panel::Loading => SearchView::Loading {
      message: LOADING_MESSAGE.into(),
    },
    Panel::Error => SearchView::Error {
      message: ERROR_MESSAGE.into(),
    },
    Panel::Shown if state.page.total() == 0 => SearchView::Empty {
      message: EMPTY_MESSAGE.into(),
    },
    Panel::Shown => SearchView::Results {
      rows: state.page.visible().to_vec(),
      remaining: state.page.remaining(),
    },
  }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

//! Toast notifications
//!
//! A `ToastCenter` owns the list of visible toasts. The container is created
//! on the first `show`, each toast dismisses itself after its delay and is
//! then removed from the container. A listener (the webview bridge) is told
//! about every toast that appears or goes away.

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
  Info,
  Success,
  Warning,
  Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
  pub id: u64,
  pub message: String,
  pub kind: ToastKind,
  pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ToastEvent {
  Shown { toast: Toast },
  Dismissed { id: u64 },
}

type Listener = Arc<dyn Fn(&ToastEvent) + Send + Sync>;

struct Inner {
  container: Mutex<Option<Vec<Toast>>>,
  listener: Mutex<Option<Listener>>,
  next_id: AtomicU64,
  default_duration: Duration,
}

#[derive(Clone)]
pub struct ToastCenter {
  inner: Arc<Inner>,
}

impl ToastCenter {
  pub fn new(default_duration: Duration) -> Self {
    Self {
      inner: Arc::new(Inner {
        container: Mutex::new(None),
        listener: Mutex::new(None),
        next_id: AtomicU64::new(1),
        default_duration,
      }),
    }
  }

  pub fn subscribe<F>(&self, listener: F)
  where
    F: Fn(&ToastEvent) + Send + Sync + 'static,
  {
    *lock(&self.inner.listener) = Some(Arc::new(listener));
  }

  pub fn show(&self, message: impl Into<String>, kind: ToastKind) -> u64 {
    self.show_for(message, kind, self.inner.default_duration)
  }

  /// Show a toast that dismisses itself after `duration`. Auto-dismiss needs
  /// a Tokio runtime; without one the toast stays until `dismiss`.
  pub fn show_for(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) -> u64 {
    let toast = Toast {
      id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
      message: message.into(),
      kind,
      duration_ms: duration.as_millis() as u64,
    };
    let id = toast.id;

    debug!("toast {} ({:?}): {}", id, kind, toast.message);
    lock(&self.inner.container)
      .get_or_insert_with(Vec::new)
      .push(toast.clone());
    self.notify(&ToastEvent::Shown { toast });

    match tokio::runtime::Handle::try_current() {
      Ok(handle) => {
        let center = self.clone();
        handle.spawn(async move {
          tokio::time::sleep(duration).await;
          center.dismiss(id);
        });
      }
      Err(_) => debug!("no runtime, toast {} will not auto-dismiss", id),
    }

    id
  }

  /// Remove a toast. Returns false when it was already gone.
  pub fn dismiss(&self, id: u64) -> bool {
    let removed = {
      let mut container = lock(&self.inner.container);
      match container.as_mut() {
        Some(toasts) => {
          let before = toasts.len();
          toasts.retain(|t| t.id != id);
          toasts.len() != before
        }
        None => false,
      }
    };

    if removed {
      self.notify(&ToastEvent::Dismissed { id });
    }
    removed
  }

  pub fn active(&self) -> Vec<Toast> {
    lock(&self.inner.container).clone().unwrap_or_default()
  }

  fn notify(&self, event: &ToastEvent) {
    let listener = lock(&self.inner.listener).clone();
    if let Some(listener) = listener {
      listener(event);
    }
  }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

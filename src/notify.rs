//! User-facing notifications.
//!
//! Every notification is also logged, so failures leave a diagnostic trail
//! even when no view is showing them.

use chrono::{DateTime, Utc};

use crate::store::{Store, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
  pub level: Level,
  pub message: String,
  pub at: DateTime<Utc>,
}

/// Latest notification, observable.
#[derive(Clone, Debug)]
pub struct Notifier {
  store: Store<Notification>,
}

impl Default for Notifier {
  fn default() -> Self {
    Self::new()
  }
}

impl Notifier {
  pub fn new() -> Self {
    Self {
      store: Store::new("notification"),
    }
  }

  pub fn success(&self, message: impl Into<String>) {
    let message = message.into();
    tracing::info!("{}", message);
    self.push(Level::Success, message);
  }

  pub fn error(&self, message: impl Into<String>) {
    let message = message.into();
    tracing::warn!("{}", message);
    self.push(Level::Error, message);
  }

  fn push(&self, level: Level, message: String) {
    self.store.write(Notification {
      level,
      message,
      at: Utc::now(),
    });
  }

  pub fn latest(&self) -> Option<Notification> {
    self.store.read()
  }

  pub fn dismiss(&self) {
    self.store.reset();
  }

  pub fn subscribe<F>(&self, observer: F) -> Subscription
  where
    F: Fn(Option<&Notification>) + Send + Sync + 'static,
  {
    self.store.subscribe(observer)
  }
}

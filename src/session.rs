//! Authentication context shared by every service.
//!
//! The session lives in a `Store<Session>` so views can react to sign-in and
//! sign-out. Nothing is written to disk; a new process starts signed out
//! unless a token is supplied through the environment.

use std::fmt;

use color_eyre::{eyre::eyre, Result};

use crate::domain::Role;
use crate::store::{Store, Subscription};

/// Credentials and identity of the signed-in user.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
  pub token: String,
  pub user_id: i64,
  pub role: Role,
  pub email: String,
}

impl fmt::Debug for Session {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Session")
      .field("token", &"<redacted>")
      .field("user_id", &self.user_id)
      .field("role", &self.role)
      .field("email", &self.email)
      .finish()
  }
}

/// Handle to the process-wide session. Cheap to clone; all clones share state.
#[derive(Clone, Debug)]
pub struct AuthContext {
  store: Store<Session>,
}

impl Default for AuthContext {
  fn default() -> Self {
    Self::new()
  }
}

impl AuthContext {
  /// Signed-out context.
  pub fn new() -> Self {
    Self {
      store: Store::new("session"),
    }
  }

  /// Context that starts with the given session.
  pub fn with_session(session: Session) -> Self {
    Self {
      store: Store::with_value("session", session),
    }
  }

  /// Build a session from `AGRILINK_TOKEN`, `AGRILINK_USER_ID` and `AGRILINK_ROLE`.
  ///
  /// Returns `Ok(None)` when no token is set.
  pub fn session_from_env(email: Option<&str>) -> Result<Option<Session>> {
    let token = match std::env::var("AGRILINK_TOKEN") {
      Ok(t) if !t.trim().is_empty() => t,
      _ => return Ok(None),
    };

    let user_id = std::env::var("AGRILINK_USER_ID")
      .map_err(|_| eyre!("AGRILINK_TOKEN is set but AGRILINK_USER_ID is missing"))?
      .parse::<i64>()
      .map_err(|e| eyre!("AGRILINK_USER_ID is not a number: {}", e))?;

    let role = std::env::var("AGRILINK_ROLE")
      .ok()
      .and_then(|r| Role::parse(&r))
      .ok_or_else(|| eyre!("AGRILINK_ROLE must be one of farmer, consultant, admin"))?;

    Ok(Some(Session {
      token,
      user_id,
      role,
      email: email.unwrap_or_default().to_string(),
    }))
  }

  /// Start a session (after login).
  pub fn set(&self, session: Session) {
    tracing::info!(user_id = session.user_id, role = %session.role, "session started");
    self.store.write(session);
  }

  /// End the session (logout, or any unauthorized response).
  pub fn clear(&self) {
    if self.store.is_loaded() {
      tracing::info!("session cleared");
    }
    self.store.reset();
  }

  pub fn current(&self) -> Option<Session> {
    self.store.read()
  }

  pub fn token(&self) -> Option<String> {
    self.current().map(|s| s.token)
  }

  pub fn user_id(&self) -> Option<i64> {
    self.current().map(|s| s.user_id)
  }

  pub fn role(&self) -> Option<Role> {
    self.current().map(|s| s.role)
  }

  pub fn is_authenticated(&self) -> bool {
    self.store.is_loaded()
  }

  /// Observe sign-in and sign-out.
  pub fn subscribe<F>(&self, observer: F) -> Subscription
  where
    F: Fn(Option<&Session>) + Send + Sync + 'static,
  {
    self.store.subscribe(observer)
  }
}

#[cfg(test)]
pub(crate) fn test_session(role: Role) -> Session {
  Session {
    token: "abc".to_string(),
    user_id: 42,
    role,
    email: "grower@example.com".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn test_set_and_clear() {
    let auth = AuthContext::new();
    assert!(!auth.is_authenticated());
    assert_eq!(auth.token(), None);

    auth.set(test_session(Role::Farmer));
    assert_eq!(auth.token().as_deref(), Some("abc"));
    assert_eq!(auth.user_id(), Some(42));
    assert_eq!(auth.role(), Some(Role::Farmer));

    auth.clear();
    assert!(!auth.is_authenticated());
  }

  #[test]
  fn test_clones_share_state() {
    let auth = AuthContext::new();
    let other = auth.clone();
    auth.set(test_session(Role::Consultant));
    assert_eq!(other.role(), Some(Role::Consultant));
  }

  #[test]
  fn test_subscribers_see_sign_out() {
    let auth = AuthContext::with_session(test_session(Role::Farmer));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let _sub = {
      let seen = Arc::clone(&seen);
      auth.subscribe(move |s| seen.lock().unwrap().push(s.is_some()))
    };

    auth.clear();
    assert_eq!(*seen.lock().unwrap(), vec![true, false]);
  }

  #[test]
  fn test_debug_redacts_token() {
    let rendered = format!("{:?}", test_session(Role::Admin));
    assert!(!rendered.contains("abc"));
    assert!(rendered.contains("<redacted>"));
  }
}

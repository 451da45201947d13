use thiserror::Error;

/// Failure of one API call.
///
/// `Clone` so a single in-flight result can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// Connection refused, timeout, or a broken response stream
  #[error("Network error: {0}")]
  Network(String),
  /// 401/403; the session has already been cleared when this is returned
  #[error("{message}")]
  Unauthorized { status: u16, message: String },
  #[error("Not found")]
  NotFound,
  #[error("Server error {code}: {message}")]
  Status { code: u16, message: String },
  /// The body did not match the expected schema
  #[error("Unexpected response: {0}")]
  Decode(String),
  /// A user-scoped endpoint was needed but no one is signed in
  #[error("Not signed in")]
  NotSignedIn,
}

impl ApiError {
  pub fn is_unauthorized(&self) -> bool {
    matches!(self, ApiError::Unauthorized { .. })
  }
}

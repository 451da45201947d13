/// Fetch progress of the entity held by a neighbouring store.
///
/// The entity store itself keeps the plain "no value means unloaded"
/// convention; this tag is what tells "still loading" from "failed" and
/// "loaded but empty" from "never fetched".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
  /// No fetch has been issued
  #[default]
  Idle,
  /// A fetch is in flight
  Loading,
  /// The last fetch succeeded and its value was written
  Loaded,
  /// The last fetch failed; the entity store was left unchanged
  Failed(String),
}

impl LoadState {
  pub fn is_loading(&self) -> bool {
    matches!(self, LoadState::Loading)
  }

  pub fn is_loaded(&self) -> bool {
    matches!(self, LoadState::Loaded)
  }

  pub fn is_failed(&self) -> bool {
    matches!(self, LoadState::Failed(_))
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      LoadState::Failed(e) => Some(e),
      _ => None,
    }
  }
}

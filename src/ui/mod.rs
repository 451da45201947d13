pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;
mod watch;

pub use watch::{Task, Watch};

use std::future::Future;

use ratatui::prelude::*;
use ratatui::widgets::ListState;

use crate::app::App;
use crate::domain::Role;
use crate::notify::Notifier;
use crate::router::Router;
use crate::services::Services;

/// Handles every view is built from.
#[derive(Clone)]
pub struct Context {
  pub services: Services,
  pub router: Router,
}

impl Context {
  pub fn new(services: Services, router: Router) -> Self {
    Self { services, router }
  }

  pub fn role(&self) -> Option<Role> {
    self.services.context().auth.role()
  }

  pub fn notifier(&self) -> &Notifier {
    &self.services.context().notifier
  }

  /// Run a façade call in the background. Its outcome reaches the UI through
  /// stores and notifications, not through the return value.
  pub fn spawn<F>(&self, future: F)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    drop(tokio::spawn(future));
  }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let shortcuts = app.shortcuts();
  renderfns::draw_header(frame, chunks[0], app.api_url(), app.session(), &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  renderfns::draw_footer(frame, chunks[2], &app.breadcrumb(), app.notification());

  app.command_input().render_overlay(frame, chunks[1]);
}

/// Keep a list selection inside `0..len`, selecting the first row when
/// nothing is selected yet.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match (state.selected(), len) {
    (_, 0) => state.select(None),
    (None, _) => state.select(Some(0)),
    (Some(i), len) if i >= len => state.select(Some(len - 1)),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ensure_valid_selection() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(5));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}

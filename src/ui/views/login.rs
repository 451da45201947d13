use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use crate::router::Route;
use crate::session::Session;
use crate::ui::components::{Form, FormEvent, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::{Context, Task};

const EMAIL: usize = 0;
const PASSWORD: usize = 1;

/// Sign-in form. Success moves the router to the role's home route.
pub struct LoginView {
  ctx: Context,
  form: Form,
  task: Task<Option<Session>>,
}

impl LoginView {
  pub fn new(ctx: Context, default_email: Option<&str>) -> Self {
    let form = Form::new("Sign in to AgriLink")
      .field("Email", default_email.unwrap_or_default())
      .secret("Password");
    Self {
      ctx,
      form,
      task: Task::new(),
    }
  }

  fn submit(&mut self, values: Vec<String>) {
    let email = values[EMAIL].trim().to_string();
    let password = values[PASSWORD].clone();
    if email.is_empty() || password.is_empty() {
      self.form.set_error("Enter your email and password");
      return;
    }

    let auth = self.ctx.services.auth.clone();
    self.form.set_busy(true);
    self
      .task
      .spawn(async move { auth.login(&email, &password).await });
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
      self.ctx.router.navigate(Route::Register);
      return ViewAction::None;
    }

    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted(values)) => self.submit(values),
      KeyResult::Event(FormEvent::Cancelled) => return ViewAction::Pop,
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.form.render(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Login".to_string()
  }

  fn tick(&mut self) {
    // Success navigates away; the router replaces this view
    if let Some(None) = self.task.poll() {
      self.form.set_busy(false);
      self.form.clear_field(PASSWORD);
      self.form.set_error("Sign-in failed, check your credentials");
    }
  }

  fn captures_text(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Enter", "sign in").with_priority(20),
      ShortcutInfo::new("^R", "register").with_priority(30),
      ShortcutInfo::new("Esc", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::testing::harness;
  use crate::services::Services;
  use serde_json::json;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_text(view: &mut LoginView, text: &str) {
    for c in text.chars() {
      view.handle_key(key(KeyCode::Char(c)));
    }
  }

  fn login_view(h: &crate::services::testing::Harness) -> LoginView {
    let ctx = Context::new(Services::new(h.ctx.clone(), h.router.clone()), h.router.clone());
    LoginView::new(ctx, Some("amina@example.com"))
  }

  #[tokio::test]
  async fn test_empty_password_is_rejected_inline() {
    let h = harness(None);
    let mut view = login_view(&h);

    view.handle_key(key(KeyCode::Enter));
    view.handle_key(key(KeyCode::Enter));

    assert_eq!(view.form.error(), Some("Enter your email and password"));
    assert_eq!(h.transport.request_count(), 0);
  }

  #[tokio::test]
  async fn test_failed_login_clears_password() {
    let h = harness(None);
    h.transport.reply(401, json!({ "message": "Bad credentials" }));
    let mut view = login_view(&h);

    view.handle_key(key(KeyCode::Tab));
    type_text(&mut view, "secret");
    view.handle_key(key(KeyCode::Enter));
    tokio::time::sleep(Duration::from_millis(30)).await;
    view.tick();

    assert_eq!(
      view.form.values(),
      vec!["amina@example.com".to_string(), String::new()]
    );
    assert!(view.form.error().is_some());
  }

  #[tokio::test]
  async fn test_ctrl_r_goes_to_register() {
    let h = harness(None);
    let mut view = login_view(&h);

    view.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
    assert_eq!(h.router.current(), Route::Register);
  }
}

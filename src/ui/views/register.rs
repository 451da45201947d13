use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use crate::domain::{RegisterRequest, Role};
use crate::router::Route;
use crate::ui::components::{Form, FormEvent, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::prompt::optional;
use crate::ui::{Context, Task};

/// Self-registration for farmers and consultants
pub struct RegisterView {
  ctx: Context,
  form: Form,
  role: Role,
  task: Task<bool>,
}

fn title(role: Role) -> String {
  format!("Register as {} (^T to switch)", role)
}

impl RegisterView {
  pub fn new(ctx: Context) -> Self {
    let role = Role::Farmer;
    let form = Form::new(title(role))
      .field("Full name", "")
      .field("Email", "")
      .secret("Password")
      .field("Phone", "");
    Self {
      ctx,
      form,
      role,
      task: Task::new(),
    }
  }

  fn toggle_role(&mut self) {
    self.role = match self.role {
      Role::Farmer => Role::Consultant,
      _ => Role::Farmer,
    };
    self.form.set_title(title(self.role));
  }

  fn submit(&mut self, values: Vec<String>) {
    let request = RegisterRequest {
      full_name: values[0].trim().to_string(),
      email: values[1].trim().to_string(),
      password: values[2].clone(),
      phone: optional(&values[3]),
      role: self.role,
    };
    if let Err(e) = request.validate() {
      self.form.set_error(e.to_string());
      return;
    }

    let auth = self.ctx.services.auth.clone();
    self.form.set_busy(true);
    self
      .task
      .spawn(async move { auth.register(&request).await });
  }
}

impl View for RegisterView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
      match key.code {
        KeyCode::Char('t') => {
          self.toggle_role();
          return ViewAction::None;
        }
        KeyCode::Char('l') => {
          self.ctx.router.navigate(Route::Login);
          return ViewAction::None;
        }
        _ => {}
      }
    }

    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted(values)) => self.submit(values),
      KeyResult::Event(FormEvent::Cancelled) => self.ctx.router.navigate(Route::Login),
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.form.render(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Register".to_string()
  }

  fn tick(&mut self) {
    // Success navigates to the login route
    if let Some(false) = self.task.poll() {
      self.form.set_busy(false);
      self.form.set_error("Registration failed");
    }
  }

  fn captures_text(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Enter", "register").with_priority(20),
      ShortcutInfo::new("^T", "role").with_priority(30),
      ShortcutInfo::new("Esc", "sign in").with_priority(90),
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

  fn fill(view: &mut RegisterView, values: [&str; 4]) {
    for value in values {
      for c in value.chars() {
        view.handle_key(key(KeyCode::Char(c)));
      }
      view.handle_key(key(KeyCode::Enter));
    }
  }

  #[tokio::test]
  async fn test_short_password_stays_local() {
    let h = harness(None);
    let ctx = Context::new(Services::new(h.ctx.clone(), h.router.clone()), h.router.clone());
    let mut view = RegisterView::new(ctx);

    fill(&mut view, ["Amina Yusuf", "amina@example.com", "abc", ""]);

    assert_eq!(
      view.form.error(),
      Some("Password must be at least 6 characters")
    );
    assert_eq!(h.transport.request_count(), 0);
  }

  #[tokio::test]
  async fn test_consultant_registration_posts_role() {
    let h = harness(None);
    h.router.navigate(Route::Register);
    h.transport.reply(200, json!({ "status": "OK", "data": null }));
    let ctx = Context::new(Services::new(h.ctx.clone(), h.router.clone()), h.router.clone());
    let mut view = RegisterView::new(ctx);

    view.handle_key(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL));
    fill(&mut view, ["Dr. Okafor", "okafor@example.com", "secret1", ""]);
    tokio::time::sleep(Duration::from_millis(30)).await;

    let request = &h.transport.requests()[0];
    let body: serde_json::Value =
      serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
    assert_eq!(body["role"], "CONSULTANT");
    assert!(body.get("phone").map_or(true, |p| p.is_null()));
    assert_eq!(h.router.current(), Route::Login);
  }
}

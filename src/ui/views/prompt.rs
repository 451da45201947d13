use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::ui::components::{Form, FormEvent, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::Context;

/// Checks the entered values and starts the action. An `Err` is shown
/// inline and keeps the prompt open.
pub type OnSubmit = Box<dyn FnMut(&[String]) -> Result<(), String>>;

/// Modal form pushed over a list to collect input for one action
pub struct PromptView {
  label: String,
  form: Form,
  on_submit: OnSubmit,
}

impl PromptView {
  pub fn new(label: impl Into<String>, form: Form, on_submit: OnSubmit) -> Self {
    Self {
      label: label.into(),
      form,
      on_submit,
    }
  }
}

impl View for PromptView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted(values)) => match (self.on_submit)(&values) {
        Ok(()) => ViewAction::Pop,
        Err(message) => {
          self.form.set_error(message);
          ViewAction::None
        }
      },
      KeyResult::Event(FormEvent::Cancelled) => ViewAction::Pop,
      KeyResult::Handled | KeyResult::NotHandled => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.form.render(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.label.clone()
  }

  fn captures_text(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Tab", "next field").with_priority(20),
      ShortcutInfo::new("Enter", "submit").with_priority(30),
      ShortcutInfo::new("Esc", "cancel").with_priority(90),
    ]
  }
}

/// Push a prompt whose submit handler gets the shared context.
pub fn push_prompt<F>(ctx: &Context, label: &str, form: Form, submit: F) -> ViewAction
where
  F: Fn(&Context, &[String]) -> Result<(), String> + 'static,
{
  let ctx = ctx.clone();
  ViewAction::Push(Box::new(PromptView::new(
    label,
    form,
    Box::new(move |values: &[String]| submit(&ctx, values)),
  )))
}

/// Trimmed value, or `None` when blank
pub fn optional(value: &str) -> Option<String> {
  let value = value.trim();
  (!value.is_empty()).then(|| value.to_string())
}

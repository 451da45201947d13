use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Events emitted by a form that its view needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Enter on the last field; values in field order
  Submitted(Vec<String>),
  Cancelled,
}

#[derive(Debug, Clone)]
struct Field {
  label: &'static str,
  input: TextInput,
  masked: bool,
}

/// A stack of labelled text inputs with one focused at a time.
#[derive(Debug, Clone)]
pub struct Form {
  title: String,
  fields: Vec<Field>,
  focus: usize,
  error: Option<String>,
  busy: bool,
}

impl Form {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      fields: Vec::new(),
      focus: 0,
      error: None,
      busy: false,
    }
  }

  pub fn field(mut self, label: &'static str, initial: impl Into<String>) -> Self {
    self.fields.push(Field {
      label,
      input: TextInput::with_value(initial),
      masked: false,
    });
    self
  }

  pub fn secret(mut self, label: &'static str) -> Self {
    self.fields.push(Field {
      label,
      input: TextInput::new(),
      masked: true,
    });
    self
  }

  pub fn values(&self) -> Vec<String> {
    self
      .fields
      .iter()
      .map(|f| f.input.value().to_string())
      .collect()
  }

  pub fn focus(&self) -> usize {
    self.focus
  }

  pub fn set_title(&mut self, title: impl Into<String>) {
    self.title = title.into();
  }

  /// Inline message under the fields, cleared on the next edit
  pub fn set_error(&mut self, error: impl Into<String>) {
    self.error = Some(error.into());
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn set_busy(&mut self, busy: bool) {
    self.busy = busy;
  }

  pub fn clear_field(&mut self, index: usize) {
    if let Some(field) = self.fields.get_mut(index) {
      field.input.clear();
    }
  }

  fn next(&mut self) {
    if !self.fields.is_empty() {
      self.focus = (self.focus + 1) % self.fields.len();
    }
  }

  fn previous(&mut self) {
    if !self.fields.is_empty() {
      self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    // Ignore input while the submission is in flight
    if self.busy {
      return match key.code {
        KeyCode::Esc => KeyResult::Event(FormEvent::Cancelled),
        _ => KeyResult::Handled,
      };
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.next();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.previous();
        return KeyResult::Handled;
      }
      _ => {}
    }

    let Some(field) = self.fields.get_mut(self.focus) else {
      return KeyResult::NotHandled;
    };

    match field.input.handle_key(key) {
      InputResult::Consumed => {
        self.error = None;
        KeyResult::Handled
      }
      InputResult::Submitted(_) => {
        if self.focus + 1 < self.fields.len() {
          self.next();
          KeyResult::Handled
        } else {
          KeyResult::Event(FormEvent::Submitted(self.values()))
        }
      }
      InputResult::Cancelled => KeyResult::Event(FormEvent::Cancelled),
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// Height needed to draw every field plus borders and the message line
  pub fn height(&self) -> u16 {
    self.fields.len() as u16 + 4
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let width = area.width.min(64).max(30.min(area.width));
    let height = self.height().min(area.height);
    let form_area = Rect::new(
      area.x + area.width.saturating_sub(width) / 2,
      area.y + area.height.saturating_sub(height) / 3,
      width,
      height,
    );

    frame.render_widget(Clear, form_area);

    let border = if self.busy { Color::DarkGray } else { Color::Yellow };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border))
      .title(format!(" {} ", self.title));

    let label_width = self
      .fields
      .iter()
      .map(|f| f.label.len())
      .max()
      .unwrap_or(0);

    let mut lines: Vec<Line> = self
      .fields
      .iter()
      .enumerate()
      .map(|(i, field)| {
        let focused = i == self.focus && !self.busy;
        let label_style = if focused {
          Style::default().fg(Color::Cyan).bold()
        } else {
          Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![
          Span::styled(
            format!("{:>width$}: ", field.label, width = label_width),
            label_style,
          ),
          Span::raw(field.input.display(field.masked)),
        ];
        if focused {
          spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
      })
      .collect();

    lines.push(Line::raw(""));
    lines.push(match (&self.error, self.busy) {
      (_, true) => Line::styled("Working...", Style::default().fg(Color::DarkGray)),
      (Some(error), _) => Line::styled(error.clone(), Style::default().fg(Color::Red)),
      (None, _) => Line::raw(""),
    });

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, form_area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_text(form: &mut Form, text: &str) {
    for c in text.chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_enter_advances_then_submits() {
    let mut form = Form::new("Sign in").field("Email", "").secret("Password");
    type_text(&mut form, "a@b.co");
    assert_eq!(form.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert_eq!(form.focus(), 1);

    type_text(&mut form, "pw1234");
    assert_eq!(
      form.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(FormEvent::Submitted(vec![
        "a@b.co".to_string(),
        "pw1234".to_string()
      ]))
    );
  }

  #[test]
  fn test_focus_wraps() {
    let mut form = Form::new("x").field("A", "").field("B", "");
    form.handle_key(key(KeyCode::BackTab));
    assert_eq!(form.focus(), 1);
    form.handle_key(key(KeyCode::Tab));
    assert_eq!(form.focus(), 0);
  }

  #[test]
  fn test_editing_clears_error() {
    let mut form = Form::new("x").field("Topic", "");
    form.set_error("Topic is required");
    type_text(&mut form, "b");
    assert!(form.error().is_none());
  }

  #[test]
  fn test_busy_form_ignores_typing() {
    let mut form = Form::new("x").field("Topic", "soil");
    form.set_busy(true);
    type_text(&mut form, "zz");
    assert_eq!(form.values(), vec!["soil".to_string()]);
    assert_eq!(
      form.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(FormEvent::Cancelled)
    );
  }
}

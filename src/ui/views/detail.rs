use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::ui::view::{ShortcutInfo, View, ViewAction};

/// Read-only snapshot of one row, scrollable
pub struct DetailView {
  title: String,
  lines: Vec<Line<'static>>,
  scroll: u16,
}

impl DetailView {
  pub fn new(title: String, lines: Vec<Line<'static>>) -> Self {
    Self {
      title,
      lines,
      scroll: 0,
    }
  }
}

impl View for DetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        let max = self.lines.len().saturating_sub(1) as u16;
        self.scroll = (self.scroll + 1).min(max);
      }
      KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", self.title))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let paragraph = Paragraph::new(self.lines.clone())
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.title.clone()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("j/k", "scroll").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

/// `label: value` line for detail views
pub fn field(label: &str, value: impl Into<String>) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{:<16}", label), Style::default().fg(Color::DarkGray)),
    Span::raw(value.into()),
  ])
}

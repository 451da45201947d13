use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::session::Session;
use crate::ui::view::ShortcutInfo;

/// Draw the header bar with logo, server, account and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  api_url: &str,
  session: Option<&Session>,
  shortcuts: &[ShortcutInfo],
) {
  let domain = extract_domain(api_url);

  let account = match session {
    Some(s) => format!(" {} ({}) ", s.email, s.role),
    None => " signed out ".to_string(),
  };

  let mut spans = vec![
    Span::styled(" agrilink ", Style::default().fg(Color::Green).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", domain), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(account, Style::default().fg(Color::Yellow).bold()),
    Span::raw(" "),
  ];

  // Keys highlighted, descriptions dimmed
  let mut sorted: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.priority);
  for shortcut in sorted {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host part of the API URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_domain() {
    assert_eq!(extract_domain("https://agri.example.com"), "agri.example.com");
    assert_eq!(
      extract_domain("https://api.example.org/platform"),
      "api.example.org"
    );
    assert_eq!(extract_domain("http://localhost:8080"), "localhost:8080");
  }
}

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::notify::{Level, Notification};

/// Draw the footer bar: view breadcrumb on the left, latest notification on the right
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  breadcrumb: &[String],
  notification: Option<&Notification>,
) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      // Current view
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let left = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(left, area);

  if let Some(notification) = notification {
    let color = match notification.level {
      Level::Success => Color::Green,
      Level::Error => Color::Red,
    };
    let text = format!(
      "{} {} ",
      notification.at.with_timezone(&chrono::Local).format("%H:%M"),
      notification.message
    );
    let right = Paragraph::new(Line::styled(text, Style::default().fg(color)))
      .alignment(Alignment::Right)
      .style(Style::default().bg(Color::Black));

    // Leave the breadcrumb readable on narrow terminals
    let width = area.width.saturating_sub(area.width / 3);
    let right_area = Rect::new(area.x + area.width - width, area.y, width, area.height);
    frame.render_widget(right, right_area);
  }
}

use chrono::NaiveDateTime;
use ratatui::prelude::Color;

use crate::domain::{ConsultationStatus, VisitStatus};

/// Truncate to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

pub fn consultation_color(status: ConsultationStatus) -> Color {
  match status {
    ConsultationStatus::Pending => Color::Yellow,
    ConsultationStatus::Accepted => Color::Cyan,
    ConsultationStatus::Completed => Color::Green,
    ConsultationStatus::Rejected | ConsultationStatus::Cancelled => Color::DarkGray,
  }
}

pub fn visit_color(status: VisitStatus) -> Color {
  match status {
    VisitStatus::Scheduled => Color::Yellow,
    VisitStatus::Completed => Color::Green,
    VisitStatus::Cancelled => Color::DarkGray,
  }
}

/// Short date for list columns; "-" when unknown
pub fn format_date(at: Option<NaiveDateTime>) -> String {
  at.map(|t| t.date().to_string())
    .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_counts_characters() {
    assert_eq!(truncate("Sécheresse précoce", 8), "Séche...");
  }

  #[test]
  fn test_open_consultations_stand_out() {
    assert_eq!(consultation_color(ConsultationStatus::Pending), Color::Yellow);
    assert_eq!(consultation_color(ConsultationStatus::Completed), Color::Green);
    assert_eq!(consultation_color(ConsultationStatus::Cancelled), Color::DarkGray);
    assert_eq!(visit_color(VisitStatus::Scheduled), Color::Yellow);
  }

  #[test]
  fn test_format_date() {
    let at = NaiveDate::from_ymd_opt(2024, 3, 2)
      .unwrap()
      .and_hms_opt(9, 15, 0);
    assert_eq!(format_date(at), "2024-03-02");
    assert_eq!(format_date(None), "-");
  }
}

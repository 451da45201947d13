use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

use crate::domain::{ConsultationReport, FarmVisit, Feedback, Role, VisitStatus};
use crate::store::{LoadState, Store};
use crate::ui::renderfns::{format_date, truncate, visit_color};
use crate::ui::view::{ShortcutInfo, ViewAction};
use crate::ui::views::detail::field;
use crate::ui::views::list::Listing;
use crate::ui::Context;

/// Reports written for the signed-in user's consultations
pub struct Reports {
  ctx: Context,
}

impl Reports {
  pub fn new(ctx: Context) -> Self {
    Self { ctx }
  }
}

impl Listing for Reports {
  type Item = ConsultationReport;

  fn title(&self) -> &'static str {
    "Reports"
  }

  fn store(&self) -> Store<Vec<ConsultationReport>> {
    self.ctx.services.reports.reports()
  }

  fn status(&self) -> Store<LoadState> {
    self.ctx.services.reports.status()
  }

  fn refresh(&self) {
    drop(self.ctx.services.reports.refresh());
  }

  fn row(&self, r: &ConsultationReport) -> Line<'static> {
    Line::from(vec![
      Span::styled(format!("#{:<6}", r.id), Style::default().fg(Color::Cyan)),
      Span::styled(
        format!("consultation #{:<6}", r.consultation_id),
        Style::default().fg(Color::Yellow),
      ),
      Span::raw(format!("{:<52}", truncate(&r.findings, 50))),
      Span::styled(format_date(r.created_at), Style::default().fg(Color::DarkGray)),
    ])
  }

  fn search_text(&self, r: &ConsultationReport) -> String {
    format!("{} {} {}", r.consultation_id, r.findings, r.recommendations)
  }

  fn detail(&self, r: &ConsultationReport) -> (String, Vec<Line<'static>>) {
    let lines = vec![
      field("Consultation", format!("#{}", r.consultation_id)),
      field("Written", format_date(r.created_at)),
      Line::raw(""),
      Line::styled("Findings", Style::default().add_modifier(Modifier::BOLD)),
      Line::raw(r.findings.clone()),
      Line::raw(""),
      Line::styled("Recommendations", Style::default().add_modifier(Modifier::BOLD)),
      Line::raw(r.recommendations.clone()),
    ];
    (format!("Report #{}", r.id), lines)
  }

  fn empty_message(&self) -> &'static str {
    "No reports yet."
  }
}

/// Scheduled, completed and cancelled farm visits
pub struct Visits {
  ctx: Context,
  role: Option<Role>,
}

impl Visits {
  pub fn new(ctx: Context) -> Self {
    let role = ctx.role();
    Self { ctx, role }
  }
}

impl Listing for Visits {
  type Item = FarmVisit;

  fn title(&self) -> &'static str {
    "Farm visits"
  }

  fn store(&self) -> Store<Vec<FarmVisit>> {
    self.ctx.services.visits.visits()
  }

  fn status(&self) -> Store<LoadState> {
    self.ctx.services.visits.status()
  }

  fn refresh(&self) {
    drop(self.ctx.services.visits.refresh());
  }

  fn row(&self, v: &FarmVisit) -> Line<'static> {
    Line::from(vec![
      Span::styled(format!("#{:<6}", v.id), Style::default().fg(Color::Cyan)),
      Span::styled(
        format!("{:<11}", v.status.label()),
        Style::default().fg(visit_color(v.status)),
      ),
      Span::raw(format!("{:<12}", v.scheduled_date.to_string())),
      Span::styled(
        format!("consultation #{:<6}", v.consultation_id),
        Style::default().fg(Color::Yellow),
      ),
      Span::styled(
        truncate(v.notes.as_deref().unwrap_or_default(), 40),
        Style::default().fg(Color::DarkGray),
      ),
    ])
  }

  fn search_text(&self, v: &FarmVisit) -> String {
    format!(
      "{} {} {}",
      v.scheduled_date,
      v.status.label(),
      v.notes.as_deref().unwrap_or_default()
    )
  }

  fn detail(&self, v: &FarmVisit) -> (String, Vec<Line<'static>>) {
    let mut lines = vec![
      field("Date", v.scheduled_date.to_string()),
      field("Status", v.status.label()),
      field("Consultation", format!("#{}", v.consultation_id)),
    ];
    if let Some(notes) = &v.notes {
      lines.push(Line::raw(""));
      lines.push(Line::raw(notes.clone()));
    }
    (format!("Farm visit #{}", v.id), lines)
  }

  fn empty_message(&self) -> &'static str {
    "No farm visits scheduled."
  }

  fn handle_key(&self, key: KeyEvent, selected: Option<&FarmVisit>) -> ViewAction {
    let Some(v) = selected else {
      return ViewAction::None;
    };
    let id = v.id;
    let services = self.ctx.services.clone();
    match key.code {
      KeyCode::Char('c') if self.role == Some(Role::Consultant) => {
        if v.status != VisitStatus::Scheduled {
          self
            .ctx
            .notifier()
            .error(format!("Cannot complete a {} visit", v.status.label().to_lowercase()));
          return ViewAction::None;
        }
        self.ctx.spawn(async move {
          services.visits.complete(id).await;
        });
      }
      KeyCode::Char('x') if self.role.is_some() => {
        if v.status != VisitStatus::Scheduled {
          self
            .ctx
            .notifier()
            .error(format!("Cannot cancel a {} visit", v.status.label().to_lowercase()));
          return ViewAction::None;
        }
        self.ctx.spawn(async move {
          services.visits.cancel(id).await;
        });
      }
      _ => {}
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![ShortcutInfo::new("x", "cancel").with_priority(41)];
    if self.role == Some(Role::Consultant) {
      shortcuts.push(ShortcutInfo::new("c", "complete").with_priority(40));
    }
    shortcuts
  }
}

/// Feedback given (farmer) or received (consultant)
pub struct FeedbackList {
  ctx: Context,
}

impl FeedbackList {
  pub fn new(ctx: Context) -> Self {
    Self { ctx }
  }
}

fn stars(rating: u8) -> String {
  let rating = rating.min(5) as usize;
  format!("{}{}", "★".repeat(rating), "☆".repeat(5 - rating))
}

impl Listing for FeedbackList {
  type Item = Feedback;

  fn title(&self) -> &'static str {
    "Feedback"
  }

  fn store(&self) -> Store<Vec<Feedback>> {
    self.ctx.services.feedback.feedback()
  }

  fn status(&self) -> Store<LoadState> {
    self.ctx.services.feedback.status()
  }

  fn refresh(&self) {
    drop(self.ctx.services.feedback.refresh());
  }

  fn row(&self, f: &Feedback) -> Line<'static> {
    Line::from(vec![
      Span::styled(format!("#{:<6}", f.id), Style::default().fg(Color::Cyan)),
      Span::styled(format!("{:<7}", stars(f.rating)), Style::default().fg(Color::Yellow)),
      Span::raw(format!(
        "{:<52}",
        truncate(f.comment.as_deref().unwrap_or_default(), 50)
      )),
      Span::styled(format_date(f.created_at), Style::default().fg(Color::DarkGray)),
    ])
  }

  fn search_text(&self, f: &Feedback) -> String {
    format!(
      "{} {}",
      f.consultation_id,
      f.comment.as_deref().unwrap_or_default()
    )
  }

  fn detail(&self, f: &Feedback) -> (String, Vec<Line<'static>>) {
    let mut lines = vec![
      field("Rating", stars(f.rating)),
      field("Consultation", format!("#{}", f.consultation_id)),
      field("Given", format_date(f.created_at)),
    ];
    if let Some(comment) = &f.comment {
      lines.push(Line::raw(""));
      lines.push(Line::raw(comment.clone()));
    }
    (format!("Feedback #{}", f.id), lines)
  }

  fn empty_message(&self) -> &'static str {
    "No feedback yet."
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::testing::harness;
  use crate::services::Services;
  use crossterm::event::KeyModifiers;
  use serde_json::json;
  use std::time::Duration;

  fn context(h: &crate::services::testing::Harness) -> Context {
    Context::new(Services::new(h.ctx.clone(), h.router.clone()), h.router.clone())
  }

  fn visit(status: &str) -> FarmVisit {
    serde_json::from_value(json!({
      "id": 9,
      "consultationId": 3,
      "farmerId": 42,
      "consultantId": 7,
      "scheduledDate": "2030-04-01",
      "status": status
    }))
    .unwrap()
  }

  #[test]
  fn test_stars() {
    assert_eq!(stars(3), "★★★☆☆");
    assert_eq!(stars(9), "★★★★★");
  }

  #[tokio::test]
  async fn test_completed_visit_cannot_be_cancelled() {
    let h = harness(Some(Role::Farmer));
    let visits = Visits::new(context(&h));

    let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
    visits.handle_key(key, Some(&visit("COMPLETED")));

    assert_eq!(
      h.ctx.notifier.latest().unwrap().message,
      "Cannot cancel a completed visit"
    );
    assert_eq!(h.transport.request_count(), 0);
  }

  #[tokio::test]
  async fn test_consultant_completes_scheduled_visit() {
    let h = harness(Some(Role::Consultant));
    h.transport
      .reply(200, json!({ "status": "OK", "data": null }))
      .reply(200, json!([]));
    let visits = Visits::new(context(&h));

    let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
    visits.handle_key(key, Some(&visit("SCHEDULED")));
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(
      h.transport.requests()[0].url.path(),
      "/api/v1/farm-visits/9/complete"
    );
  }

  #[tokio::test]
  async fn test_report_detail_shows_both_sections() {
    let h = harness(Some(Role::Farmer));
    let reports = Reports::new(context(&h));
    let report: ConsultationReport = serde_json::from_value(json!({
      "id": 5,
      "consultationId": 3,
      "consultantId": 7,
      "farmerId": 42,
      "findings": "Early blight on lower leaves",
      "recommendations": "Apply copper fungicide weekly"
    }))
    .unwrap();

    let (title, lines) = reports.detail(&report);
    let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    assert_eq!(title, "Report #5");
    assert!(text.contains(&"Early blight on lower leaves".to_string()));
    assert!(text.contains(&"Apply copper fungicide weekly".to_string()));
  }
}

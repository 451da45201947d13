use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

use crate::domain::{
  Consultation, ConsultationStatus, FarmVisitRequest, FeedbackDraft, ReportDraft, Role,
};
use crate::store::{LoadState, Store};
use crate::ui::components::Form;
use crate::ui::renderfns::{consultation_color, format_date, truncate};
use crate::ui::view::{ShortcutInfo, ViewAction};
use crate::ui::views::detail::field;
use crate::ui::views::list::Listing;
use crate::ui::views::prompt::{optional, push_prompt};
use crate::ui::Context;

/// Consultations of the signed-in farmer or consultant
pub struct Consultations {
  ctx: Context,
  role: Option<Role>,
}

impl Consultations {
  pub fn new(ctx: Context) -> Self {
    let role = ctx.role();
    Self { ctx, role }
  }

  /// Name of the other party
  fn counterpart(&self, c: &Consultation) -> String {
    match self.role {
      Some(Role::Consultant) => c
        .farmer_name
        .clone()
        .unwrap_or_else(|| format!("farmer #{}", c.farmer_id)),
      _ => c
        .consultant_name
        .clone()
        .unwrap_or_else(|| format!("consultant #{}", c.consultant_id)),
    }
  }

  /// Notify and refuse when the status does not allow `verb`
  fn allows(&self, c: &Consultation, allowed: &[ConsultationStatus], verb: &str) -> bool {
    if allowed.contains(&c.status) {
      return true;
    }
    self.ctx.notifier().error(format!(
      "Cannot {} consultation #{}: it is {}",
      verb,
      c.id,
      c.status.label().to_lowercase()
    ));
    false
  }

  fn consultant_key(&self, code: KeyCode, c: &Consultation) -> ViewAction {
    let id = c.id;
    match code {
      KeyCode::Char('a') if self.allows(c, &[ConsultationStatus::Pending], "accept") => {
        let services = self.ctx.services.clone();
        self.ctx.spawn(async move {
          services.accept_consultation(id).await;
        });
        ViewAction::None
      }
      KeyCode::Char('x') if self.allows(c, &[ConsultationStatus::Pending], "reject") => {
        push_prompt(
          &self.ctx,
          "Reject",
          Form::new(format!("Reject consultation #{}", id)).field("Reason", ""),
          move |ctx, values| {
            let reason = optional(&values[0]).ok_or("A reason is required")?;
            let services = ctx.services.clone();
            ctx.spawn(async move {
              services.consultations.reject(id, &reason).await;
            });
            Ok(())
          },
        )
      }
      KeyCode::Char('c') if self.allows(c, &[ConsultationStatus::Accepted], "complete") => {
        let services = self.ctx.services.clone();
        self.ctx.spawn(async move {
          services.consultations.complete(id).await;
        });
        ViewAction::None
      }
      KeyCode::Char('s') if self.allows(c, &[ConsultationStatus::Accepted], "schedule a visit for") => {
        push_prompt(
          &self.ctx,
          "Schedule visit",
          Form::new(format!("Farm visit for consultation #{}", id))
            .field("Date (YYYY-MM-DD)", "")
            .field("Notes", ""),
          move |ctx, values| {
            let scheduled_date = NaiveDate::parse_from_str(values[0].trim(), "%Y-%m-%d")
              .map_err(|_| "Date must look like 2024-05-30".to_string())?;
            let request = FarmVisitRequest {
              consultation_id: id,
              scheduled_date,
              notes: optional(&values[1]),
            };
            request
              .validate(Local::now().date_naive())
              .map_err(|e| e.to_string())?;

            let services = ctx.services.clone();
            ctx.spawn(async move {
              services.visits.schedule(&request).await;
            });
            Ok(())
          },
        )
      }
      KeyCode::Char('w')
        if self.allows(
          c,
          &[ConsultationStatus::Accepted, ConsultationStatus::Completed],
          "report on",
        ) =>
      {
        push_prompt(
          &self.ctx,
          "Write report",
          Form::new(format!("Report for consultation #{}", id))
            .field("Findings", "")
            .field("Recommendations", ""),
          move |ctx, values| {
            let draft = ReportDraft {
              consultation_id: id,
              findings: values[0].trim().to_string(),
              recommendations: values[1].trim().to_string(),
            };
            draft.validate().map_err(|e| e.to_string())?;

            let services = ctx.services.clone();
            ctx.spawn(async move {
              services.reports.submit(&draft).await;
            });
            Ok(())
          },
        )
      }
      _ => ViewAction::None,
    }
  }

  fn farmer_key(&self, code: KeyCode, c: &Consultation) -> ViewAction {
    let id = c.id;
    match code {
      KeyCode::Char('x')
        if self.allows(
          c,
          &[ConsultationStatus::Pending, ConsultationStatus::Accepted],
          "cancel",
        ) =>
      {
        let services = self.ctx.services.clone();
        self.ctx.spawn(async move {
          services.consultations.cancel(id).await;
        });
        ViewAction::None
      }
      KeyCode::Char('f') if self.allows(c, &[ConsultationStatus::Completed], "rate") => push_prompt(
        &self.ctx,
        "Feedback",
        Form::new(format!("Rate consultation #{}", id))
          .field("Rating (1-5)", "")
          .field("Comment", ""),
        move |ctx, values| {
          let rating = values[0]
            .trim()
            .parse::<u8>()
            .map_err(|_| "Rating must be a number from 1 to 5".to_string())?;
          let draft = FeedbackDraft {
            consultation_id: id,
            rating,
            comment: optional(&values[1]),
          };
          draft.validate().map_err(|e| e.to_string())?;

          let services = ctx.services.clone();
          ctx.spawn(async move {
            services.feedback.submit(&draft).await;
          });
          Ok(())
        },
      ),
      _ => ViewAction::None,
    }
  }
}

impl Listing for Consultations {
  type Item = Consultation;

  fn title(&self) -> &'static str {
    "Consultations"
  }

  fn store(&self) -> Store<Vec<Consultation>> {
    self.ctx.services.consultations.consultations()
  }

  fn status(&self) -> Store<LoadState> {
    self.ctx.services.consultations.status()
  }

  fn refresh(&self) {
    drop(self.ctx.services.consultations.refresh());
  }

  fn row(&self, c: &Consultation) -> Line<'static> {
    Line::from(vec![
      Span::styled(format!("#{:<6}", c.id), Style::default().fg(Color::Cyan)),
      Span::styled(
        format!("{:<11}", c.status.label()),
        Style::default().fg(consultation_color(c.status)),
      ),
      Span::raw(format!("{:<42}", truncate(&c.topic, 40))),
      Span::styled(
        format!("{:<24}", truncate(&self.counterpart(c), 22)),
        Style::default().fg(Color::White),
      ),
      Span::styled(format_date(c.requested_at), Style::default().fg(Color::DarkGray)),
    ])
  }

  fn search_text(&self, c: &Consultation) -> String {
    format!(
      "{} {} {} {}",
      c.topic,
      c.status.label(),
      self.counterpart(c),
      c.description.as_deref().unwrap_or_default()
    )
  }

  fn detail(&self, c: &Consultation) -> (String, Vec<Line<'static>>) {
    let mut lines = vec![
      field("Topic", c.topic.clone()),
      field("Status", c.status.label()),
      field(
        "Farmer",
        c.farmer_name
          .clone()
          .unwrap_or_else(|| format!("#{}", c.farmer_id)),
      ),
      field(
        "Consultant",
        c.consultant_name
          .clone()
          .unwrap_or_else(|| format!("#{}", c.consultant_id)),
      ),
      field("Requested", format_date(c.requested_at)),
      field("Scheduled", format_date(c.scheduled_for)),
    ];
    if let Some(description) = &c.description {
      lines.push(Line::raw(""));
      lines.push(Line::raw(description.clone()));
    }
    (format!("Consultation #{}", c.id), lines)
  }

  fn empty_message(&self) -> &'static str {
    match self.role {
      Some(Role::Farmer) => "No consultations yet. Use :consultants to request one.",
      _ => "No consultation requests yet.",
    }
  }

  fn handle_key(&self, key: KeyEvent, selected: Option<&Consultation>) -> ViewAction {
    let Some(c) = selected else {
      return ViewAction::None;
    };
    match self.role {
      Some(Role::Consultant) => self.consultant_key(key.code, c),
      Some(Role::Farmer) => self.farmer_key(key.code, c),
      _ => ViewAction::None,
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    match self.role {
      Some(Role::Consultant) => vec![
        ShortcutInfo::new("a", "accept").with_priority(40),
        ShortcutInfo::new("x", "reject").with_priority(41),
        ShortcutInfo::new("c", "complete").with_priority(42),
        ShortcutInfo::new("s", "visit").with_priority(43),
        ShortcutInfo::new("w", "report").with_priority(44),
      ],
      Some(Role::Farmer) => vec![
        ShortcutInfo::new("x", "cancel").with_priority(40),
        ShortcutInfo::new("f", "feedback").with_priority(41),
      ],
      _ => Vec::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::testing::harness;
  use crate::services::Services;
  use crate::ui::view::View;
  use crate::ui::views::ListView;
  use crossterm::event::KeyModifiers;
  use serde_json::json;
  use std::time::Duration;

  fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
  }

  fn consultation(status: &str) -> serde_json::Value {
    json!({
      "id": 3,
      "farmerId": 42,
      "farmerName": "Amina Yusuf",
      "consultantId": 7,
      "topic": "Tomato blight",
      "status": status
    })
  }

  #[tokio::test]
  async fn test_consultant_accepts_selected_row() {
    let h = harness(Some(Role::Consultant));
    h.transport
      .reply(200, json!([consultation("PENDING")]))
      .reply(200, json!({ "status": "OK", "data": null }))
      .reply(200, json!([consultation("ACCEPTED")]))
      .reply(200, json!([]));
    let ctx = Context::new(Services::new(h.ctx.clone(), h.router.clone()), h.router.clone());
    let mut view = ListView::new(Consultations::new(ctx));

    tokio::time::sleep(Duration::from_millis(30)).await;
    view.tick();
    view.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
    view.handle_key(key('a'));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
      h.transport.requests()[1].url.path(),
      "/api/v1/consultations/3/accept"
    );
    assert_eq!(h.transport.request_count(), 4);
  }

  #[tokio::test]
  async fn test_farmer_cannot_rate_open_consultation() {
    let h = harness(Some(Role::Farmer));
    h.transport.reply(200, json!([consultation("PENDING")]));
    let ctx = Context::new(Services::new(h.ctx.clone(), h.router.clone()), h.router.clone());
    let listing = Consultations::new(ctx);
    let c: Consultation = serde_json::from_value(consultation("PENDING")).unwrap();

    assert!(matches!(listing.handle_key(key('f'), Some(&c)), ViewAction::None));
    assert_eq!(
      h.ctx.notifier.latest().unwrap().message,
      "Cannot rate consultation #3: it is pending"
    );
  }

  #[tokio::test]
  async fn test_consultant_sees_farmer_name() {
    let h = harness(Some(Role::Consultant));
    let ctx = Context::new(Services::new(h.ctx.clone(), h.router.clone()), h.router.clone());
    let listing = Consultations::new(ctx);
    let c: Consultation = serde_json::from_value(consultation("ACCEPTED")).unwrap();

    assert_eq!(listing.counterpart(&c), "Amina Yusuf");
    assert!(listing.search_text(&c).contains("Tomato blight"));
  }
}

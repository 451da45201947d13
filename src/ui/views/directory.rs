use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

use crate::domain::{ConsultantProfile, ConsultationRequest};
use crate::router::Route;
use crate::store::{LoadState, Store};
use crate::ui::components::Form;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, ViewAction};
use crate::ui::views::detail::field;
use crate::ui::views::list::Listing;
use crate::ui::views::prompt::{optional, push_prompt};
use crate::ui::Context;

/// Consultant directory a farmer requests consultations from
pub struct Consultants {
  ctx: Context,
}

impl Consultants {
  pub fn new(ctx: Context) -> Self {
    Self { ctx }
  }
}

fn rating(c: &ConsultantProfile) -> String {
  c.rating
    .map(|r| format!("{:.1}★", r))
    .unwrap_or_else(|| "new".to_string())
}

impl Listing for Consultants {
  type Item = ConsultantProfile;

  fn title(&self) -> &'static str {
    "Consultants"
  }

  fn store(&self) -> Store<Vec<ConsultantProfile>> {
    self.ctx.services.farmer.consultants()
  }

  fn status(&self) -> Store<LoadState> {
    self.ctx.services.farmer.consultants_status()
  }

  fn refresh(&self) {
    drop(self.ctx.services.farmer.refresh_consultants());
  }

  fn row(&self, c: &ConsultantProfile) -> Line<'static> {
    Line::from(vec![
      Span::styled(
        format!("{:<26}", truncate(&c.full_name, 24)),
        Style::default().fg(Color::White),
      ),
      Span::styled(format!("{:<7}", rating(c)), Style::default().fg(Color::Yellow)),
      Span::raw(format!("{:<44}", truncate(&c.expertise.join(", "), 42))),
      Span::styled(
        c.years_experience
          .map(|y| format!("{} yrs", y))
          .unwrap_or_default(),
        Style::default().fg(Color::DarkGray),
      ),
    ])
  }

  fn search_text(&self, c: &ConsultantProfile) -> String {
    format!("{} {}", c.full_name, c.expertise.join(" "))
  }

  fn detail(&self, c: &ConsultantProfile) -> (String, Vec<Line<'static>>) {
    let lines = vec![
      field("Email", c.email.clone()),
      field("Phone", c.phone.clone().unwrap_or_default()),
      field("Expertise", c.expertise.join(", ")),
      field(
        "Experience",
        c.years_experience
          .map(|y| format!("{} years", y))
          .unwrap_or_default(),
      ),
      field(
        "Hourly rate",
        c.hourly_rate.map(|r| format!("{:.2}", r)).unwrap_or_default(),
      ),
      field("Rating", rating(c)),
    ];
    (c.full_name.clone(), lines)
  }

  fn empty_message(&self) -> &'static str {
    "No consultants are available yet."
  }

  fn handle_key(&self, key: KeyEvent, selected: Option<&ConsultantProfile>) -> ViewAction {
    let Some(c) = selected else {
      return ViewAction::None;
    };
    if key.code != KeyCode::Char('n') {
      return ViewAction::None;
    }
    if !c.approved {
      self
        .ctx
        .notifier()
        .error(format!("{} is not approved yet", c.full_name));
      return ViewAction::None;
    }

    let consultant_id = c.id;
    push_prompt(
      &self.ctx,
      "Request",
      Form::new(format!("Request a consultation with {}", c.full_name))
        .field("Topic", "")
        .field("Description", ""),
      move |ctx, values| {
        let request = ConsultationRequest {
          consultant_id,
          topic: values[0].trim().to_string(),
          description: optional(&values[1]),
        };
        request.validate().map_err(|e| e.to_string())?;

        let services = ctx.services.clone();
        let router = ctx.router.clone();
        ctx.spawn(async move {
          if services.consultations.request(&request).await.is_some() {
            router.navigate(Route::Consultations);
          }
        });
        Ok(())
      },
    )
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("n", "request").with_priority(40)]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Role;
  use crate::services::testing::harness;
  use crate::services::Services;
  use crossterm::event::KeyModifiers;
  use serde_json::json;

  fn consultant(approved: bool) -> ConsultantProfile {
    serde_json::from_value(json!({
      "id": 7,
      "fullName": "Dr. Okafor",
      "expertise": ["soil health", "maize"],
      "approved": approved,
      "rating": 4.5
    }))
    .unwrap()
  }

  #[tokio::test]
  async fn test_unapproved_consultant_cannot_be_requested() {
    let h = harness(Some(Role::Farmer));
    let ctx = Context::new(Services::new(h.ctx.clone(), h.router.clone()), h.router.clone());
    let listing = Consultants::new(ctx);

    let key = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
    assert!(matches!(
      listing.handle_key(key, Some(&consultant(false))),
      ViewAction::None
    ));
    assert_eq!(
      h.ctx.notifier.latest().unwrap().message,
      "Dr. Okafor is not approved yet"
    );
  }

  #[tokio::test]
  async fn test_request_opens_prompt() {
    let h = harness(Some(Role::Farmer));
    let ctx = Context::new(Services::new(h.ctx.clone(), h.router.clone()), h.router.clone());
    let listing = Consultants::new(ctx);

    let key = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
    assert!(matches!(
      listing.handle_key(key, Some(&consultant(true))),
      ViewAction::Push(_)
    ));
  }

  #[test]
  fn test_rating_label() {
    assert_eq!(rating(&consultant(true)), "4.5★");
  }
}

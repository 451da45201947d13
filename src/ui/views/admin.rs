use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

use crate::domain::{ConsultantProfile, UserAccount};
use crate::store::{LoadState, Store};
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, ViewAction};
use crate::ui::views::detail::field;
use crate::ui::views::list::{ListView, Listing};
use crate::ui::Context;

/// Every account on the platform
pub struct Users {
  ctx: Context,
}

impl Users {
  pub fn new(ctx: Context) -> Self {
    Self { ctx }
  }

  fn set_active(&self, user: &UserAccount, active: bool) {
    if user.active == active {
      let state = if active { "active" } else { "inactive" };
      self
        .ctx
        .notifier()
        .error(format!("{} is already {}", user.email, state));
      return;
    }
    let id = user.id;
    let services = self.ctx.services.clone();
    self.ctx.spawn(async move {
      services.admin.set_active(id, active).await;
    });
  }
}

impl Listing for Users {
  type Item = UserAccount;

  fn title(&self) -> &'static str {
    "Users"
  }

  fn store(&self) -> Store<Vec<UserAccount>> {
    self.ctx.services.admin.users()
  }

  fn status(&self) -> Store<LoadState> {
    self.ctx.services.admin.users_status()
  }

  fn refresh(&self) {
    drop(self.ctx.services.admin.refresh_users());
  }

  fn row(&self, u: &UserAccount) -> Line<'static> {
    let (state, color) = if u.active {
      ("active", Color::Green)
    } else {
      ("inactive", Color::Red)
    };
    Line::from(vec![
      Span::styled(format!("#{:<6}", u.id), Style::default().fg(Color::Cyan)),
      Span::styled(format!("{:<12}", u.role.to_string()), Style::default().fg(Color::Yellow)),
      Span::styled(format!("{:<10}", state), Style::default().fg(color)),
      Span::raw(format!("{:<26}", truncate(&u.full_name, 24))),
      Span::styled(u.email.clone(), Style::default().fg(Color::DarkGray)),
    ])
  }

  fn search_text(&self, u: &UserAccount) -> String {
    format!("{} {} {}", u.full_name, u.email, u.role)
  }

  fn detail(&self, u: &UserAccount) -> (String, Vec<Line<'static>>) {
    let lines = vec![
      field("Name", u.full_name.clone()),
      field("Email", u.email.clone()),
      field("Role", u.role.to_string()),
      field("Active", if u.active { "yes" } else { "no" }),
    ];
    (format!("User #{}", u.id), lines)
  }

  fn empty_message(&self) -> &'static str {
    "No accounts yet."
  }

  fn handle_key(&self, key: KeyEvent, selected: Option<&UserAccount>) -> ViewAction {
    match (key.code, selected) {
      (KeyCode::Char('p'), _) => {
        return ViewAction::Push(Box::new(ListView::new(Pending::new(self.ctx.clone()))));
      }
      (KeyCode::Char('a'), Some(user)) => self.set_active(user, true),
      (KeyCode::Char('d'), Some(user)) => self.set_active(user, false),
      _ => {}
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("a", "activate").with_priority(40),
      ShortcutInfo::new("d", "deactivate").with_priority(41),
      ShortcutInfo::new("p", "pending").with_priority(42),
    ]
  }
}

/// Consultants waiting for approval
pub struct Pending {
  ctx: Context,
}

impl Pending {
  pub fn new(ctx: Context) -> Self {
    Self { ctx }
  }
}

impl Listing for Pending {
  type Item = ConsultantProfile;

  fn title(&self) -> &'static str {
    "Pending consultants"
  }

  fn store(&self) -> Store<Vec<ConsultantProfile>> {
    self.ctx.services.admin.pending_consultants()
  }

  fn status(&self) -> Store<LoadState> {
    self.ctx.services.admin.pending_status()
  }

  fn refresh(&self) {
    drop(self.ctx.services.admin.refresh_pending());
  }

  fn row(&self, c: &ConsultantProfile) -> Line<'static> {
    Line::from(vec![
      Span::styled(format!("#{:<6}", c.id), Style::default().fg(Color::Cyan)),
      Span::raw(format!("{:<26}", truncate(&c.full_name, 24))),
      Span::styled(
        format!("{:<30}", truncate(&c.email, 28)),
        Style::default().fg(Color::DarkGray),
      ),
      Span::raw(truncate(&c.expertise.join(", "), 40)),
    ])
  }

  fn search_text(&self, c: &ConsultantProfile) -> String {
    format!("{} {} {}", c.full_name, c.email, c.expertise.join(" "))
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
    ];
    (c.full_name.clone(), lines)
  }

  fn empty_message(&self) -> &'static str {
    "No consultants are waiting for approval."
  }

  fn handle_key(&self, key: KeyEvent, selected: Option<&ConsultantProfile>) -> ViewAction {
    let Some(c) = selected else {
      return ViewAction::None;
    };
    let id = c.id;
    let services = self.ctx.services.clone();
    match key.code {
      KeyCode::Char('a') => self.ctx.spawn(async move {
        services.admin.approve(id).await;
      }),
      KeyCode::Char('x') => self.ctx.spawn(async move {
        services.admin.reject(id).await;
      }),
      _ => {}
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("a", "approve").with_priority(40),
      ShortcutInfo::new("x", "reject").with_priority(41),
    ]
  }
}

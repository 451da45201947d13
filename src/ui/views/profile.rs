use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::domain::{ConsultantProfile, FarmerProfile, ProfileUpdate, Role};
use crate::store::LoadState;
use crate::ui::components::Form;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::detail::field;
use crate::ui::views::prompt::{optional, push_prompt};
use crate::ui::{Context, Watch};

enum Profile {
  Farmer(Watch<FarmerProfile>),
  Consultant(Watch<ConsultantProfile>),
  Admin,
}

/// The signed-in user's own profile
pub struct ProfileView {
  ctx: Context,
  profile: Profile,
  status: Option<Watch<LoadState>>,
}

impl ProfileView {
  pub fn new(ctx: Context) -> Self {
    let services = &ctx.services;
    let (profile, status) = match ctx.role() {
      Some(Role::Farmer) => (
        Profile::Farmer(Watch::store(&services.farmer.profile())),
        Some(Watch::store(&services.farmer.profile_status())),
      ),
      Some(Role::Consultant) => (
        Profile::Consultant(Watch::store(&services.consultant.profile())),
        Some(Watch::store(&services.consultant.profile_status())),
      ),
      _ => (Profile::Admin, None),
    };
    Self {
      ctx,
      profile,
      status,
    }
  }

  fn lines(&self) -> Option<Vec<Line<'static>>> {
    match &self.profile {
      Profile::Farmer(watch) => watch.value().map(|p| {
        vec![
          field("Name", p.full_name.clone()),
          field("Email", p.email.clone()),
          field("Phone", p.phone.clone().unwrap_or_default()),
          field("Farm", p.farm_name.clone().unwrap_or_default()),
          field("Location", p.location.clone().unwrap_or_default()),
          field(
            "Farm size",
            p.farm_size_acres
              .map(|a| format!("{} acres", a))
              .unwrap_or_default(),
          ),
          field("Crops", p.primary_crops.join(", ")),
        ]
      }),
      Profile::Consultant(watch) => watch.value().map(|p| {
        vec![
          field("Name", p.full_name.clone()),
          field("Email", p.email.clone()),
          field("Phone", p.phone.clone().unwrap_or_default()),
          field("Expertise", p.expertise.join(", ")),
          field(
            "Experience",
            p.years_experience
              .map(|y| format!("{} years", y))
              .unwrap_or_default(),
          ),
          field(
            "Rating",
            p.rating.map(|r| format!("{:.1}", r)).unwrap_or_default(),
          ),
          field("Approved", if p.approved { "yes" } else { "pending review" }),
        ]
      }),
      Profile::Admin => {
        let session = self.ctx.services.auth.session()?;
        Some(vec![
          field("Email", session.email),
          field("Role", session.role.to_string()),
        ])
      }
    }
  }

  fn edit(&self) -> ViewAction {
    let form = match &self.profile {
      Profile::Farmer(watch) => {
        let Some(p) = watch.value() else {
          return ViewAction::None;
        };
        Form::new("Edit profile")
          .field("Full name", p.full_name.clone())
          .field("Phone", p.phone.clone().unwrap_or_default())
          .field("Location", p.location.clone().unwrap_or_default())
          .field("Farm name", p.farm_name.clone().unwrap_or_default())
      }
      Profile::Consultant(watch) => {
        let Some(p) = watch.value() else {
          return ViewAction::None;
        };
        Form::new("Edit profile")
          .field("Full name", p.full_name.clone())
          .field("Phone", p.phone.clone().unwrap_or_default())
      }
      Profile::Admin => return ViewAction::None,
    };

    push_prompt(&self.ctx, "Edit", form, |ctx, values| {
      let update = ProfileUpdate {
        full_name: optional(&values[0]),
        phone: values.get(1).and_then(|v| optional(v)),
        location: values.get(2).and_then(|v| optional(v)),
        farm_name: values.get(3).and_then(|v| optional(v)),
      };
      update.validate().map_err(|e| e.to_string())?;

      let services = ctx.services.clone();
      match ctx.role() {
        Some(Role::Farmer) => ctx.spawn(async move {
          services.farmer.update_profile(&update).await;
        }),
        Some(Role::Consultant) => ctx.spawn(async move {
          services.consultant.update_profile(&update).await;
        }),
        _ => return Err("This account has no editable profile".to_string()),
      }
      Ok(())
    })
  }

  fn refresh(&self) {
    match &self.profile {
      Profile::Farmer(_) => drop(self.ctx.services.farmer.refresh_profile()),
      Profile::Consultant(_) => drop(self.ctx.services.consultant.refresh_profile()),
      Profile::Admin => {}
    }
  }
}

impl View for ProfileView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('e') => return self.edit(),
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Profile ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let state = self
      .status
      .as_ref()
      .and_then(|s| s.value().cloned())
      .unwrap_or_default();
    let lines = match (self.lines(), state) {
      (Some(lines), _) => lines,
      (None, LoadState::Failed(e)) => vec![Line::styled(
        format!("Failed to load profile: {}. Press 'r' to retry.", e),
        Style::default().fg(Color::Red),
      )],
      (None, _) => vec![Line::styled(
        "Loading...",
        Style::default().fg(Color::DarkGray),
      )],
    };

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Profile".to_string()
  }

  fn tick(&mut self) {
    match &mut self.profile {
      Profile::Farmer(watch) => {
        watch.poll();
      }
      Profile::Consultant(watch) => {
        watch.poll();
      }
      Profile::Admin => {}
    }
    if let Some(status) = &mut self.status {
      status.poll();
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ];
    if !matches!(self.profile, Profile::Admin) {
      shortcuts.push(ShortcutInfo::new("e", "edit").with_priority(20));
      shortcuts.push(ShortcutInfo::new("r", "refresh").with_priority(30));
    }
    shortcuts
  }
}

use std::io::stdout;
use std::time::Duration;

use chrono::Utc;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;

use crate::commands::{self, CommandAction};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::notify::Notification;
use crate::router::Route;
use crate::session::Session;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{
  Consultants, Consultations, FeedbackList, ListView, LoginView, ProfileView, RegisterView,
  Reports, Users, Visits,
};
use crate::ui::{self, Context, Watch};

/// How long a notification stays in the footer
const NOTIFICATION_TTL_SECS: i64 = 6;

/// Main application state
pub struct App {
  ctx: Context,

  api_url: String,

  /// Prefills the login form
  default_email: Option<String>,

  /// Navigation stack. The root is chosen by the router; detail views and
  /// prompts are pushed on top.
  view_stack: Vec<Box<dyn View>>,

  /// Route the root view was built for
  shown: Option<Route>,

  /// Command palette (after pressing :)
  command_input: CommandInput,

  route: Watch<Route>,
  session: Watch<Session>,
  notification: Watch<Notification>,

  should_quit: bool,
}

impl App {
  pub fn new(ctx: Context, config: &Config) -> Self {
    let router = ctx.router.clone();
    let auth = ctx.services.context().auth.clone();
    let notifier = ctx.services.context().notifier.clone();

    let mut app = Self {
      api_url: config.api.url.clone(),
      default_email: config.account.email.clone(),
      view_stack: Vec::new(),
      shown: None,
      command_input: CommandInput::new(),
      route: Watch::new(|observer| router.subscribe(observer)),
      session: Watch::new(|observer| auth.subscribe(observer)),
      notification: Watch::new(|observer| notifier.subscribe(observer)),
      should_quit: false,
      ctx,
    };
    app.sync_route();
    app
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));
    let result = self.event_loop(&mut terminal, &mut events).await;

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => {
          self.handle_key(key);
          self.tick();
        }
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }
    Ok(())
  }

  pub fn should_quit(&self) -> bool {
    self.should_quit
  }

  /// Drain store updates into the app and every view on the stack
  pub fn tick(&mut self) {
    self.sync_route();
    self.session.poll();
    self.notification.poll();
    for view in &mut self.view_stack {
      view.tick();
    }
  }

  /// Rebuild the root view when the router moved
  fn sync_route(&mut self) {
    self.route.poll();
    let route = self.route.value().copied().unwrap_or(Route::Login);
    if self.shown != Some(route) {
      self.show(route);
    }
  }

  fn show(&mut self, requested: Route) {
    let route = self.guard(requested);
    if route != requested {
      // The redirect comes back through the route watch as a no-op
      self.ctx.router.navigate(route);
    }

    tracing::debug!(route = route.label(), "show");
    self.view_stack = vec![self.view_for(route)];
    self.shown = Some(route);
  }

  /// Where the user may actually go when asking for `route`
  fn guard(&self, route: Route) -> Route {
    let role = self.ctx.role();
    if !route.requires_auth() {
      return route;
    }
    let Some(role) = role else {
      return Route::Login;
    };

    let allowed = commands::COMMANDS
      .iter()
      .filter(|c| c.action == CommandAction::Navigate(route))
      .any(|c| c.allowed_for(Some(role)));
    if allowed {
      route
    } else {
      self.ctx.notifier().error(format!(
        "{} is not available to {} accounts",
        route.label(),
        role.to_string().to_lowercase()
      ));
      Route::home_for(role)
    }
  }

  fn view_for(&self, route: Route) -> Box<dyn View> {
    let ctx = self.ctx.clone();
    match route {
      Route::Login => Box::new(LoginView::new(ctx, self.default_email.as_deref())),
      Route::Register => Box::new(RegisterView::new(ctx)),
      Route::Consultations => Box::new(ListView::new(Consultations::new(ctx))),
      Route::Reports => Box::new(ListView::new(Reports::new(ctx))),
      Route::FarmVisits => Box::new(ListView::new(Visits::new(ctx))),
      Route::Feedback => Box::new(ListView::new(FeedbackList::new(ctx))),
      Route::Consultants => Box::new(ListView::new(Consultants::new(ctx))),
      Route::Profile => Box::new(ProfileView::new(ctx)),
      Route::Admin => Box::new(ListView::new(Users::new(ctx))),
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if self.command_input.is_active() {
      match self.command_input.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(name)) => self.execute(name),
        KeyResult::Event(CommandEvent::Unknown(input)) => {
          if !input.is_empty() {
            self
              .ctx
              .notifier()
              .error(format!("Unknown command: {}", input));
          }
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled | KeyResult::NotHandled => {}
      }
    } else {
      self.handle_view_key(key);
    }

    // Commands and view actions may have moved the router
    self.sync_route();
  }

  fn handle_view_key(&mut self, key: KeyEvent) {
    let Some(view) = self.view_stack.last_mut() else {
      return;
    };

    if key.code == KeyCode::Char(':') && !view.captures_text() {
      self.command_input.activate(self.ctx.role());
      return;
    }

    match view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute(&mut self, name: &str) {
    let Some(command) = commands::find(name) else {
      return;
    };
    let role = self.ctx.role();
    if !command.allowed_for(role) {
      self
        .ctx
        .notifier()
        .error(format!("Command not available: {}", name));
      return;
    }

    match command.action {
      CommandAction::Navigate(route) if self.shown == Some(route) => {
        // Same root; drop anything pushed on top
        self.view_stack.truncate(1);
      }
      CommandAction::Navigate(route) => self.ctx.router.navigate(route),
      CommandAction::Logout => self.ctx.services.logout(),
      CommandAction::Quit => self.should_quit = true,
    }
  }

  // Accessors for rendering

  pub fn api_url(&self) -> &str {
    &self.api_url
  }

  pub fn session(&self) -> Option<&Session> {
    self.session.value()
  }

  /// Latest notification while it is still fresh
  pub fn notification(&self) -> Option<&Notification> {
    self
      .notification
      .value()
      .filter(|n| (Utc::now() - n.at).num_seconds() < NOTIFICATION_TTL_SECS)
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command_input
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }

  pub fn shortcuts(&self) -> Vec<ShortcutInfo> {
    self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default()
  }
}

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::store::{LoadState, Store};
use crate::ui::components::{FilterInput, KeyResult};
use crate::ui::ensure_valid_selection;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::DetailView;
use crate::ui::Watch;

/// What a list view shows and what its keys do.
pub trait Listing {
  type Item: Clone + Send + Sync + 'static;

  fn title(&self) -> &'static str;

  /// The backing store. Called once; may start the first fetch.
  fn store(&self) -> Store<Vec<Self::Item>>;

  fn status(&self) -> Store<LoadState>;

  fn refresh(&self);

  fn row(&self, item: &Self::Item) -> Line<'static>;

  /// Text the `/` filter matches against
  fn search_text(&self, item: &Self::Item) -> String;

  /// Lines for the detail view opened with Enter
  fn detail(&self, item: &Self::Item) -> (String, Vec<Line<'static>>);

  fn empty_message(&self) -> &'static str {
    "Nothing here yet."
  }

  /// Kind-specific keys. `selected` is the highlighted row, if any.
  fn handle_key(&self, _key: KeyEvent, _selected: Option<&Self::Item>) -> ViewAction {
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    Vec::new()
  }
}

/// Generic list over one cached collection
pub struct ListView<L: Listing> {
  listing: L,
  items: Watch<Vec<L::Item>>,
  status: Watch<LoadState>,
  list_state: ListState,
  filter: FilterInput,
}

impl<L: Listing> ListView<L> {
  pub fn new(listing: L) -> Self {
    let items = Watch::store(&listing.store());
    let status = Watch::store(&listing.status());

    Self {
      listing,
      items,
      status,
      list_state: ListState::default(),
      filter: FilterInput::new(),
    }
  }

  fn visible(&self) -> Vec<&L::Item> {
    self
      .items
      .value()
      .map(|items| {
        items
          .iter()
          .filter(|item| self.filter.matches(&self.listing.search_text(item)))
          .collect()
      })
      .unwrap_or_default()
  }

  fn selected(&self) -> Option<&L::Item> {
    let index = self.list_state.selected()?;
    self.visible().get(index).copied()
  }

  fn load_state(&self) -> LoadState {
    self.status.value().cloned().unwrap_or_default()
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.visible().len();
    ensure_valid_selection(&mut self.list_state, len);

    let state = self.load_state();
    let filter = if self.filter.query().is_empty() {
      String::new()
    } else {
      format!(" /{}", self.filter.query())
    };
    let title = match &state {
      LoadState::Loading => format!(" {}{} (loading...) ", self.listing.title(), filter),
      LoadState::Failed(e) => format!(" {}{} (error: {}) ", self.listing.title(), filter, e),
      _ => format!(" {}{} ({}) ", self.listing.title(), filter, len),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      // Not loaded and loaded-but-empty read differently
      let content = match (self.items.value(), &state) {
        (None, LoadState::Failed(_)) => "Failed to load. Press 'r' to retry.",
        (None, _) => "Loading...",
        (Some(items), _) if items.is_empty() => self.listing.empty_message(),
        (Some(_), _) => "No rows match the filter.",
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .visible()
      .into_iter()
      .map(|item| ListItem::new(self.listing.row(item)))
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl<L: Listing> View for ListView<L> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Let the filter component try first
    match self.filter.handle_key(key) {
      KeyResult::Event(_) => {
        self.list_state.select(None);
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => self.listing.refresh(),
      KeyCode::Enter => {
        if let Some(item) = self.selected() {
          let (title, lines) = self.listing.detail(item);
          return ViewAction::Push(Box::new(DetailView::new(title, lines)));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => return self.listing.handle_key(key, self.selected()),
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.filter.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.listing.title().to_string()
  }

  fn tick(&mut self) {
    self.items.poll();
    self.status.poll();
  }

  fn captures_text(&self) -> bool {
    self.filter.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "filter").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ];
    shortcuts.extend(self.listing.shortcuts());
    shortcuts
  }
}

use crate::commands::Route;
use crate::session::Session;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
  /// Open a top-level screen; the App owns the client and session needed to build it
  Navigate(Route),
  /// Login finished
  LoggedIn(Session),
  /// Show a message in the footer
  Flash(String),
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, forms, pickers) and return
/// actions for the App to execute: App → View → Components.
///
/// Views that load data asynchronously own a `Query<T>` and poll it in
/// `tick()`.
pub trait View {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to poll async queries. A finished submission may
  /// ask the App to do something (flash a message, finish login).
  fn tick(&mut self) -> ViewAction {
    ViewAction::None
  }

  /// True while the view is taking free text, so the App leaves `:` and `q`
  /// alone
  fn captures_input(&self) -> bool {
    false
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "go to").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

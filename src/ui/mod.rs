pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

const FLASH_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
  Info,
  Error,
}

/// Short-lived footer message
#[derive(Debug, Clone)]
pub struct Flash {
  pub message: String,
  pub level: FlashLevel,
  shown_at: Instant,
}

impl Flash {
  pub fn info(message: impl Into<String>) -> Self {
    Self::new(message, FlashLevel::Info)
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self::new(message, FlashLevel::Error)
  }

  fn new(message: impl Into<String>, level: FlashLevel) -> Self {
    Self {
      message: message.into(),
      level,
      shown_at: Instant::now(),
    }
  }

  pub fn is_expired(&self) -> bool {
    self.shown_at.elapsed() > FLASH_TTL
  }
}

/// Keep a list selection inside `0..len`.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match (state.selected(), len) {
    (_, 0) => state.select(None),
    (None, _) => state.select(Some(0)),
    (Some(i), len) if i >= len => state.select(Some(len - 1)),
    _ => {}
  }
}

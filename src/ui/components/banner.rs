use super::KeyResult;
use crate::cache::{FetchResult, Reason};
use chrono::{DateTime, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Notice {
  /// Network failed, showing a cached snapshot
  Cached(DateTime<Utc>),
  /// Network failed and nothing was cached
  Offline,
  /// The server answered with nothing to show
  NoData,
}

/// One-line notice above a screen's content when it is not showing live data.
/// `x` dismisses it until the next load result arrives.
#[derive(Debug, Clone, Default)]
pub struct Banner {
  notice: Option<Notice>,
  dismissed: bool,
}

impl Banner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn update<T>(&mut self, result: &FetchResult<T>) {
    self.dismissed = false;
    self.notice = match result {
      FetchResult::Fresh(_) => None,
      FetchResult::Stale { cached_at, .. } => Some(Notice::Cached(*cached_at)),
      FetchResult::Empty(Reason::NoData) => Some(Notice::NoData),
      FetchResult::Empty(_) => Some(Notice::Offline),
    };
  }

  pub fn is_visible(&self) -> bool {
    self.notice.is_some() && !self.dismissed
  }

  /// Rows to reserve above the content
  pub fn height(&self) -> u16 {
    u16::from(self.is_visible())
  }

  pub fn text(&self) -> Option<String> {
    if self.dismissed {
      return None;
    }
    self.notice.as_ref().map(|notice| match notice {
      Notice::Cached(at) => format!(
        "Network error, showing cached data from {}",
        at.with_timezone(&Local).format("%d %b %Y %H:%M")
      ),
      Notice::Offline => "Network error, no cached data available".to_string(),
      Notice::NoData => "No data available".to_string(),
    })
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<()> {
    if key.code == KeyCode::Char('x') && self.is_visible() {
      self.dismissed = true;
      KeyResult::Handled
    } else {
      KeyResult::NotHandled
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let (Some(text), Some(notice)) = (self.text(), self.notice.as_ref()) else {
      return;
    };

    let style = match notice {
      Notice::NoData => Style::default().fg(Color::Black).bg(Color::Gray),
      _ => Style::default().fg(Color::Black).bg(Color::Yellow),
    };

    let line = Line::from(vec![
      Span::raw(format!(" {} ", text)),
      Span::styled(" x dismiss ", style.add_modifier(Modifier::DIM)),
    ]);
    frame.render_widget(Paragraph::new(line).style(style), area);
  }
}

//! Notice board filtering.

use chrono::{Days, NaiveDate};

use crate::api::types::Notice;

/// How far back the notice board looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeWindow {
  All,
  LastDays(u32),
}

const WINDOW_STEPS: [NoticeWindow; 4] = [
  NoticeWindow::LastDays(7),
  NoticeWindow::LastDays(30),
  NoticeWindow::LastDays(90),
  NoticeWindow::All,
];

impl NoticeWindow {
  /// 0 means no window
  pub fn from_days(days: u32) -> Self {
    if days == 0 {
      NoticeWindow::All
    } else {
      NoticeWindow::LastDays(days)
    }
  }

  /// Cycle 7 → 30 → 90 → all → 7 days.
  pub fn next(self) -> Self {
    match WINDOW_STEPS.iter().position(|w| *w == self) {
      Some(i) => WINDOW_STEPS[(i + 1) % WINDOW_STEPS.len()],
      None => WINDOW_STEPS[0],
    }
  }

  pub fn label(self) -> String {
    match self {
      NoticeWindow::All => "all".to_string(),
      NoticeWindow::LastDays(days) => format!("last {} days", days),
    }
  }

  /// Earliest date inside the window
  fn since(self, today: NaiveDate) -> Option<NaiveDate> {
    match self {
      NoticeWindow::All => None,
      NoticeWindow::LastDays(days) => today.checked_sub_days(Days::new(days as u64)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeFilter {
  pub text: String,
  pub window: NoticeWindow,
}

impl NoticeFilter {
  pub fn new(window: NoticeWindow) -> Self {
    Self {
      text: String::new(),
      window,
    }
  }

  pub fn matches(&self, notice: &Notice, today: NaiveDate) -> bool {
    if let Some(since) = self.window.since(today) {
      if notice.date < since {
        return false;
      }
    }

    let needle = self.text.trim().to_lowercase();
    needle.is_empty()
      || notice.title.to_lowercase().contains(&needle)
      || notice.body.to_lowercase().contains(&needle)
  }

  /// Matching notices, newest first.
  pub fn apply<'a>(&self, notices: &'a [Notice], today: NaiveDate) -> Vec<&'a Notice> {
    let mut matched: Vec<&Notice> = notices
      .iter()
      .filter(|n| self.matches(n, today))
      .collect();
    matched.sort_by(|a, b| b.date.cmp(&a.date));
    matched
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn notice(title: &str, body: &str, y: i32, m: u32, d: u32) -> Notice {
    Notice {
      title: title.to_string(),
      body: body.to_string(),
      date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
    }
  }

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()
  }

  fn board() -> Vec<Notice> {
    vec![
      notice("PTM on Saturday", "Parents meet class teachers", 2024, 11, 18),
      notice("Winter uniform", "From 1st December", 2024, 11, 1),
      notice("Sports day", "Annual sports day results", 2024, 8, 10),
    ]
  }

  #[test]
  fn test_window_excludes_old_notices() {
    let filter = NoticeFilter::new(NoticeWindow::LastDays(7));
    let board = board();
    let titles: Vec<&str> = filter
      .apply(&board, today())
      .iter()
      .map(|n| n.title.as_str())
      .collect();
    assert_eq!(titles, ["PTM on Saturday"]);
  }

  #[test]
  fn test_all_window_newest_first() {
    let filter = NoticeFilter::new(NoticeWindow::All);
    let board = board();
    let titles: Vec<&str> = filter
      .apply(&board, today())
      .iter()
      .map(|n| n.title.as_str())
      .collect();
    assert_eq!(titles, ["PTM on Saturday", "Winter uniform", "Sports day"]);
  }

  #[test]
  fn test_text_matches_title_or_body_case_insensitive() {
    let mut filter = NoticeFilter::new(NoticeWindow::All);
    let board = board();
    filter.text = "SPORTS".to_string();
    assert_eq!(filter.apply(&board, today()).len(), 1);

    filter.text = "december".to_string();
    let matched = filter.apply(&board, today());
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].title, "Winter uniform");
  }

  #[test]
  fn test_text_and_window_combine() {
    let mut filter = NoticeFilter::new(NoticeWindow::LastDays(30));
    filter.text = "sports".to_string();
    assert!(filter.apply(&board(), today()).is_empty());
  }

  #[test]
  fn test_window_boundary_is_inclusive() {
    let filter = NoticeFilter::new(NoticeWindow::LastDays(19));
    let notices = vec![notice("Edge", "", 2024, 11, 1)];
    assert_eq!(filter.apply(&notices, today()).len(), 1);
  }

  #[test]
  fn test_window_cycle() {
    assert_eq!(NoticeWindow::LastDays(7).next(), NoticeWindow::LastDays(30));
    assert_eq!(NoticeWindow::LastDays(90).next(), NoticeWindow::All);
    assert_eq!(NoticeWindow::All.next(), NoticeWindow::LastDays(7));
    assert_eq!(NoticeWindow::LastDays(14).next(), NoticeWindow::LastDays(7));
    assert_eq!(NoticeWindow::from_days(0), NoticeWindow::All);
  }
}

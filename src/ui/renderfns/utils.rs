use crate::api::types::AttendanceStatus;
use crate::cache::FetchResult;
use ratatui::prelude::Color;

/// Truncate to `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

pub fn attendance_color(status: AttendanceStatus) -> Color {
  match status {
    AttendanceStatus::Present => Color::Green,
    AttendanceStatus::Absent => Color::Red,
    AttendanceStatus::Leave => Color::Yellow,
    AttendanceStatus::Holiday => Color::Blue,
  }
}

/// Rupee amount with Indian digit grouping: 125000.0 -> "₹1,25,000"
pub fn format_rupees(amount: f64) -> String {
  let sign = if amount < 0.0 { "-" } else { "" };
  let paise_total = (amount.abs() * 100.0).round() as u64;
  let (rupees, paise) = (paise_total / 100, paise_total % 100);

  let digits = rupees.to_string();
  let grouped = if digits.len() <= 3 {
    digits
  } else {
    let (head, last3) = digits.split_at(digits.len() - 3);
    let mut parts: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
      let (front, pair) = rest.split_at(rest.len() - 2);
      parts.push(pair);
      rest = front;
    }
    parts.push(rest);
    parts.reverse();
    format!("{},{}", parts.join(","), last3)
  };

  if paise == 0 {
    format!("{}₹{}", sign, grouped)
  } else {
    format!("{}₹{}.{:02}", sign, grouped, paise)
  }
}

/// Short suffix for panel titles describing where the data came from
pub fn source_label<T>(result: Option<&FetchResult<T>>, loading: bool) -> &'static str {
  match (result, loading) {
    (_, true) => " (loading...)",
    (Some(FetchResult::Stale { .. }), _) => " (cached)",
    (Some(FetchResult::Empty(_)), _) => " (unavailable)",
    _ => "",
  }
}

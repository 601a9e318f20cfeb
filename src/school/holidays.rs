//! Holiday countdown and month grouping.

use chrono::{Datelike, NaiveDate};

use crate::api::types::Holiday;

/// Whole days from `today` to `date`; negative once the date has passed.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
  (date - today).num_days()
}

pub fn countdown_label(days: i64) -> String {
  match days {
    0 => "Today".to_string(),
    1 => "Tomorrow".to_string(),
    -1 => "Yesterday".to_string(),
    d if d > 1 => format!("in {} days", d),
    d => format!("{} days ago", -d),
  }
}

/// The earliest holiday on or after `today`, with its countdown.
pub fn next_holiday(holidays: &[Holiday], today: NaiveDate) -> Option<(&Holiday, i64)> {
  holidays
    .iter()
    .filter(|h| h.date >= today)
    .min_by_key(|h| h.date)
    .map(|h| (h, days_until(h.date, today)))
}

/// Holidays sharing a calendar month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGroup<'a> {
  pub label: String,
  pub holidays: Vec<&'a Holiday>,
}

/// Group holidays by month, in date order.
pub fn group_by_month(holidays: &[Holiday]) -> Vec<MonthGroup<'_>> {
  let mut sorted: Vec<&Holiday> = holidays.iter().collect();
  sorted.sort_by_key(|h| h.date);

  let mut groups: Vec<MonthGroup> = Vec::new();
  let mut current: Option<(i32, u32)> = None;

  for holiday in sorted {
    let month = (holiday.date.year(), holiday.date.month());
    if current != Some(month) {
      groups.push(MonthGroup {
        label: holiday.date.format("%B %Y").to_string(),
        holidays: Vec::new(),
      });
      current = Some(month);
    }
    if let Some(group) = groups.last_mut() {
      group.holidays.push(holiday);
    }
  }

  groups
}

#[cfg(test)]
mod tests {
  use super::*;

  fn holiday(name: &str, y: i32, m: u32, d: u32) -> Holiday {
    Holiday {
      name: name.to_string(),
      date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
    }
  }

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_days_until() {
    assert_eq!(days_until(day(2024, 11, 1), day(2024, 10, 25)), 7);
    assert_eq!(days_until(day(2024, 11, 1), day(2024, 11, 1)), 0);
    assert_eq!(days_until(day(2024, 11, 1), day(2024, 11, 3)), -2);
  }

  #[test]
  fn test_countdown_labels() {
    assert_eq!(countdown_label(0), "Today");
    assert_eq!(countdown_label(1), "Tomorrow");
    assert_eq!(countdown_label(12), "in 12 days");
    assert_eq!(countdown_label(-1), "Yesterday");
    assert_eq!(countdown_label(-5), "5 days ago");
  }

  #[test]
  fn test_next_holiday_skips_past() {
    let holidays = vec![
      holiday("Christmas", 2024, 12, 25),
      holiday("Holi", 2024, 3, 25),
      holiday("Diwali", 2024, 11, 1),
    ];
    let (next, days) = next_holiday(&holidays, day(2024, 10, 30)).unwrap();
    assert_eq!(next.name, "Diwali");
    assert_eq!(days, 2);
  }

  #[test]
  fn test_next_holiday_today_counts() {
    let holidays = vec![holiday("Diwali", 2024, 11, 1)];
    let (_, days) = next_holiday(&holidays, day(2024, 11, 1)).unwrap();
    assert_eq!(days, 0);
    assert!(next_holiday(&holidays, day(2024, 11, 2)).is_none());
  }

  #[test]
  fn test_group_by_month_sorted() {
    let holidays = vec![
      holiday("Christmas", 2024, 12, 25),
      holiday("Bhai Dooj", 2024, 11, 3),
      holiday("Diwali", 2024, 11, 1),
      holiday("New Year", 2025, 1, 1),
    ];
    let groups = group_by_month(&holidays);
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, ["November 2024", "December 2024", "January 2025"]);
    let november: Vec<&str> = groups[0].holidays.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(november, ["Diwali", "Bhai Dooj"]);
  }

  #[test]
  fn test_same_month_different_year_split() {
    let holidays = vec![holiday("A", 2024, 1, 1), holiday("B", 2025, 1, 1)];
    assert_eq!(group_by_month(&holidays).len(), 2);
  }
}

//! Month calendar layout for attendance.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::api::types::{AttendanceRecord, AttendanceStatus};

/// One day in the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
  pub date: NaiveDate,
  pub status: Option<AttendanceStatus>,
}

impl DayCell {
  pub fn day(&self) -> u32 {
    self.date.day()
  }
}

/// A month laid out in Sunday-first weeks; cells outside the month are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
  first: NaiveDate,
  pub weeks: Vec<[Option<DayCell>; 7]>,
}

impl MonthGrid {
  /// Lay out `year`/`month`, marking days that have an attendance record.
  /// Returns `None` for an invalid month.
  pub fn build(year: i32, month: u32, records: &[AttendanceRecord]) -> Option<Self> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let marks: HashMap<NaiveDate, AttendanceStatus> = records
      .iter()
      .filter(|r| r.date.year() == year && r.date.month() == month)
      .map(|r| (r.date, r.status))
      .collect();

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut column = first.weekday().num_days_from_sunday() as usize;

    for date in first.iter_days().take_while(|d| d.month() == month) {
      week[column] = Some(DayCell {
        date,
        status: marks.get(&date).copied(),
      });
      column += 1;
      if column == 7 {
        weeks.push(week);
        week = [None; 7];
        column = 0;
      }
    }
    if column > 0 {
      weeks.push(week);
    }

    Some(Self { first, weeks })
  }

  /// "November 2024"
  pub fn title(&self) -> String {
    self.first.format("%B %Y").to_string()
  }

  pub fn year(&self) -> i32 {
    self.first.year()
  }

  pub fn month(&self) -> u32 {
    self.first.month()
  }
}

/// Step a (year, month) pair by `delta` months.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
  let total = year * 12 + (month as i32 - 1) + delta;
  (total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
}

/// Counts for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceSummary {
  pub present: u32,
  pub absent: u32,
  pub leave: u32,
  pub holiday: u32,
}

impl AttendanceSummary {
  pub fn for_month(records: &[AttendanceRecord], year: i32, month: u32) -> Self {
    let mut days: HashMap<NaiveDate, AttendanceStatus> = HashMap::new();
    for r in records
      .iter()
      .filter(|r| r.date.year() == year && r.date.month() == month)
    {
      days.insert(r.date, r.status);
    }

    let mut summary = Self::default();
    for status in days.values() {
      match status {
        AttendanceStatus::Present => summary.present += 1,
        AttendanceStatus::Absent => summary.absent += 1,
        AttendanceStatus::Leave => summary.leave += 1,
        AttendanceStatus::Holiday => summary.holiday += 1,
      }
    }
    summary
  }

  /// Days the school was open and attendance was taken
  pub fn school_days(&self) -> u32 {
    self.present + self.absent + self.leave
  }

  /// Present share of school days, `None` before any day is marked
  pub fn percentage(&self) -> Option<f64> {
    let days = self.school_days();
    (days > 0).then(|| self.present as f64 * 100.0 / days as f64)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(y: i32, m: u32, d: u32, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
      date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
      status,
    }
  }

  #[test]
  fn test_grid_starts_on_weekday_of_first() {
    // 1 November 2024 was a Friday
    let grid = MonthGrid::build(2024, 11, &[]).unwrap();
    let first_week = grid.weeks[0];
    assert!(first_week[..5].iter().all(Option::is_none));
    assert_eq!(first_week[5].map(|c| c.day()), Some(1));
    assert_eq!(first_week[6].map(|c| c.day()), Some(2));
    assert_eq!(grid.weeks.len(), 5);
    assert_eq!(grid.title(), "November 2024");
  }

  #[test]
  fn test_grid_covers_every_day_once() {
    let grid = MonthGrid::build(2024, 2, &[]).unwrap();
    let days: Vec<u32> = grid.weeks.iter().flatten().flatten().map(|c| c.day()).collect();
    assert_eq!(days, (1..=29).collect::<Vec<_>>());
  }

  #[test]
  fn test_month_starting_on_sunday() {
    // 1 September 2024 was a Sunday
    let grid = MonthGrid::build(2024, 9, &[]).unwrap();
    assert_eq!(grid.weeks[0][0].map(|c| c.day()), Some(1));
  }

  #[test]
  fn test_grid_marks_only_this_month() {
    let records = vec![
      record(2024, 11, 4, AttendanceStatus::Present),
      record(2024, 10, 4, AttendanceStatus::Absent),
    ];
    let grid = MonthGrid::build(2024, 11, &records).unwrap();
    let marked: Vec<_> = grid
      .weeks
      .iter()
      .flatten()
      .flatten()
      .filter(|c| c.status.is_some())
      .collect();
    assert_eq!(marked.len(), 1);
    assert_eq!(marked[0].day(), 4);
    assert_eq!(marked[0].status, Some(AttendanceStatus::Present));
  }

  #[test]
  fn test_invalid_month() {
    assert!(MonthGrid::build(2024, 13, &[]).is_none());
  }

  #[test]
  fn test_shift_month_across_years() {
    assert_eq!(shift_month(2024, 12, 1), (2025, 1));
    assert_eq!(shift_month(2024, 1, -1), (2023, 12));
    assert_eq!(shift_month(2024, 6, -18), (2022, 12));
  }

  #[test]
  fn test_summary_percentage() {
    let records = vec![
      record(2024, 11, 4, AttendanceStatus::Present),
      record(2024, 11, 5, AttendanceStatus::Present),
      record(2024, 11, 6, AttendanceStatus::Present),
      record(2024, 11, 7, AttendanceStatus::Absent),
      record(2024, 11, 1, AttendanceStatus::Holiday),
    ];
    let summary = AttendanceSummary::for_month(&records, 2024, 11);
    assert_eq!(summary.present, 3);
    assert_eq!(summary.school_days(), 4);
    assert_eq!(summary.percentage(), Some(75.0));
  }

  #[test]
  fn test_summary_duplicate_day_counts_once() {
    let records = vec![
      record(2024, 11, 4, AttendanceStatus::Absent),
      record(2024, 11, 4, AttendanceStatus::Present),
    ];
    let summary = AttendanceSummary::for_month(&records, 2024, 11);
    assert_eq!(summary.school_days(), 1);
    assert_eq!(summary.present, 1);
  }

  #[test]
  fn test_empty_summary_has_no_percentage() {
    assert_eq!(AttendanceSummary::default().percentage(), None);
  }
}

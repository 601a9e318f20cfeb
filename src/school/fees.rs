//! Fee dues.

use chrono::NaiveDate;

use crate::api::types::FeeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeState {
  Paid,
  Due,
  Overdue,
}

impl FeeState {
  pub fn of(record: &FeeRecord, today: NaiveDate) -> Self {
    match (record.paid, record.due_date) {
      (true, _) => FeeState::Paid,
      (false, Some(due)) if due < today => FeeState::Overdue,
      (false, _) => FeeState::Due,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      FeeState::Paid => "Paid",
      FeeState::Due => "Due",
      FeeState::Overdue => "Overdue",
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeeTotals {
  pub paid: f64,
  /// Unpaid, including overdue
  pub outstanding: f64,
  pub overdue: f64,
}

impl FeeTotals {
  pub fn of(records: &[FeeRecord], today: NaiveDate) -> Self {
    records.iter().fold(Self::default(), |mut totals, record| {
      match FeeState::of(record, today) {
        FeeState::Paid => totals.paid += record.amount,
        FeeState::Due => totals.outstanding += record.amount,
        FeeState::Overdue => {
          totals.outstanding += record.amount;
          totals.overdue += record.amount;
        }
      }
      totals
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fee(amount: f64, due: Option<(i32, u32, u32)>, paid: bool) -> FeeRecord {
    FeeRecord {
      period: "Term".to_string(),
      amount,
      due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
      paid,
      receipt_no: None,
    }
  }

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()
  }

  #[test]
  fn test_state() {
    assert_eq!(FeeState::of(&fee(100.0, Some((2024, 10, 1)), true), today()), FeeState::Paid);
    assert_eq!(FeeState::of(&fee(100.0, Some((2024, 10, 1)), false), today()), FeeState::Overdue);
    assert_eq!(FeeState::of(&fee(100.0, Some((2024, 11, 20)), false), today()), FeeState::Due);
    assert_eq!(FeeState::of(&fee(100.0, None, false), today()), FeeState::Due);
  }

  #[test]
  fn test_totals() {
    let records = vec![
      fee(1500.0, Some((2024, 4, 10)), true),
      fee(1500.0, Some((2024, 10, 10)), false),
      fee(2000.0, Some((2025, 1, 10)), false),
    ];
    let totals = FeeTotals::of(&records, today());
    assert_eq!(totals.paid, 1500.0);
    assert_eq!(totals.outstanding, 3500.0);
    assert_eq!(totals.overdue, 1500.0);
  }
}

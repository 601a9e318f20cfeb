use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mark recorded for a single school day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
  Present,
  Absent,
  Leave,
  Holiday,
}

impl AttendanceStatus {
  /// Parse the codes the portal uses ("P", "A", "L", "H" and spelled-out forms).
  pub fn from_code(code: &str) -> Option<Self> {
    match code.trim().to_ascii_lowercase().as_str() {
      "p" | "present" | "1" => Some(AttendanceStatus::Present),
      "a" | "absent" | "0" => Some(AttendanceStatus::Absent),
      "l" | "leave" | "on leave" => Some(AttendanceStatus::Leave),
      "h" | "holiday" => Some(AttendanceStatus::Holiday),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      AttendanceStatus::Present => "Present",
      AttendanceStatus::Absent => "Absent",
      AttendanceStatus::Leave => "Leave",
      AttendanceStatus::Holiday => "Holiday",
    }
  }
}

/// Attendance for one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub date: NaiveDate,
  pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
  pub name: String,
  pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
  pub title: String,
  pub body: String,
  pub date: NaiveDate,
}

/// One fee installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRecord {
  pub period: String,
  pub amount: f64,
  pub due_date: Option<NaiveDate>,
  pub paid: bool,
  pub receipt_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
  pub student_id: String,
  pub name: String,
  pub class_name: String,
  pub section: Option<String>,
  pub roll_no: Option<String>,
  pub admission_no: Option<String>,
  pub father_name: Option<String>,
  pub mother_name: Option<String>,
  pub mobile: Option<String>,
  pub dob: Option<NaiveDate>,
  pub address: Option<String>,
}

impl StudentProfile {
  /// "VII-B" style class label
  pub fn class_label(&self) -> String {
    match &self.section {
      Some(section) => format!("{}-{}", self.class_name, section),
      None => self.class_name.clone(),
    }
  }

  pub fn to_ref(&self) -> StudentRef {
    StudentRef {
      student_id: self.student_id.clone(),
      name: self.name.clone(),
      class_name: self.class_label(),
    }
  }
}

/// Student linked to a parent's mobile number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
  pub student_id: String,
  pub name: String,
  pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
  pub id: String,
  pub name: String,
}

/// Server acknowledgement for a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveApplication {
  pub student_id: String,
  pub from: NaiveDate,
  pub to: NaiveDate,
  pub reason: String,
}

impl LeaveApplication {
  /// Calendar days covered, both ends inclusive
  pub fn days(&self) -> i64 {
    (self.to - self.from).num_days() + 1
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complaint {
  pub student_id: String,
  pub subject: String,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
  pub student_id: String,
  pub rating: u8,
  pub comment: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_attendance_codes() {
    assert_eq!(
      AttendanceStatus::from_code("P"),
      Some(AttendanceStatus::Present)
    );
    assert_eq!(
      AttendanceStatus::from_code(" absent "),
      Some(AttendanceStatus::Absent)
    );
    assert_eq!(AttendanceStatus::from_code("L"), Some(AttendanceStatus::Leave));
    assert_eq!(AttendanceStatus::from_code("x"), None);
  }

  #[test]
  fn test_leave_days_inclusive() {
    let leave = LeaveApplication {
      student_id: "S1".to_string(),
      from: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
      to: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
      reason: "Fever".to_string(),
    };
    assert_eq!(leave.days(), 3);
  }

  #[test]
  fn test_class_label() {
    let profile = StudentProfile {
      student_id: "S1".to_string(),
      name: "Aarav".to_string(),
      class_name: "VII".to_string(),
      section: Some("B".to_string()),
      roll_no: None,
      admission_no: None,
      father_name: None,
      mother_name: None,
      mobile: None,
      dob: None,
      address: None,
    };
    assert_eq!(profile.class_label(), "VII-B");
    assert_eq!(profile.to_ref().class_name, "VII-B");
  }
}

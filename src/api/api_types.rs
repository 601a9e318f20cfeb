//! Serde types matching portal API requests and responses.
//!
//! The PHP backend is loose about types: ids and amounts arrive as strings or
//! numbers, dates as `YYYY-MM-DD` or `DD-MM-YYYY`, and legacy endpoints return
//! a bare array instead of the `{status, data, msg}` envelope. Everything is
//! normalized here so the domain types stay strict.

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::ApiError;
use super::types::{
  AdminAccount, AttendanceRecord, AttendanceStatus, FeeRecord, Holiday, Notice, StudentProfile,
  StudentRef,
};

// ============================================================================
// Lenient scalar helpers
// ============================================================================

fn scalar_to_string(value: Value) -> Option<String> {
  match value {
    Value::String(s) => {
      let s = s.trim().to_string();
      (!s.is_empty()).then_some(s)
    }
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

/// Accept a string, number or bool; missing/null becomes an empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  Ok(scalar_to_string(value).unwrap_or_default())
}

/// Like `lenient_string`, but null and blank strings become `None`.
fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  Ok(scalar_to_string(value))
}

/// Parse the date formats the portal emits.
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  // Timestamps like "2024-11-01 09:30:00" carry the date in the first 10 chars
  let date_part = raw.get(..10).unwrap_or(raw);

  ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"]
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn parse_amount(raw: &str) -> Option<f64> {
  raw.replace(',', "").trim().parse().ok()
}

fn parse_paid(raw: Option<&str>) -> bool {
  matches!(
    raw.map(|s| s.to_ascii_lowercase()).as_deref(),
    Some("paid" | "1" | "true" | "yes" | "success")
  )
}

// ============================================================================
// Response envelope
// ============================================================================

/// `{status: "success"|"error", data, msg?, count?}`
#[derive(Debug, Deserialize)]
pub struct Envelope {
  #[serde(deserialize_with = "lenient_string")]
  pub status: String,
  #[serde(default)]
  pub data: Option<Value>,
  #[serde(default, alias = "message", deserialize_with = "lenient_opt")]
  pub msg: Option<String>,
  #[serde(default)]
  pub count: Option<Value>,
}

impl Envelope {
  pub fn is_success(&self) -> bool {
    matches!(
      self.status.to_ascii_lowercase().as_str(),
      "success" | "ok" | "true" | "1"
    )
  }

  fn rejection(self) -> ApiError {
    ApiError::Rejected(self.msg.unwrap_or_else(|| "request failed".to_string()))
  }
}

/// Either shape the API answers with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiReply {
  Bare(Vec<Value>),
  Envelope(Envelope),
}

impl ApiReply {
  pub fn from_body(body: &str) -> Result<Self, ApiError> {
    // Some PHP endpoints prefix the JSON with a UTF-8 BOM
    let body = body.trim_start_matches('\u{feff}');
    Ok(serde_json::from_str(body)?)
  }

  /// Unwrap to the list of records; `status: "error"` becomes `Rejected`.
  pub fn into_items(self) -> Result<Vec<Value>, ApiError> {
    match self {
      ApiReply::Bare(items) => Ok(items),
      ApiReply::Envelope(env) if env.is_success() => {
        let items = match env.data {
          Some(Value::Array(items)) => items,
          Some(Value::Null) | None => Vec::new(),
          Some(single) => vec![single],
        };
        if let Some(count) = env.count.and_then(scalar_to_string) {
          if count != items.len().to_string() {
            debug!(%count, received = items.len(), "envelope count mismatch");
          }
        }
        Ok(items)
      }
      ApiReply::Envelope(env) => Err(env.rejection()),
    }
  }

  /// Unwrap a write acknowledgement. Legacy endpoints answer a refused
  /// write with a bare `[]`.
  pub fn into_message(self) -> Result<Option<String>, ApiError> {
    match self {
      ApiReply::Bare(items) if items.is_empty() => {
        Err(ApiError::Rejected("The portal did not accept the request".to_string()))
      }
      ApiReply::Bare(_) => Ok(None),
      ApiReply::Envelope(env) if env.is_success() => Ok(env.msg),
      ApiReply::Envelope(env) => Err(env.rejection()),
    }
  }
}

/// Decode each record on its own so one bad row does not sink the list.
pub fn decode_records<W: DeserializeOwned>(task: &str, items: Vec<Value>) -> Vec<W> {
  items
    .into_iter()
    .filter_map(|item| match serde_json::from_value(item) {
      Ok(record) => Some(record),
      Err(e) => {
        warn!(task, error = %e, "skipping undecodable record");
        None
      }
    })
    .collect()
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StudentRequest<'a> {
  pub student_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct OtpRequest<'a> {
  pub mobile: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpRequest<'a> {
  pub mobile: &'a str,
  pub otp: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
  pub username: &'a str,
  pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
  pub query: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LeaveRequest<'a> {
  pub student_id: &'a str,
  pub from_date: String,
  pub to_date: String,
  pub reason: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ComplaintRequest<'a> {
  pub student_id: &'a str,
  pub subject: &'a str,
  pub complaint: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ReviewRequest<'a> {
  pub student_id: &'a str,
  pub rating: u8,
  pub review: &'a str,
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiAttendance {
  #[serde(alias = "attendance_date", alias = "att_date", deserialize_with = "lenient_string")]
  pub date: String,
  #[serde(alias = "attendance", alias = "att_status", deserialize_with = "lenient_string")]
  pub status: String,
}

impl ApiAttendance {
  pub fn into_domain(self) -> Option<AttendanceRecord> {
    Some(AttendanceRecord {
      date: parse_api_date(&self.date)?,
      status: AttendanceStatus::from_code(&self.status)?,
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiHoliday {
  #[serde(alias = "name", alias = "title", deserialize_with = "lenient_string")]
  pub holiday_name: String,
  #[serde(alias = "date", deserialize_with = "lenient_string")]
  pub holiday_date: String,
}

impl ApiHoliday {
  pub fn into_domain(self) -> Option<Holiday> {
    Some(Holiday {
      date: parse_api_date(&self.holiday_date)?,
      name: self.holiday_name,
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiNotice {
  #[serde(alias = "notice_title", alias = "subject", deserialize_with = "lenient_string")]
  pub title: String,
  #[serde(
    default,
    alias = "notice",
    alias = "description",
    alias = "notice_desc",
    deserialize_with = "lenient_string"
  )]
  pub body: String,
  #[serde(
    alias = "notice_date",
    alias = "created_at",
    deserialize_with = "lenient_string"
  )]
  pub date: String,
}

impl ApiNotice {
  pub fn into_domain(self) -> Option<Notice> {
    Some(Notice {
      date: parse_api_date(&self.date)?,
      title: self.title,
      body: self.body,
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiFee {
  #[serde(alias = "fee_month", alias = "month", alias = "fee_type", deserialize_with = "lenient_string")]
  pub period: String,
  #[serde(alias = "fee_amount", alias = "total", deserialize_with = "lenient_string")]
  pub amount: String,
  #[serde(default, alias = "last_date", deserialize_with = "lenient_opt")]
  pub due_date: Option<String>,
  #[serde(default, alias = "status", alias = "fee_status", deserialize_with = "lenient_opt")]
  pub paid: Option<String>,
  #[serde(default, alias = "receipt", deserialize_with = "lenient_opt")]
  pub receipt_no: Option<String>,
}

impl ApiFee {
  pub fn into_domain(self) -> Option<FeeRecord> {
    Some(FeeRecord {
      amount: parse_amount(&self.amount)?,
      due_date: self.due_date.as_deref().and_then(parse_api_date),
      paid: parse_paid(self.paid.as_deref()),
      receipt_no: self.receipt_no,
      period: self.period,
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiStudent {
  #[serde(alias = "id", alias = "st_id", deserialize_with = "lenient_string")]
  pub student_id: String,
  #[serde(alias = "name", alias = "st_name", deserialize_with = "lenient_string")]
  pub student_name: String,
  #[serde(default, alias = "class_name", deserialize_with = "lenient_string")]
  pub class: String,
  #[serde(default, deserialize_with = "lenient_opt")]
  pub section: Option<String>,
  #[serde(default, deserialize_with = "lenient_opt")]
  pub roll_no: Option<String>,
  #[serde(default, alias = "admission_number", deserialize_with = "lenient_opt")]
  pub admission_no: Option<String>,
  #[serde(default, deserialize_with = "lenient_opt")]
  pub father_name: Option<String>,
  #[serde(default, deserialize_with = "lenient_opt")]
  pub mother_name: Option<String>,
  #[serde(default, alias = "mobile_no", alias = "phone", deserialize_with = "lenient_opt")]
  pub mobile: Option<String>,
  #[serde(default, alias = "date_of_birth", deserialize_with = "lenient_opt")]
  pub dob: Option<String>,
  #[serde(default, deserialize_with = "lenient_opt")]
  pub address: Option<String>,
}

impl ApiStudent {
  pub fn into_profile(self) -> Option<StudentProfile> {
    if self.student_id.is_empty() {
      return None;
    }
    Some(StudentProfile {
      dob: self.dob.as_deref().and_then(parse_api_date),
      student_id: self.student_id,
      name: self.student_name,
      class_name: self.class,
      section: self.section,
      roll_no: self.roll_no,
      admission_no: self.admission_no,
      father_name: self.father_name,
      mother_name: self.mother_name,
      mobile: self.mobile,
      address: self.address,
    })
  }

  pub fn into_ref(self) -> Option<StudentRef> {
    self.into_profile().map(|p| p.to_ref())
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiAdmin {
  #[serde(alias = "admin_id", deserialize_with = "lenient_string")]
  pub id: String,
  #[serde(default, alias = "admin_name", alias = "username", deserialize_with = "lenient_string")]
  pub name: String,
}

impl ApiAdmin {
  pub fn into_account(self, username: &str) -> AdminAccount {
    let id = if self.id.is_empty() {
      username.to_string()
    } else {
      self.id
    };
    let name = if self.name.is_empty() {
      username.to_string()
    } else {
      self.name
    };
    AdminAccount { id, name }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bare_array_and_envelope_yield_same_items() {
    let bare = ApiReply::from_body(r#"[{"holiday_name":"Diwali","holiday_date":"2024-11-01"}]"#)
      .unwrap()
      .into_items()
      .unwrap();
    let wrapped = ApiReply::from_body(
      r#"{"status":"success","data":[{"holiday_name":"Diwali","holiday_date":"2024-11-01"}],"count":1}"#,
    )
    .unwrap()
    .into_items()
    .unwrap();
    assert_eq!(bare, wrapped);
  }

  #[test]
  fn test_error_envelope_is_rejected() {
    let err = ApiReply::from_body(r#"{"status":"error","msg":"Invalid OTP"}"#)
      .unwrap()
      .into_items()
      .unwrap_err();
    assert!(matches!(err, ApiError::Rejected(msg) if msg == "Invalid OTP"));
  }

  #[test]
  fn test_success_without_data_is_empty() {
    let items = ApiReply::from_body(r#"{"status":"success","data":null}"#)
      .unwrap()
      .into_items()
      .unwrap();
    assert!(items.is_empty());
  }

  #[test]
  fn test_single_object_data_becomes_one_item() {
    let items = ApiReply::from_body(r#"{"status":"success","data":{"id":"7"}}"#)
      .unwrap()
      .into_items()
      .unwrap();
    assert_eq!(items.len(), 1);
  }

  #[test]
  fn test_garbage_is_malformed() {
    assert!(matches!(
      ApiReply::from_body("<html>Fatal error</html>"),
      Err(ApiError::Malformed(_))
    ));
  }

  #[test]
  fn test_bom_is_ignored() {
    let reply = ApiReply::from_body("\u{feff}[]").unwrap();
    assert!(reply.into_items().unwrap().is_empty());
  }

  #[test]
  fn test_empty_bare_ack_is_rejected() {
    let err = ApiReply::from_body("[]").unwrap().into_message().unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)));

    let ok = ApiReply::from_body(r#"[{"id":"9"}]"#).unwrap().into_message();
    assert!(matches!(ok, Ok(None)));

    let msg = ApiReply::from_body(r#"{"status":"success","msg":"Leave applied"}"#)
      .unwrap()
      .into_message()
      .unwrap();
    assert_eq!(msg.as_deref(), Some("Leave applied"));
  }

  #[test]
  fn test_parse_api_date_formats() {
    let expected = NaiveDate::from_ymd_opt(2024, 11, 1);
    assert_eq!(parse_api_date("2024-11-01"), expected);
    assert_eq!(parse_api_date("01-11-2024"), expected);
    assert_eq!(parse_api_date("01/11/2024"), expected);
    assert_eq!(parse_api_date("2024-11-01 09:30:00"), expected);
    assert_eq!(parse_api_date("soon"), None);
  }

  #[test]
  fn test_numeric_fields_as_strings_or_numbers() {
    let items: Vec<ApiFee> = decode_records(
      "student_fee",
      serde_json::from_str(
        r#"[{"fee_month":"April","amount":"1,500.50","status":"Paid"},
            {"fee_month":"May","amount":1500,"status":0}]"#,
      )
      .unwrap(),
    );
    let fees: Vec<FeeRecord> = items.into_iter().filter_map(ApiFee::into_domain).collect();
    assert_eq!(fees.len(), 2);
    assert_eq!(fees[0].amount, 1500.5);
    assert!(fees[0].paid);
    assert_eq!(fees[1].amount, 1500.0);
    assert!(!fees[1].paid);
  }

  #[test]
  fn test_bad_records_are_skipped() {
    let items: Vec<ApiHoliday> = decode_records(
      "holiday_list",
      serde_json::from_str(
        r#"[{"holiday_name":"Holi","holiday_date":"2024-03-25"}, {"unexpected": 1}]"#,
      )
      .unwrap(),
    );
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].holiday_name, "Holi");
  }

  #[test]
  fn test_attendance_with_unknown_code_is_dropped() {
    let record = ApiAttendance {
      date: "2024-07-01".to_string(),
      status: "?".to_string(),
    };
    assert!(record.into_domain().is_none());
  }

  #[test]
  fn test_student_numeric_id() {
    let items: Vec<ApiStudent> = decode_records(
      "get_otp",
      serde_json::from_str(r#"[{"student_id": 42, "student_name": "Riya", "class": "V"}]"#)
        .unwrap(),
    );
    let student = items.into_iter().next().unwrap().into_ref().unwrap();
    assert_eq!(student.student_id, "42");
    assert_eq!(student.class_name, "V");
  }

  #[test]
  fn test_admin_falls_back_to_username() {
    let admin = ApiAdmin {
      id: String::new(),
      name: String::new(),
    };
    let account = admin.into_account("office");
    assert_eq!(account.id, "office");
    assert_eq!(account.name, "office");
  }
}

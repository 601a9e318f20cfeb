//! Validation for the portal's input forms.

use chrono::NaiveDate;
use thiserror::Error;

use crate::api::api_types::parse_api_date;
use crate::api::types::{Complaint, LeaveApplication, Review};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
  #[error("{0} is required")]
  Required(&'static str),
  #[error("Enter a 10 digit mobile number")]
  InvalidMobile,
  #[error("Enter the code sent to your phone (4 to 6 digits)")]
  InvalidOtp,
  #[error("{0} must be a date like 2024-03-15")]
  InvalidDate(&'static str),
  #[error("Leave cannot end before it starts")]
  DateOrder,
  #[error("Rating must be between 1 and 5")]
  Rating,
}

fn required(label: &'static str, value: &str) -> Result<String, FormError> {
  let value = value.trim();
  if value.is_empty() {
    Err(FormError::Required(label))
  } else {
    Ok(value.to_string())
  }
}

/// Accepts "98765 43210", "+91 9876543210" and "09876543210".
pub fn validate_mobile(raw: &str) -> Result<String, FormError> {
  let digits: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
  let digits = digits
    .strip_prefix("+91")
    .or_else(|| (digits.len() == 11).then(|| digits.strip_prefix('0')).flatten())
    .unwrap_or(digits.as_str());

  if digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit()) {
    Ok(digits.to_string())
  } else {
    Err(FormError::InvalidMobile)
  }
}

pub fn validate_otp(raw: &str) -> Result<String, FormError> {
  let otp = raw.trim();
  if (4..=6).contains(&otp.len()) && otp.chars().all(|c| c.is_ascii_digit()) {
    Ok(otp.to_string())
  } else {
    Err(FormError::InvalidOtp)
  }
}

pub fn parse_form_date(label: &'static str, raw: &str) -> Result<NaiveDate, FormError> {
  let raw = required(label, raw)?;
  parse_api_date(&raw).ok_or(FormError::InvalidDate(label))
}

pub fn admin_credentials(username: &str, password: &str) -> Result<(String, String), FormError> {
  let username = required("Username", username)?;
  if password.is_empty() {
    return Err(FormError::Required("Password"));
  }
  Ok((username, password.to_string()))
}

pub fn leave_application(
  student_id: &str,
  from: &str,
  to: &str,
  reason: &str,
) -> Result<LeaveApplication, FormError> {
  let from = parse_form_date("From date", from)?;
  let to = parse_form_date("To date", to)?;
  if to < from {
    return Err(FormError::DateOrder);
  }

  Ok(LeaveApplication {
    student_id: student_id.to_string(),
    from,
    to,
    reason: required("Reason", reason)?,
  })
}

pub fn complaint(student_id: &str, subject: &str, message: &str) -> Result<Complaint, FormError> {
  Ok(Complaint {
    student_id: student_id.to_string(),
    subject: required("Subject", subject)?,
    message: required("Message", message)?,
  })
}

pub fn review(student_id: &str, rating: u8, comment: &str) -> Result<Review, FormError> {
  if !(1..=5).contains(&rating) {
    return Err(FormError::Rating);
  }
  Ok(Review {
    student_id: student_id.to_string(),
    rating,
    comment: comment.trim().to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mobile_formats() {
    assert_eq!(validate_mobile("98765 43210").unwrap(), "9876543210");
    assert_eq!(validate_mobile("+91 98765-43210").unwrap(), "9876543210");
    assert_eq!(validate_mobile("09876543210").unwrap(), "9876543210");
    assert_eq!(validate_mobile("12345"), Err(FormError::InvalidMobile));
    assert_eq!(validate_mobile("98765abcde"), Err(FormError::InvalidMobile));
  }

  #[test]
  fn test_otp() {
    assert_eq!(validate_otp(" 1234 ").unwrap(), "1234");
    assert_eq!(validate_otp("123"), Err(FormError::InvalidOtp));
    assert_eq!(validate_otp("12a4"), Err(FormError::InvalidOtp));
  }

  #[test]
  fn test_leave_valid() {
    let leave = leave_application("S1", "2024-03-04", "06-03-2024", " Fever ").unwrap();
    assert_eq!(leave.days(), 3);
    assert_eq!(leave.reason, "Fever");
  }

  #[test]
  fn test_leave_order() {
    assert_eq!(
      leave_application("S1", "2024-03-06", "2024-03-04", "Fever"),
      Err(FormError::DateOrder)
    );
  }

  #[test]
  fn test_leave_missing_fields() {
    assert_eq!(
      leave_application("S1", "", "2024-03-04", "Fever"),
      Err(FormError::Required("From date"))
    );
    assert_eq!(
      leave_application("S1", "2024-03-04", "tomorrow", "Fever"),
      Err(FormError::InvalidDate("To date"))
    );
    assert_eq!(
      leave_application("S1", "2024-03-04", "2024-03-04", "  "),
      Err(FormError::Required("Reason"))
    );
  }

  #[test]
  fn test_complaint_requires_both_fields() {
    assert_eq!(
      complaint("S1", "Bus", ""),
      Err(FormError::Required("Message"))
    );
    assert!(complaint("S1", "Bus", "Late every day").is_ok());
  }

  #[test]
  fn test_review_range() {
    assert_eq!(review("S1", 0, ""), Err(FormError::Rating));
    assert_eq!(review("S1", 6, ""), Err(FormError::Rating));
    assert_eq!(review("S1", 5, " great ").unwrap().comment, "great");
  }

  #[test]
  fn test_admin_credentials() {
    assert_eq!(
      admin_credentials(" ", "x"),
      Err(FormError::Required("Username"))
    );
    assert_eq!(
      admin_credentials("office", ""),
      Err(FormError::Required("Password"))
    );
    assert_eq!(
      admin_credentials("office", " pw ").unwrap(),
      ("office".to_string(), " pw ".to_string())
    );
  }

  #[test]
  fn test_error_messages() {
    assert_eq!(
      FormError::Required("Subject").to_string(),
      "Subject is required"
    );
  }
}

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::api_types::{
  decode_records, ApiAdmin, ApiAttendance, ApiFee, ApiHoliday, ApiNotice, ApiReply, ApiStudent,
  ComplaintRequest, LeaveRequest, LoginRequest, OtpRequest, ReviewRequest, SearchRequest,
  StudentRequest, VerifyOtpRequest,
};
use super::error::ApiError;
use super::types::{
  Ack, AdminAccount, AttendanceRecord, Complaint, FeeRecord, Holiday, LeaveApplication, Notice,
  Review, StudentProfile, StudentRef,
};
use crate::config::ApiConfig;

/// Portal API tasks, sent as `?task=<name>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
  Attendance,
  Holidays,
  Notices,
  SendOtp,
  VerifyOtp,
  SearchStudent,
  Complaint,
  LeaveApply,
  Review,
  Fees,
  AdminLogin,
  Profile,
}

impl Task {
  pub fn as_str(self) -> &'static str {
    match self {
      Task::Attendance => "get_attendance",
      Task::Holidays => "holiday_list",
      Task::Notices => "get_notice",
      Task::SendOtp => "send_otp",
      Task::VerifyOtp => "get_otp",
      Task::SearchStudent => "search_student",
      Task::Complaint => "st_complaints",
      Task::LeaveApply => "student_leave_apply",
      Task::Review => "send_review",
      Task::Fees => "student_fee",
      Task::AdminLogin => "login",
      Task::Profile => "get_student_profile",
    }
  }
}

/// Portal API client
#[derive(Clone)]
pub struct DpsClient {
  http: reqwest::Client,
  base_url: Url,
}

impl DpsClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let base_url =
      Url::parse(&config.url).map_err(|e| eyre!("Invalid API url {}: {}", config.url, e))?;

    let mut builder =
      reqwest::Client::builder().user_agent(concat!("dps-portal/", env!("CARGO_PKG_VERSION")));
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }

    let http = builder
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base_url })
  }

  /// Endpoint URL for a task, keeping any query the base URL already has.
  pub fn task_url(&self, task: Task) -> Url {
    let mut url = self.base_url.clone();
    url.query_pairs_mut().append_pair("task", task.as_str());
    url
  }

  async fn send(&self, task: Task, request: reqwest::RequestBuilder) -> Result<ApiReply, ApiError> {
    debug!(task = task.as_str(), "sending request");

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(ApiError::Status(status));
    }

    let body = response.text().await?;
    ApiReply::from_body(&body)
  }

  async fn get(&self, task: Task) -> Result<ApiReply, ApiError> {
    self.send(task, self.http.get(self.task_url(task))).await
  }

  async fn post<B: Serialize + ?Sized>(&self, task: Task, body: &B) -> Result<ApiReply, ApiError> {
    self
      .send(task, self.http.post(self.task_url(task)).json(body))
      .await
  }

  async fn post_records<B, W>(&self, task: Task, body: &B) -> Result<Vec<W>, ApiError>
  where
    B: Serialize + ?Sized,
    W: DeserializeOwned,
  {
    let items = self.post(task, body).await?.into_items()?;
    Ok(decode_records(task.as_str(), items))
  }

  async fn post_ack<B: Serialize + ?Sized>(&self, task: Task, body: &B) -> Result<Ack, ApiError> {
    let message = self.post(task, body).await?.into_message()?;
    Ok(Ack {
      message: message.unwrap_or_else(|| "Submitted successfully".to_string()),
    })
  }

  /// Attendance marks for a student
  pub async fn attendance(&self, student_id: &str) -> Result<Vec<AttendanceRecord>, ApiError> {
    let records: Vec<ApiAttendance> = self
      .post_records(Task::Attendance, &StudentRequest { student_id })
      .await?;
    Ok(records.into_iter().filter_map(ApiAttendance::into_domain).collect())
  }

  /// School-wide holiday list
  pub async fn holidays(&self) -> Result<Vec<Holiday>, ApiError> {
    let items = self.get(Task::Holidays).await?.into_items()?;
    let records: Vec<ApiHoliday> = decode_records(Task::Holidays.as_str(), items);
    Ok(records.into_iter().filter_map(ApiHoliday::into_domain).collect())
  }

  /// Notices visible to a student
  pub async fn notices(&self, student_id: &str) -> Result<Vec<Notice>, ApiError> {
    let records: Vec<ApiNotice> = self
      .post_records(Task::Notices, &StudentRequest { student_id })
      .await?;
    Ok(records.into_iter().filter_map(ApiNotice::into_domain).collect())
  }

  /// Fee installments for a student
  pub async fn fees(&self, student_id: &str) -> Result<Vec<FeeRecord>, ApiError> {
    let records: Vec<ApiFee> = self
      .post_records(Task::Fees, &StudentRequest { student_id })
      .await?;
    Ok(records.into_iter().filter_map(ApiFee::into_domain).collect())
  }

  /// Student profile, as a list so it flows through the same cache path
  pub async fn profile(&self, student_id: &str) -> Result<Vec<StudentProfile>, ApiError> {
    let records: Vec<ApiStudent> = self
      .post_records(Task::Profile, &StudentRequest { student_id })
      .await?;
    Ok(records.into_iter().filter_map(ApiStudent::into_profile).collect())
  }

  /// Admin search by name, admission number or mobile
  pub async fn search_students(&self, query: &str) -> Result<Vec<StudentProfile>, ApiError> {
    let records: Vec<ApiStudent> = self
      .post_records(Task::SearchStudent, &SearchRequest { query })
      .await?;
    Ok(records.into_iter().filter_map(ApiStudent::into_profile).collect())
  }

  /// Ask the portal to text an OTP to a registered mobile number
  pub async fn send_otp(&self, mobile: &str) -> Result<Ack, ApiError> {
    self.post_ack(Task::SendOtp, &OtpRequest { mobile }).await
  }

  /// Verify an OTP; returns the students linked to the mobile number
  pub async fn verify_otp(&self, mobile: &str, otp: &str) -> Result<Vec<StudentRef>, ApiError> {
    let records: Vec<ApiStudent> = self
      .post_records(Task::VerifyOtp, &VerifyOtpRequest { mobile, otp })
      .await?;
    let students: Vec<StudentRef> = records.into_iter().filter_map(ApiStudent::into_ref).collect();

    if students.is_empty() {
      return Err(ApiError::Rejected(
        "No student is linked to this mobile number".to_string(),
      ));
    }
    Ok(students)
  }

  /// Admin username/password login
  pub async fn admin_login(&self, username: &str, password: &str) -> Result<AdminAccount, ApiError> {
    let records: Vec<ApiAdmin> = self
      .post_records(Task::AdminLogin, &LoginRequest { username, password })
      .await?;

    // Legacy endpoints answer bad credentials with a bare `[]`
    records
      .into_iter()
      .next()
      .map(|admin| admin.into_account(username))
      .ok_or_else(|| ApiError::Rejected("Invalid username or password".to_string()))
  }

  pub async fn apply_leave(&self, leave: &LeaveApplication) -> Result<Ack, ApiError> {
    let body = LeaveRequest {
      student_id: &leave.student_id,
      from_date: leave.from.format("%Y-%m-%d").to_string(),
      to_date: leave.to.format("%Y-%m-%d").to_string(),
      reason: &leave.reason,
    };
    self.post_ack(Task::LeaveApply, &body).await
  }

  pub async fn file_complaint(&self, complaint: &Complaint) -> Result<Ack, ApiError> {
    let body = ComplaintRequest {
      student_id: &complaint.student_id,
      subject: &complaint.subject,
      complaint: &complaint.message,
    };
    self.post_ack(Task::Complaint, &body).await
  }

  pub async fn send_review(&self, review: &Review) -> Result<Ack, ApiError> {
    let body = ReviewRequest {
      student_id: &review.student_id,
      rating: review.rating,
      review: &review.comment,
    };
    self.post_ack(Task::Review, &body).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::test_server::TestServer;

  fn client(url: &str) -> DpsClient {
    DpsClient::new(&ApiConfig {
      url: url.to_string(),
      timeout_secs: Some(5),
    })
    .unwrap()
  }

  #[test]
  fn test_task_url_appends_task() {
    let client = client("https://portal.example/api/index.php");
    assert_eq!(
      client.task_url(Task::Holidays).as_str(),
      "https://portal.example/api/index.php?task=holiday_list"
    );
  }

  #[test]
  fn test_task_url_keeps_existing_query() {
    let client = client("https://portal.example/api.php?school=dps");
    assert_eq!(
      client.task_url(Task::VerifyOtp).as_str(),
      "https://portal.example/api.php?school=dps&task=get_otp"
    );
  }

  #[test]
  fn test_invalid_url_is_rejected() {
    assert!(DpsClient::new(&ApiConfig {
      url: "not a url".to_string(),
      timeout_secs: None,
    })
    .is_err());
  }

  #[test]
  fn test_task_names() {
    assert_eq!(Task::LeaveApply.as_str(), "student_leave_apply");
    assert_eq!(Task::Complaint.as_str(), "st_complaints");
    assert_eq!(Task::Profile.as_str(), "get_student_profile");
  }

  #[tokio::test]
  async fn test_admin_login_with_empty_reply_is_rejected() {
    for body in ["[]", r#"{"status":"success","data":[]}"#] {
      let server = TestServer::reply(200, body).await;
      let err = server
        .client()
        .admin_login("intruder", "wrong")
        .await
        .unwrap_err();
      assert!(matches!(err, ApiError::Rejected(msg) if msg == "Invalid username or password"));
    }
  }

  #[tokio::test]
  async fn test_admin_login_returns_account() {
    let server = TestServer::reply(200, r#"[{"admin_id": 3, "admin_name": "Office"}]"#).await;
    let account = server.client().admin_login("office", "secret").await.unwrap();
    assert_eq!(account.id, "3");
    assert_eq!(account.name, "Office");
  }

  #[tokio::test]
  async fn test_empty_ack_is_rejected() {
    let server = TestServer::reply(200, "[]").await;
    let err = server.client().send_otp("9999999999").await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)));
  }

  #[tokio::test]
  async fn test_envelope_ack_message() {
    let server =
      TestServer::reply(200, r#"{"status":"success","msg":"OTP sent to your mobile"}"#).await;
    let ack = server.client().send_otp("9999999999").await.unwrap();
    assert_eq!(ack.message, "OTP sent to your mobile");
  }

  #[tokio::test]
  async fn test_holidays_from_envelope() {
    let server = TestServer::reply(
      200,
      r#"{"status":"success","data":[{"holiday_name":"Diwali","holiday_date":"01-11-2024"}],"count":1}"#,
    )
    .await;
    let holidays = server.client().holidays().await.unwrap();
    assert_eq!(holidays.len(), 1);
    assert_eq!(holidays[0].name, "Diwali");
  }

  #[tokio::test]
  async fn test_server_error_is_transport_error() {
    use crate::cache::FetchFailure;

    let server = TestServer::reply(500, "oops").await;
    let err = server.client().holidays().await.unwrap_err();
    assert!(matches!(err, ApiError::Status(_)));
    assert!(err.is_transport());
  }

  #[tokio::test]
  async fn test_unreachable_server_is_transport_error() {
    use crate::cache::FetchFailure;

    // Port 9 (discard) on localhost is closed in test environments
    let client = client("http://127.0.0.1:9/api.php");
    let err = client.holidays().await.unwrap_err();
    assert!(err.is_transport());
  }
}

//! Portal client that routes every read through the stale-while-error cache.

use color_eyre::Result;

use crate::cache::{
  CacheKey, CacheStorage, FetchResult, NoopStorage, SqliteStorage, StaleWhileErrorFetcher,
};
use crate::config::Config;

use super::client::{DpsClient, Task};
use super::error::ApiError;
use super::types::{
  Ack, AdminAccount, AttendanceRecord, Complaint, FeeRecord, Holiday, LeaveApplication, Notice,
  Review, StudentProfile, StudentRef,
};

/// Portal client with transparent offline support.
///
/// Reads return a [`FetchResult`] so screens can tell live data from a cached
/// snapshot. Writes are never cached and return the API error directly.
#[derive(Clone)]
pub struct CachedDpsClient {
  inner: DpsClient,
  cache: StaleWhileErrorFetcher<Box<dyn CacheStorage>>,
}

impl CachedDpsClient {
  /// Create a new cached client, opening the cache database unless disabled.
  pub fn new(config: &Config) -> Result<Self> {
    let inner = DpsClient::new(&config.api)?;
    let storage: Box<dyn CacheStorage> = if config.cache.enabled {
      Box::new(SqliteStorage::open(&config.cache_path()?)?)
    } else {
      Box::new(NoopStorage)
    };

    Ok(Self::with_storage(inner, storage))
  }

  pub fn with_storage(inner: DpsClient, storage: Box<dyn CacheStorage>) -> Self {
    Self {
      inner,
      cache: StaleWhileErrorFetcher::new(storage),
    }
  }

  pub async fn attendance(&self, student_id: &str) -> FetchResult<Vec<AttendanceRecord>> {
    let key = CacheKey::new(Task::Attendance.as_str(), student_id);
    self
      .cache
      .load(&key, || self.inner.attendance(student_id))
      .await
  }

  /// Holidays are school-wide but still keyed by subject, so one account's
  /// snapshot is never shown to another.
  pub async fn holidays(&self, subject: &str) -> FetchResult<Vec<Holiday>> {
    let key = CacheKey::new(Task::Holidays.as_str(), subject);
    self.cache.load(&key, || self.inner.holidays()).await
  }

  pub async fn notices(&self, student_id: &str) -> FetchResult<Vec<Notice>> {
    let key = CacheKey::new(Task::Notices.as_str(), student_id);
    self.cache.load(&key, || self.inner.notices(student_id)).await
  }

  pub async fn fees(&self, student_id: &str) -> FetchResult<Vec<FeeRecord>> {
    let key = CacheKey::new(Task::Fees.as_str(), student_id);
    self.cache.load(&key, || self.inner.fees(student_id)).await
  }

  pub async fn profile(&self, student_id: &str) -> FetchResult<StudentProfile> {
    let key = CacheKey::new(Task::Profile.as_str(), student_id);
    self
      .cache
      .load(&key, || self.inner.profile(student_id))
      .await
      .first()
  }

  pub async fn search_students(
    &self,
    subject: &str,
    query: &str,
  ) -> FetchResult<Vec<StudentProfile>> {
    let key = CacheKey::new(Task::SearchStudent.as_str(), subject)
      .with_qualifier(normalize_query(query));
    self
      .cache
      .load(&key, || self.inner.search_students(query))
      .await
  }

  pub async fn send_otp(&self, mobile: &str) -> Result<Ack, ApiError> {
    self.inner.send_otp(mobile).await
  }

  pub async fn verify_otp(&self, mobile: &str, otp: &str) -> Result<Vec<StudentRef>, ApiError> {
    self.inner.verify_otp(mobile, otp).await
  }

  pub async fn admin_login(&self, username: &str, password: &str) -> Result<AdminAccount, ApiError> {
    self.inner.admin_login(username, password).await
  }

  pub async fn apply_leave(&self, leave: &LeaveApplication) -> Result<Ack, ApiError> {
    self.inner.apply_leave(leave).await
  }

  pub async fn file_complaint(&self, complaint: &Complaint) -> Result<Ack, ApiError> {
    self.inner.file_complaint(complaint).await
  }

  pub async fn send_review(&self, review: &Review) -> Result<Ack, ApiError> {
    self.inner.send_review(review).await
  }
}

/// Normalize search text so "Ravi " and "ravi" share a cache entry.
fn normalize_query(query: &str) -> String {
  query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

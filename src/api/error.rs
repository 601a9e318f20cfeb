use thiserror::Error;

use crate::cache::FetchFailure;

/// Failures talking to the portal API.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Connection, TLS or timeout failure
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// Server answered with a non-2xx status
  #[error("server returned HTTP {0}")]
  Status(reqwest::StatusCode),

  /// Body was not the JSON shape we expect
  #[error("malformed response: {0}")]
  Malformed(String),

  /// Server answered `status: "error"`
  #[error("{0}")]
  Rejected(String),
}

impl From<serde_json::Error> for ApiError {
  fn from(e: serde_json::Error) -> Self {
    ApiError::Malformed(e.to_string())
  }
}

impl FetchFailure for ApiError {
  fn is_transport(&self) -> bool {
    matches!(self, ApiError::Transport(_) | ApiError::Status(_))
  }
}

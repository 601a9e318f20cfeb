//! Core types for the caching system.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;

/// Identifies one cached resource for one subject.
///
/// The subject (student id or admin account) is part of the key so that
/// switching accounts on the same device never surfaces another account's data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
  resource: String,
  subject: String,
  qualifier: Option<String>,
}

impl CacheKey {
  pub fn new(resource: impl Into<String>, subject: impl Into<String>) -> Self {
    Self {
      resource: resource.into(),
      subject: subject.into(),
      qualifier: None,
    }
  }

  /// Narrow the key by a request parameter (e.g. a search string).
  pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
    self.qualifier = Some(qualifier.into());
    self
  }

  pub fn resource(&self) -> &str {
    &self.resource
  }

  pub fn subject(&self) -> &str {
    &self.subject
  }

  /// Stable, fixed-length key used as the storage primary key.
  pub fn storage_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.resource.as_bytes());
    hasher.update([0u8]);
    hasher.update(self.subject.as_bytes());
    if let Some(q) = &self.qualifier {
      hasher.update([0u8]);
      hasher.update(q.as_bytes());
    }
    hex::encode(hasher.finalize())
  }

  /// Human readable form, stored next to the hash for inspection.
  pub fn description(&self) -> String {
    match &self.qualifier {
      Some(q) => format!("{} [{}] for {}", self.resource, q, self.subject),
      None => format!("{} for {}", self.resource, self.subject),
    }
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.description())
  }
}

/// A cached payload as read back from storage.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  pub payload: serde_json::Value,
  pub written_at: DateTime<Utc>,
}

/// Why a load did not produce fresh data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
  /// Server answered but had nothing usable
  NoData,
  /// Network failed, a previous snapshot is shown
  NetworkCached,
  /// Network failed and nothing was cached
  NetworkUncached,
}

impl Reason {
  pub fn message(self) -> &'static str {
    match self {
      Reason::NoData => "no data found",
      Reason::NetworkCached => "network error, showing cached data",
      Reason::NetworkUncached => "network error, no cached data",
    }
  }
}

impl fmt::Display for Reason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.message())
  }
}

/// Outcome of a load: this call's data, a cached snapshot, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult<T> {
  Fresh(T),
  Stale {
    data: T,
    reason: Reason,
    cached_at: DateTime<Utc>,
  },
  Empty(Reason),
}

impl<T> FetchResult<T> {
  pub fn stale(data: T, cached_at: DateTime<Utc>) -> Self {
    FetchResult::Stale {
      data,
      reason: Reason::NetworkCached,
      cached_at,
    }
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      FetchResult::Fresh(data) | FetchResult::Stale { data, .. } => Some(data),
      FetchResult::Empty(_) => None,
    }
  }

  pub fn reason(&self) -> Option<Reason> {
    match self {
      FetchResult::Fresh(_) => None,
      FetchResult::Stale { reason, .. } => Some(*reason),
      FetchResult::Empty(reason) => Some(*reason),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchResult<U> {
    match self {
      FetchResult::Fresh(data) => FetchResult::Fresh(f(data)),
      FetchResult::Stale {
        data,
        reason,
        cached_at,
      } => FetchResult::Stale {
        data: f(data),
        reason,
        cached_at,
      },
      FetchResult::Empty(reason) => FetchResult::Empty(reason),
    }
  }
}

impl<T> FetchResult<Vec<T>> {
  /// Keep only the first item of a list payload.
  pub fn first(self) -> FetchResult<T> {
    match self.map(|items| items.into_iter().next()) {
      FetchResult::Fresh(Some(item)) => FetchResult::Fresh(item),
      FetchResult::Fresh(None) => FetchResult::Empty(Reason::NoData),
      FetchResult::Stale {
        data: Some(item),
        reason,
        cached_at,
      } => FetchResult::Stale {
        data: item,
        reason,
        cached_at,
      },
      FetchResult::Stale { data: None, .. } => FetchResult::Empty(Reason::NetworkUncached),
      FetchResult::Empty(reason) => FetchResult::Empty(reason),
    }
  }
}

/// Payloads that can tell whether they carry anything worth caching.
pub trait Populated {
  fn is_populated(&self) -> bool;
}

impl<T> Populated for Vec<T> {
  fn is_populated(&self) -> bool {
    !self.is_empty()
  }
}

/// Errors from a fetch operation, split by whether the cache may stand in.
pub trait FetchFailure: fmt::Display {
  /// True for transport failures (connection, timeout, non-2xx status).
  /// Application-level failures return false and never fall back to cache.
  fn is_transport(&self) -> bool;
}

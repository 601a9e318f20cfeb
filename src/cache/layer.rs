//! Stale-while-error fetching: live data when possible, cached data when the
//! network fails, and a reason whenever the result is degraded.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::CacheStorage;
use super::traits::{CacheKey, FetchFailure, FetchResult, Populated, Reason};

/// Fetches a resource and keeps the last good payload per key.
///
/// `load` never fails: every outcome collapses into a [`FetchResult`].
/// There is no expiry; an entry lives until the next successful fetch of the
/// same key replaces it.
pub struct StaleWhileErrorFetcher<S: CacheStorage> {
  storage: Arc<S>,
}

impl<S: CacheStorage> StaleWhileErrorFetcher<S> {
  /// Create a new fetcher with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// Run `fetch` and resolve it against the cache.
  ///
  /// 1. Populated payload: store it under `key`, return `Fresh`
  /// 2. Empty payload or application error: `Empty(NoData)`, cache untouched
  /// 3. Transport failure: cached payload as `Stale`, else `Empty(NetworkUncached)`
  pub async fn load<T, E, F, Fut>(&self, key: &CacheKey, fetch: F) -> FetchResult<T>
  where
    T: Populated + Serialize + DeserializeOwned,
    E: FetchFailure,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    match fetch().await {
      Ok(data) if data.is_populated() => {
        self.store(key, &data);
        FetchResult::Fresh(data)
      }
      Ok(_) => {
        debug!(%key, "empty payload, keeping cache");
        FetchResult::Empty(Reason::NoData)
      }
      Err(e) if !e.is_transport() => {
        warn!(%key, error = %e, "server rejected request");
        FetchResult::Empty(Reason::NoData)
      }
      Err(e) => {
        warn!(%key, error = %e, "fetch failed, trying cache");
        self.fallback(key)
      }
    }
  }

  fn store<T: Serialize>(&self, key: &CacheKey, data: &T) {
    let payload = match serde_json::to_value(data) {
      Ok(payload) => payload,
      Err(e) => {
        warn!(%key, error = %e, "failed to serialize payload for cache");
        return;
      }
    };

    match self.storage.write(key, &payload) {
      Ok(()) => debug!(%key, "cache updated"),
      Err(e) => warn!(%key, error = %e, "failed to write cache"),
    }
  }

  fn fallback<T: DeserializeOwned>(&self, key: &CacheKey) -> FetchResult<T> {
    let entry = match self.storage.read(key) {
      Ok(Some(entry)) => entry,
      Ok(None) => return FetchResult::Empty(Reason::NetworkUncached),
      Err(e) => {
        warn!(%key, error = %e, "failed to read cache");
        return FetchResult::Empty(Reason::NetworkUncached);
      }
    };

    match serde_json::from_value(entry.payload) {
      Ok(data) => {
        debug!(%key, cached_at = %entry.written_at, "serving cached payload");
        FetchResult::stale(data, entry.written_at)
      }
      Err(e) => {
        warn!(%key, error = %e, "cached payload no longer decodes");
        FetchResult::Empty(Reason::NetworkUncached)
      }
    }
  }
}

impl<S: CacheStorage> Clone for StaleWhileErrorFetcher<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}

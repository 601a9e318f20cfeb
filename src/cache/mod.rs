//! Generic caching layer for offline support.
//!
//! This module knows nothing about the school API. It provides:
//! - Composite cache keys (resource + subject) stored in SQLite
//! - `StaleWhileErrorFetcher`, which serves the last good payload when the
//!   network fails and says why the result is degraded

mod layer;
mod storage;
mod traits;

pub use layer::StaleWhileErrorFetcher;
pub use storage::{CacheStorage, NoopStorage, SqliteStorage};
pub use traits::{CacheKey, FetchFailure, FetchResult, Reason};

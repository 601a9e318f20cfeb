//! Client for the school portal's HTTP/JSON API.

pub mod api_types;
pub mod cached_client;
pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;

pub use cached_client::CachedDpsClient;
pub use error::ApiError;

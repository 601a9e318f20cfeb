//! Async query handle for screen data.
//!
//! A `Query<T>` owns a fetcher closure. `fetch()` spawns it on the runtime and
//! the result comes back over a channel that the event loop drains with
//! `poll()` on every tick. The fetcher never fails: reads resolve to a
//! `FetchResult`, form submissions to a `Result<_, ApiError>`.
//!
//! ```ignore
//! let client = client.clone();
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     let id = student_id.clone();
//!     async move { client.attendance(&id).await }
//! });
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, re-render
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::debug;

/// The state of a query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Fetch in flight; holds the previous value if there was one
  Loading(Option<T>),
  /// Fetch finished
  Ready(T),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading(_))
  }

  /// Latest value, kept visible while a refresh runs.
  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Ready(data) | QueryState::Loading(Some(data)) => Some(data),
      _ => None,
    }
  }
}

type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<'static, T> + Send + Sync>;

pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<T>>,
}

impl<T: Send + 'static> Query<T> {
  /// The fetcher is called once per `fetch()`.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Start a fetch. Ignored while one is already in flight.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      debug!("fetch ignored, query already loading");
      return;
    }

    let previous = match std::mem::replace(&mut self.state, QueryState::Idle) {
      QueryState::Ready(data) => Some(data),
      _ => None,
    };
    self.state = QueryState::Loading(previous);

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // The owning screen may be gone; its result is dropped with the receiver.
      let _ = tx.send(result);
    });
  }

  /// Drain a finished fetch. Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(data) => {
        self.state = QueryState::Ready(data);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Task panicked before sending; fall back to whatever we had.
        self.receiver = None;
        self.state = match std::mem::replace(&mut self.state, QueryState::Idle) {
          QueryState::Loading(Some(data)) => QueryState::Ready(data),
          _ => QueryState::Idle,
        };
        true
      }
    }
  }

  /// Poll, and if a result arrived hand it over, leaving the query idle.
  /// For one-shot submissions whose result is consumed once.
  pub fn take(&mut self) -> Option<T> {
    if !self.poll() {
      return None;
    }
    match std::mem::replace(&mut self.state, QueryState::Idle) {
      QueryState::Ready(data) => Some(data),
      other => {
        self.state = other;
        None
      }
    }
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  async fn settle<T: Send + 'static>(query: &mut Query<T>) {
    for _ in 0..50 {
      if query.poll() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
  }

  #[tokio::test]
  async fn test_query_ready() {
    let mut query = Query::new(|| async { vec![1, 2, 3] });
    assert_eq!(query.state(), &QueryState::Idle);

    query.fetch();
    assert!(query.is_loading());

    settle(&mut query).await;
    assert_eq!(query.state(), &QueryState::Ready(vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_ignored() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      let counter = counter.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        counter.fetch_add(1, Ordering::SeqCst)
      }
    });

    query.fetch();
    query.fetch();
    query.fetch();
    settle(&mut query).await;

    assert_eq!(query.data(), Some(&0));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_refresh_keeps_previous_value_visible() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      let counter = counter.clone();
      async move { counter.fetch_add(1, Ordering::SeqCst) }
    });

    query.fetch();
    settle(&mut query).await;
    assert_eq!(query.data(), Some(&0));

    query.fetch();
    assert_eq!(query.state(), &QueryState::Loading(Some(0)));
    assert_eq!(query.data(), Some(&0));

    settle(&mut query).await;
    assert_eq!(query.data(), Some(&1));
  }

  #[tokio::test]
  async fn test_dropping_query_discards_late_result() {
    let finished = Arc::new(AtomicU32::new(0));
    let flag = finished.clone();
    let mut query = Query::new(move || {
      let flag = flag.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        flag.store(1, Ordering::SeqCst);
        "late"
      }
    });

    query.fetch();
    drop(query);

    tokio::time::sleep(Duration::from_millis(40)).await;
    // The task still ran to completion; nothing was left to receive it.
    assert_eq!(finished.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_take_hands_over_result_once() {
    let mut query = Query::new(|| async { "sent" });
    query.fetch();

    let mut taken = None;
    for _ in 0..50 {
      taken = query.take();
      if taken.is_some() {
        break;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(taken, Some("sent"));
    assert_eq!(query.state(), &QueryState::Idle);
    assert_eq!(query.take(), None);
  }

  #[tokio::test]
  async fn test_poll_without_fetch_is_noop() {
    let mut query = Query::new(|| async { 1 });
    assert!(!query.poll());
    assert_eq!(query.state(), &QueryState::Idle);
  }
}

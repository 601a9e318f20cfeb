mod attendance;
mod complaints;
mod fees;
mod holidays;
mod home;
mod leave;
mod login;
mod notices;
mod profile;
mod rating;
mod search;

pub use attendance::AttendanceView;
pub use complaints::ComplaintView;
pub use fees::FeesView;
pub use holidays::HolidaysView;
pub use home::HomeView;
pub use leave::LeaveView;
pub use login::LoginView;
pub use notices::NoticesView;
pub use profile::ProfileView;
pub use rating::RatingView;
pub use search::StudentSearchView;

use crate::api::types::Ack;
use crate::api::ApiError;
use crate::cache::FetchResult;
use crate::query::Query;
use crate::ui::components::Banner;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Wrap};
use std::future::Future;

/// A form submission in flight
type Submission = Query<Result<Ack, ApiError>>;

/// Spawn a one-shot write.
fn submit<F, Fut>(fetcher: F) -> Submission
where
  F: Fn() -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Ack, ApiError>> + Send + 'static,
{
  let mut query = Query::new(fetcher);
  query.fetch();
  query
}

/// Poll a read query and refresh the banner when its result lands.
fn poll_read<T: Send + 'static>(query: &mut Query<FetchResult<T>>, banner: &mut Banner) -> bool {
  if !query.poll() {
    return false;
  }
  if let Some(result) = query.data() {
    banner.update(result);
  }
  true
}

/// Reserve a row for the banner if it is showing; returns (banner, content).
fn split_banner(banner: &Banner, area: Rect) -> (Rect, Rect) {
  let [top, rest] =
    Layout::vertical([Constraint::Length(banner.height()), Constraint::Min(0)]).areas(area);
  (top, rest)
}

/// Centered grey text inside a block, for loading and empty states.
fn draw_message(frame: &mut Frame, area: Rect, block: Block, text: &str) {
  let paragraph = Paragraph::new(text)
    .block(block)
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
  frame.render_widget(paragraph, area);
}

/// Placeholder text for a read screen with nothing to list
fn empty_text<T>(result: Option<&FetchResult<T>>, loading: bool, nothing: &str) -> String {
  match result {
    _ if loading => "Loading...".to_string(),
    Some(FetchResult::Empty(reason)) => format!("Nothing to show: {}. Press r to retry.", reason),
    _ => nothing.to_string(),
  }
}

/// Client pointed at a closed local port, with no cache behind it
#[cfg(test)]
pub(crate) fn test_client() -> crate::api::CachedDpsClient {
  use crate::api::client::DpsClient;
  use crate::cache::NoopStorage;
  use crate::config::ApiConfig;

  let inner = DpsClient::new(&ApiConfig {
    url: "http://127.0.0.1:9/api.php".to_string(),
    timeout_secs: Some(1),
  })
  .unwrap();
  crate::api::CachedDpsClient::with_storage(inner, Box::new(NoopStorage))
}

use crate::api::types::Notice;
use crate::api::CachedDpsClient;
use crate::cache::FetchResult;
use crate::query::Query;
use crate::school::notices::{NoticeFilter, NoticeWindow};
use crate::ui::components::{Banner, KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{source_label, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::{draw_message, empty_text, poll_read, split_banner};

/// Notice board with text search and a date window
pub struct NoticesView {
  query: Query<FetchResult<Vec<Notice>>>,
  banner: Banner,
  filter: NoticeFilter,
  search: SearchInput,
  list_state: ListState,
  today: NaiveDate,
}

impl NoticesView {
  pub fn new(
    client: CachedDpsClient,
    student_id: String,
    window: NoticeWindow,
    today: NaiveDate,
  ) -> Self {
    let mut query = Query::new(move || {
      let client = client.clone();
      let student_id = student_id.clone();
      async move { client.notices(&student_id).await }
    });
    query.fetch();

    Self {
      query,
      banner: Banner::new(),
      filter: NoticeFilter::new(window),
      search: SearchInput::new("Search notices"),
      list_state: ListState::default(),
      today,
    }
  }

  fn visible(&self) -> Vec<&Notice> {
    let notices = self
      .query
      .data()
      .and_then(|r| r.data())
      .map(|v| v.as_slice())
      .unwrap_or(&[]);
    self.filter.apply(notices, self.today)
  }

  fn title(&self) -> String {
    let mut title = format!(" Notices · {}", self.filter.window.label());
    if !self.filter.text.is_empty() {
      title.push_str(&format!(" · \"{}\"", self.filter.text));
    }
    title.push_str(source_label(self.query.data(), self.query.is_loading()));
    title.push(' ');
    title
  }
}

impl View for NoticesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(text)) | KeyResult::Event(SearchEvent::Submitted(text)) => {
        self.filter.text = text;
        self.list_state.select(Some(0));
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    if self.banner.handle_key(key) == KeyResult::Handled {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('w') => {
        self.filter.window = self.filter.window.next();
        self.list_state.select(Some(0));
      }
      KeyCode::Char('r') => self.query.fetch(),
      KeyCode::Enter => {
        let selected = self
          .list_state
          .selected()
          .and_then(|i| self.visible().get(i).map(|n| (*n).clone()));
        if let Some(notice) = selected {
          return ViewAction::Push(Box::new(NoticeDetailView::new(notice)));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (banner_area, list_area) = split_banner(&self.banner, area);
    self.banner.render(frame, banner_area);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let items: Vec<ListItem> = self
      .visible()
      .iter()
      .map(|notice| {
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{}  ", notice.date.format("%d %b %Y")),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(truncate(&notice.title, 70)),
        ]))
      })
      .collect();

    if items.is_empty() {
      let nothing = if self.filter.text.is_empty() {
        "No notices in this period. Press w to widen the window."
      } else {
        "No notices match the search."
      };
      let text = empty_text(self.query.data(), self.query.is_loading(), nothing);
      draw_message(frame, list_area, block, &text);
    } else {
      ensure_valid_selection(&mut self.list_state, items.len());
      let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
      frame.render_stateful_widget(list, list_area, &mut self.list_state);
    }

    self.search.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Notices".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    poll_read(&mut self.query, &mut self.banner);
    ViewAction::None
  }

  fn captures_input(&self) -> bool {
    self.search.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("/", "search").with_priority(10),
      ShortcutInfo::new("w", "period").with_priority(20),
      ShortcutInfo::new("Enter", "read").with_priority(25),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

/// One notice, full text
pub struct NoticeDetailView {
  notice: Notice,
  scroll: u16,
}

impl NoticeDetailView {
  pub fn new(notice: Notice) -> Self {
    Self { notice, scroll: 0 }
  }
}

impl View for NoticeDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
      KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let text = vec![
      Line::styled(
        self.notice.date.format("%A, %d %B %Y").to_string(),
        Style::default().fg(Color::DarkGray),
      ),
      Line::default(),
      Line::raw(self.notice.body.clone()),
    ];

    let paragraph = Paragraph::new(text)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0))
      .block(
        Block::default()
          .title(format!(" {} ", self.notice.title))
          .title_alignment(Alignment::Center)
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Blue)),
      );
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    truncate(&self.notice.title, 24)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn view() -> NoticesView {
    NoticesView::new(
      super::super::test_client(),
      "S1".to_string(),
      NoticeWindow::LastDays(30),
      NaiveDate::from_ymd_opt(2024, 11, 20).unwrap(),
    )
  }

  #[tokio::test]
  async fn test_w_cycles_window() {
    let mut view = view();
    view.handle_key(key(KeyCode::Char('w')));
    assert_eq!(view.filter.window, NoticeWindow::LastDays(90));
    view.handle_key(key(KeyCode::Char('w')));
    assert_eq!(view.filter.window, NoticeWindow::All);
  }

  #[tokio::test]
  async fn test_search_updates_filter_and_captures_keys() {
    let mut view = view();
    view.handle_key(key(KeyCode::Char('/')));
    assert!(view.captures_input());
    view.handle_key(key(KeyCode::Char('w')));
    // 'w' went into the search box, not the window toggle
    assert_eq!(view.filter.text, "w");
    assert_eq!(view.filter.window, NoticeWindow::LastDays(30));
    view.handle_key(key(KeyCode::Enter));
    assert!(!view.captures_input());
  }
}

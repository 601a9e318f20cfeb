use crate::api::types::StudentProfile;
use crate::api::CachedDpsClient;
use crate::cache::FetchResult;
use crate::query::Query;
use crate::ui::components::{Banner, InputResult, KeyResult, TextInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{source_label, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use super::{draw_message, empty_text, poll_read, split_banner, ProfileView};

/// Admin lookup of students by name, roll or admission number
pub struct StudentSearchView {
  client: CachedDpsClient,
  subject: String,
  input: TextInput,
  editing: bool,
  query: Option<Query<FetchResult<Vec<StudentProfile>>>>,
  searched: String,
  banner: Banner,
  list_state: ListState,
  today: NaiveDate,
}

impl StudentSearchView {
  pub fn new(client: CachedDpsClient, subject: String, today: NaiveDate) -> Self {
    Self {
      client,
      subject,
      input: TextInput::new().with_max_len(60),
      editing: true,
      query: None,
      searched: String::new(),
      banner: Banner::new(),
      list_state: ListState::default(),
      today,
    }
  }

  /// Replace the current search; the old query is dropped with any late result.
  fn search(&mut self, text: String) {
    let text = text.trim().to_string();
    if text.is_empty() {
      return;
    }

    let client = self.client.clone();
    let subject = self.subject.clone();
    let needle = text.clone();
    let mut query = Query::new(move || {
      let client = client.clone();
      let subject = subject.clone();
      let needle = needle.clone();
      async move { client.search_students(&subject, &needle).await }
    });
    query.fetch();

    self.query = Some(query);
    self.searched = text;
    self.editing = false;
    self.list_state.select(Some(0));
  }

  fn results(&self) -> &[StudentProfile] {
    self
      .query
      .as_ref()
      .and_then(|q| q.data())
      .and_then(|r| r.data())
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  fn loading(&self) -> bool {
    self.query.as_ref().is_some_and(|q| q.is_loading())
  }
}

impl View for StudentSearchView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.editing {
      match self.input.handle_key(key) {
        InputResult::Submitted(text) => self.search(text),
        InputResult::Cancelled if self.query.is_none() => return ViewAction::Pop,
        InputResult::Cancelled => self.editing = false,
        InputResult::Consumed | InputResult::NotHandled => {}
      }
      return ViewAction::None;
    }

    if self.banner.handle_key(key) == KeyResult::Handled {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('/') => self.editing = true,
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => {
        if let Some(query) = self.query.as_mut() {
          query.fetch();
        }
      }
      KeyCode::Enter => {
        let selected = self
          .list_state
          .selected()
          .and_then(|i| self.results().get(i))
          .map(|p| p.to_ref());
        if let Some(student) = selected {
          return ViewAction::Push(Box::new(ProfileView::new(
            self.client.clone(),
            student,
            true,
            self.today,
          )));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let [input_area, rest] =
      Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let mut line = vec![Span::raw(self.input.display())];
    if self.editing {
      line.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
    let border = if self.editing { Color::Yellow } else { Color::DarkGray };
    frame.render_widget(
      Paragraph::new(Line::from(line)).block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(border))
          .title(" Name, roll or admission no "),
      ),
      input_area,
    );

    let (banner_area, list_area) = split_banner(&self.banner, rest);
    self.banner.render(frame, banner_area);

    let data = self.query.as_ref().and_then(|q| q.data());
    let block = Block::default()
      .title(format!(" Students{} ", source_label(data, self.loading())))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let items: Vec<ListItem> = self
      .results()
      .iter()
      .map(|student| {
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{:<8}", student.class_label()),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(truncate(&student.name, 40)),
          Span::styled(
            student
              .admission_no
              .as_ref()
              .map(|no| format!("  #{}", no))
              .unwrap_or_default(),
            Style::default().fg(Color::DarkGray),
          ),
        ]))
      })
      .collect();

    if items.is_empty() {
      let text = if self.query.is_none() {
        "Type a name and press Enter.".to_string()
      } else {
        empty_text(
          data,
          self.loading(),
          &format!("No students match \"{}\".", self.searched),
        )
      };
      draw_message(frame, list_area, block, &text);
      return;
    }

    ensure_valid_selection(&mut self.list_state, items.len());
    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut self.list_state);
  }

  fn breadcrumb_label(&self) -> String {
    "Search".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    if let Some(query) = self.query.as_mut() {
      poll_read(query, &mut self.banner);
    }
    ViewAction::None
  }

  fn captures_input(&self) -> bool {
    self.editing
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.editing {
      return vec![
        ShortcutInfo::new("Enter", "search").with_priority(10),
        ShortcutInfo::new("Esc", "cancel").with_priority(90),
      ];
    }
    vec![
      ShortcutInfo::new("/", "new search").with_priority(10),
      ShortcutInfo::new("Enter", "profile").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

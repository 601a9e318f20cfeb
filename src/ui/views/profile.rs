use crate::api::types::{StudentProfile, StudentRef};
use crate::api::CachedDpsClient;
use crate::cache::FetchResult;
use crate::query::Query;
use crate::ui::components::{Banner, KeyResult};
use crate::ui::renderfns::source_label;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::{draw_message, empty_text, poll_read, split_banner, AttendanceView};

/// Student profile card
pub struct ProfileView {
  client: CachedDpsClient,
  student: StudentRef,
  query: Query<FetchResult<StudentProfile>>,
  banner: Banner,
  allow_attendance: bool,
  today: NaiveDate,
}

impl ProfileView {
  pub fn new(
    client: CachedDpsClient,
    student: StudentRef,
    allow_attendance: bool,
    today: NaiveDate,
  ) -> Self {
    let fetch_client = client.clone();
    let student_id = student.student_id.clone();
    let mut query = Query::new(move || {
      let client = fetch_client.clone();
      let student_id = student_id.clone();
      async move { client.profile(&student_id).await }
    });
    query.fetch();

    Self {
      client,
      student,
      query,
      banner: Banner::new(),
      allow_attendance,
      today,
    }
  }

  fn lines(profile: &StudentProfile) -> Vec<Line<'static>> {
    let field = |label: &str, value: Option<String>| {
      Line::from(vec![
        Span::styled(format!("{:<14}", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value.unwrap_or_else(|| "-".to_string())),
      ])
    };

    vec![
      Line::styled(profile.name.clone(), Style::default().fg(Color::Yellow).bold()),
      Line::raw(""),
      field("Class", Some(profile.class_label())),
      field("Roll no", profile.roll_no.clone()),
      field("Admission no", profile.admission_no.clone()),
      field("Student ID", Some(profile.student_id.clone())),
      field("Date of birth", profile.dob.map(|d| d.format("%d %b %Y").to_string())),
      Line::raw(""),
      field("Father", profile.father_name.clone()),
      field("Mother", profile.mother_name.clone()),
      field("Mobile", profile.mobile.clone()),
      field("Address", profile.address.clone()),
    ]
  }
}

impl View for ProfileView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.banner.handle_key(key) == KeyResult::Handled {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('a') if self.allow_attendance => {
        return ViewAction::Push(Box::new(AttendanceView::new(
          self.client.clone(),
          self.student.clone(),
          self.today,
        )));
      }
      KeyCode::Char('r') => self.query.fetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (banner_area, area) = split_banner(&self.banner, area);
    self.banner.render(frame, banner_area);

    let block = Block::default()
      .title(format!(
        " {}{} ",
        self.student.name,
        source_label(self.query.data(), self.query.is_loading())
      ))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    match self.query.data().and_then(|r| r.data()) {
      Some(profile) => {
        let paragraph = Paragraph::new(Self::lines(profile))
          .block(block)
          .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
      }
      None => {
        let text = empty_text(self.query.data(), self.query.is_loading(), "No profile found.");
        draw_message(frame, area, block, &text);
      }
    }
  }

  fn breadcrumb_label(&self) -> String {
    self.student.name.clone()
  }

  fn tick(&mut self) -> ViewAction {
    poll_read(&mut self.query, &mut self.banner);
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ];
    if self.allow_attendance {
      shortcuts.push(ShortcutInfo::new("a", "attendance").with_priority(10));
    }
    shortcuts
  }
}

use crate::api::types::{AttendanceRecord, AttendanceStatus, StudentRef};
use crate::api::CachedDpsClient;
use crate::cache::FetchResult;
use crate::query::Query;
use crate::school::calendar::{shift_month, AttendanceSummary, MonthGrid};
use crate::ui::components::{Banner, KeyResult};
use crate::ui::renderfns::{attendance_color, source_label};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use chrono::{Datelike, NaiveDate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{draw_message, empty_text, poll_read, split_banner};

const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Month calendar of attendance marks for one student
pub struct AttendanceView {
  student: StudentRef,
  query: Query<FetchResult<Vec<AttendanceRecord>>>,
  banner: Banner,
  year: i32,
  month: u32,
  today: NaiveDate,
}

impl AttendanceView {
  pub fn new(client: CachedDpsClient, student: StudentRef, today: NaiveDate) -> Self {
    let student_id = student.student_id.clone();
    let mut query = Query::new(move || {
      let client = client.clone();
      let student_id = student_id.clone();
      async move { client.attendance(&student_id).await }
    });
    query.fetch();

    Self {
      student,
      query,
      banner: Banner::new(),
      year: today.year(),
      month: today.month(),
      today,
    }
  }

  fn records(&self) -> &[AttendanceRecord] {
    self
      .query
      .data()
      .and_then(|r| r.data())
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  fn shift(&mut self, delta: i32) {
    (self.year, self.month) = shift_month(self.year, self.month, delta);
  }

  fn calendar_lines(&self, grid: &MonthGrid) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(
      WEEKDAYS
        .iter()
        .map(|d| Span::styled(format!(" {:>3} ", d), Style::default().fg(Color::DarkGray)))
        .collect::<Vec<_>>(),
    )];

    for week in &grid.weeks {
      let spans = week
        .iter()
        .map(|cell| match cell {
          None => Span::raw("     "),
          Some(day) => {
            let mut style = match day.status {
              Some(status) => Style::default().fg(Color::Black).bg(attendance_color(status)),
              None => Style::default().fg(Color::White),
            };
            if day.date == self.today {
              style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            Span::styled(format!(" {:>3} ", day.day()), style)
          }
        })
        .collect::<Vec<_>>();
      lines.push(Line::from(spans));
    }
    lines
  }

  fn summary_lines(&self) -> Vec<Line<'static>> {
    let summary = AttendanceSummary::for_month(self.records(), self.year, self.month);
    let legend = [
      AttendanceStatus::Present,
      AttendanceStatus::Absent,
      AttendanceStatus::Leave,
      AttendanceStatus::Holiday,
    ]
    .into_iter()
    .flat_map(|status| {
      [
        Span::styled("   ", Style::default().bg(attendance_color(status))),
        Span::raw(format!(" {}  ", status.label())),
      ]
    })
    .collect::<Vec<_>>();

    let percentage = match summary.percentage() {
      Some(p) => format!("{:.1}%", p),
      None => "n/a".to_string(),
    };

    vec![
      Line::from(legend),
      Line::default(),
      Line::from(format!(
        "Present {}   Absent {}   Leave {}   Holidays {}",
        summary.present, summary.absent, summary.leave, summary.holiday
      )),
      Line::from(vec![
        Span::raw("Attendance "),
        Span::styled(percentage, Style::default().fg(Color::Cyan).bold()),
        Span::styled(
          format!(" of {} school days", summary.school_days()),
          Style::default().fg(Color::DarkGray),
        ),
      ]),
    ]
  }
}

impl View for AttendanceView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.banner.handle_key(key) == KeyResult::Handled {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('h') | KeyCode::Left => self.shift(-1),
      KeyCode::Char('l') | KeyCode::Right => self.shift(1),
      KeyCode::Char('t') => {
        (self.year, self.month) = (self.today.year(), self.today.month());
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

    let Some(grid) = MonthGrid::build(self.year, self.month, self.records()) else {
      return;
    };

    let block = Block::default()
      .title(format!(
        " Attendance · {} · {}{} ",
        self.student.name,
        grid.title(),
        source_label(self.query.data(), self.query.is_loading())
      ))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.records().is_empty() {
      let text = empty_text(
        self.query.data(),
        self.query.is_loading(),
        "No attendance recorded yet.",
      );
      draw_message(frame, area, block, &text);
      return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let calendar = self.calendar_lines(&grid);
    let [cal_area, summary_area] =
      Layout::vertical([Constraint::Length(calendar.len() as u16 + 1), Constraint::Min(0)])
        .areas(inner);

    frame.render_widget(Paragraph::new(calendar).alignment(Alignment::Center), cal_area);
    frame.render_widget(
      Paragraph::new(self.summary_lines()).alignment(Alignment::Center),
      summary_area,
    );
  }

  fn breadcrumb_label(&self) -> String {
    format!("Attendance [{}]", self.student.name)
  }

  fn tick(&mut self) -> ViewAction {
    poll_read(&mut self.query, &mut self.banner);
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("h/l", "month").with_priority(10),
      ShortcutInfo::new("t", "this month").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

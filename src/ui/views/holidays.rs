use crate::api::types::Holiday;
use crate::api::CachedDpsClient;
use crate::cache::FetchResult;
use crate::query::Query;
use crate::school::holidays::{countdown_label, days_until, group_by_month, next_holiday};
use crate::ui::components::{Banner, KeyResult};
use crate::ui::renderfns::source_label;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{draw_message, empty_text, poll_read, split_banner};

/// School holidays grouped by month, with a countdown to each
pub struct HolidaysView {
  query: Query<FetchResult<Vec<Holiday>>>,
  banner: Banner,
  scroll: u16,
  today: NaiveDate,
}

impl HolidaysView {
  pub fn new(client: CachedDpsClient, subject: String, today: NaiveDate) -> Self {
    let mut query = Query::new(move || {
      let client = client.clone();
      let subject = subject.clone();
      async move { client.holidays(&subject).await }
    });
    query.fetch();

    Self {
      query,
      banner: Banner::new(),
      scroll: 0,
      today,
    }
  }

  fn holidays(&self) -> &[Holiday] {
    self
      .query
      .data()
      .and_then(|r| r.data())
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  fn lines(&self) -> Vec<Line<'static>> {
    let holidays = self.holidays();
    let mut lines = Vec::new();

    if let Some((next, days)) = next_holiday(holidays, self.today) {
      lines.push(Line::from(vec![
        Span::styled("Next holiday: ", Style::default().fg(Color::DarkGray)),
        Span::styled(next.name.clone(), Style::default().fg(Color::Yellow).bold()),
        Span::raw(format!(" ({})", countdown_label(days))),
      ]));
      lines.push(Line::default());
    }

    for group in group_by_month(holidays) {
      lines.push(Line::styled(group.label, Style::default().fg(Color::Cyan).bold()));
      for holiday in group.holidays {
        let days = days_until(holiday.date, self.today);
        let style = if days < 0 {
          Style::default().fg(Color::DarkGray)
        } else {
          Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
          Span::styled(format!("  {}  ", holiday.date.format("%a %d")), style),
          Span::styled(format!("{:<32}", holiday.name), style),
          Span::styled(countdown_label(days), Style::default().fg(Color::DarkGray)),
        ]));
      }
      lines.push(Line::default());
    }
    lines
  }
}

impl View for HolidaysView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.banner.handle_key(key) == KeyResult::Handled {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
      KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
      KeyCode::Char('g') => self.scroll = 0,
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
        " Holidays{} ",
        source_label(self.query.data(), self.query.is_loading())
      ))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.holidays().is_empty() {
      let text = empty_text(self.query.data(), self.query.is_loading(), "No holidays listed.");
      draw_message(frame, area, block, &text);
      return;
    }

    let lines = self.lines();
    let max_scroll = (lines.len() as u16).saturating_sub(area.height.saturating_sub(2));
    self.scroll = self.scroll.min(max_scroll);

    frame.render_widget(Paragraph::new(lines).block(block).scroll((self.scroll, 0)), area);
  }

  fn breadcrumb_label(&self) -> String {
    "Holidays".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    poll_read(&mut self.query, &mut self.banner);
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("j/k", "scroll").with_priority(10),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

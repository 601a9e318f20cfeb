use crate::api::types::FeeRecord;
use crate::api::CachedDpsClient;
use crate::cache::FetchResult;
use crate::query::Query;
use crate::school::fees::{FeeState, FeeTotals};
use crate::ui::components::{Banner, KeyResult};
use crate::ui::renderfns::{format_rupees, source_label};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use super::{draw_message, empty_text, poll_read, split_banner};

const PAYMENT_STUB: &str = "Online payment is not available yet. Please pay at the school office.";

/// Fee installments with paid/outstanding totals
pub struct FeesView {
  query: Query<FetchResult<Vec<FeeRecord>>>,
  banner: Banner,
  table_state: TableState,
  today: NaiveDate,
}

impl FeesView {
  pub fn new(client: CachedDpsClient, student_id: String, today: NaiveDate) -> Self {
    let mut query = Query::new(move || {
      let client = client.clone();
      let student_id = student_id.clone();
      async move { client.fees(&student_id).await }
    });
    query.fetch();

    Self {
      query,
      banner: Banner::new(),
      table_state: TableState::default().with_selected(Some(0)),
      today,
    }
  }

  fn records(&self) -> &[FeeRecord] {
    self
      .query
      .data()
      .and_then(|r| r.data())
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  fn state_color(state: FeeState) -> Color {
    match state {
      FeeState::Paid => Color::Green,
      FeeState::Due => Color::Yellow,
      FeeState::Overdue => Color::Red,
    }
  }
}

impl View for FeesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.banner.handle_key(key) == KeyResult::Handled {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.table_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.table_state.select_previous(),
      KeyCode::Char('p') => return ViewAction::Flash(PAYMENT_STUB.to_string()),
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
        " Fees{} ",
        source_label(self.query.data(), self.query.is_loading())
      ))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.records().is_empty() {
      let text = empty_text(self.query.data(), self.query.is_loading(), "No fee records.");
      draw_message(frame, area, block, &text);
      return;
    }

    let [table_area, totals_area] =
      Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

    let rows: Vec<Row> = self
      .records()
      .iter()
      .map(|fee| {
        let state = FeeState::of(fee, self.today);
        Row::new(vec![
          Cell::from(fee.period.clone()),
          Cell::from(format_rupees(fee.amount)),
          Cell::from(
            fee
              .due_date
              .map(|d| d.format("%d %b %Y").to_string())
              .unwrap_or_else(|| "-".to_string()),
          ),
          Cell::from(state.label()).style(Style::default().fg(Self::state_color(state))),
          Cell::from(fee.receipt_no.clone().unwrap_or_default()),
        ])
      })
      .collect();

    let header = Row::new(vec!["Period", "Amount", "Due", "Status", "Receipt"])
      .style(Style::default().fg(Color::Cyan).bold());

    let table = Table::new(
      rows,
      [
        Constraint::Min(16),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Min(10),
      ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(Style::default().bg(Color::DarkGray))
    .highlight_symbol("> ");
    frame.render_stateful_widget(table, table_area, &mut self.table_state);

    let totals = FeeTotals::of(self.records(), self.today);
    let line = Line::from(vec![
      Span::styled(" Paid ", Style::default().fg(Color::DarkGray)),
      Span::styled(format_rupees(totals.paid), Style::default().fg(Color::Green)),
      Span::styled("   Outstanding ", Style::default().fg(Color::DarkGray)),
      Span::styled(format_rupees(totals.outstanding), Style::default().fg(Color::Yellow)),
      Span::styled("   Overdue ", Style::default().fg(Color::DarkGray)),
      Span::styled(format_rupees(totals.overdue), Style::default().fg(Color::Red)),
    ]);
    frame.render_widget(
      Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
      totals_area,
    );
  }

  fn breadcrumb_label(&self) -> String {
    "Fees".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    poll_read(&mut self.query, &mut self.banner);
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("p", "pay").with_priority(10),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  #[tokio::test]
  async fn test_pay_shows_stub_message() {
    let mut view = FeesView::new(
      super::super::test_client(),
      "S1".to_string(),
      NaiveDate::from_ymd_opt(2024, 11, 20).unwrap(),
    );
    let action = view.handle_key(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE));
    assert!(matches!(action, ViewAction::Flash(msg) if msg == PAYMENT_STUB));
  }
}

use crate::api::types::StudentRef;
use crate::api::CachedDpsClient;
use crate::school::forms::{leave_application, parse_form_date};
use crate::ui::components::{Charset, Form, FormEvent, FormField, KeyResult, TextInput};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{submit, Submission};

/// Leave application form
pub struct LeaveView {
  client: CachedDpsClient,
  student: StudentRef,
  form: Form,
  submission: Option<Submission>,
  error: Option<String>,
}

const FROM: usize = 0;
const TO: usize = 1;
const REASON: usize = 2;

impl LeaveView {
  pub fn new(client: CachedDpsClient, student: StudentRef) -> Self {
    let date = || TextInput::new().with_charset(Charset::Date).with_max_len(10);
    Self {
      client,
      student,
      form: Form::new(vec![
        FormField::new("From", date()).with_hint("YYYY-MM-DD"),
        FormField::new("To", date()).with_hint("YYYY-MM-DD"),
        FormField::new("Reason", TextInput::new().with_max_len(300)),
      ]),
      submission: None,
      error: None,
    }
  }

  /// "3 days" once both dates are valid and in order
  fn duration_hint(&self) -> Option<String> {
    let from = parse_form_date("From", self.form.value(FROM)).ok()?;
    let to = parse_form_date("To", self.form.value(TO)).ok()?;
    let days = (to - from).num_days() + 1;
    match days {
      d if d < 1 => None,
      1 => Some("1 day".to_string()),
      d => Some(format!("{} days", d)),
    }
  }

  fn send(&mut self, values: &[String]) {
    let field = |i: usize| values.get(i).map(String::as_str).unwrap_or("");
    match leave_application(&self.student.student_id, field(FROM), field(TO), field(REASON)) {
      Ok(leave) => {
        self.error = None;
        let client = self.client.clone();
        self.submission = Some(submit(move || {
          let client = client.clone();
          let leave = leave.clone();
          async move { client.apply_leave(&leave).await }
        }));
      }
      Err(e) => self.error = Some(e.to_string()),
    }
  }
}

impl View for LeaveView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.submission.is_some() {
      return ViewAction::None;
    }

    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted(values)) => self.send(&values),
      KeyResult::Event(FormEvent::Cancelled) => return ViewAction::Pop,
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
    ViewAction::None
  }

  fn tick(&mut self) -> ViewAction {
    let Some(result) = self.submission.as_mut().and_then(|q| q.take()) else {
      return ViewAction::None;
    };
    self.submission = None;

    match result {
      Ok(ack) => {
        self.form.clear();
        ViewAction::Flash(ack.message)
      }
      Err(e) => {
        self.error = Some(format!("Leave was not sent: {}", e));
        ViewAction::None
      }
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" Apply for leave · {} ", self.student.name))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [form_area, status_area] =
      Layout::vertical([Constraint::Length(9), Constraint::Min(1)]).areas(inner);
    self.form.render(frame, form_area, self.submission.is_none());

    let status = if self.submission.is_some() {
      Line::styled(" Sending...", Style::default().fg(Color::Yellow))
    } else if let Some(error) = &self.error {
      Line::styled(format!(" {}", error), Style::default().fg(Color::Red))
    } else if let Some(hint) = self.duration_hint() {
      Line::styled(format!(" Leave for {}", hint), Style::default().fg(Color::Cyan))
    } else {
      Line::styled(
        " Tab to move between fields, Enter on Reason to send",
        Style::default().fg(Color::DarkGray),
      )
    };
    frame.render_widget(Paragraph::new(status), status_area);
  }

  fn breadcrumb_label(&self) -> String {
    "Leave".to_string()
  }

  fn captures_input(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Tab", "next field").with_priority(10),
      ShortcutInfo::new("Enter", "send").with_priority(20),
      ShortcutInfo::new("Esc", "back").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyModifiers};

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn view() -> LeaveView {
    LeaveView::new(
      super::super::test_client(),
      StudentRef {
        student_id: "S1".to_string(),
        name: "Riya".to_string(),
        class_name: "V-A".to_string(),
      },
    )
  }

  #[test]
  fn test_duration_hint() {
    let mut view = view();
    assert_eq!(view.duration_hint(), None);
    view.form.set_value(FROM, "2024-03-04");
    view.form.set_value(TO, "2024-03-06");
    assert_eq!(view.duration_hint().as_deref(), Some("3 days"));
    view.form.set_value(TO, "2024-03-01");
    assert_eq!(view.duration_hint(), None);
  }

  #[test]
  fn test_invalid_form_shows_error_without_sending() {
    let mut view = view();
    view.send(&["2024-03-06".to_string(), "2024-03-04".to_string(), "Fever".to_string()]);
    assert!(view.submission.is_none());
    assert_eq!(view.error.as_deref(), Some("Leave cannot end before it starts"));
  }

  #[test]
  fn test_escape_goes_back() {
    let mut view = view();
    assert!(matches!(view.handle_key(key(KeyCode::Esc)), ViewAction::Pop));
  }
}

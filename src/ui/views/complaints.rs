use crate::api::types::StudentRef;
use crate::api::CachedDpsClient;
use crate::school::forms::complaint;
use crate::ui::components::{Form, FormEvent, FormField, KeyResult, TextInput};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{submit, Submission};

pub struct ComplaintView {
  client: CachedDpsClient,
  student: StudentRef,
  form: Form,
  submission: Option<Submission>,
  error: Option<String>,
}

impl ComplaintView {
  pub fn new(client: CachedDpsClient, student: StudentRef) -> Self {
    Self {
      client,
      student,
      form: Form::new(vec![
        FormField::new("Subject", TextInput::new().with_max_len(100)),
        FormField::new("Message", TextInput::new().with_max_len(1000)),
      ]),
      submission: None,
      error: None,
    }
  }
}

impl View for ComplaintView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.submission.is_some() {
      return ViewAction::None;
    }

    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted(values)) => {
        let subject = values.first().map(String::as_str).unwrap_or("");
        let message = values.get(1).map(String::as_str).unwrap_or("");
        match complaint(&self.student.student_id, subject, message) {
          Ok(complaint) => {
            self.error = None;
            let client = self.client.clone();
            self.submission = Some(submit(move || {
              let client = client.clone();
              let complaint = complaint.clone();
              async move { client.file_complaint(&complaint).await }
            }));
          }
          Err(e) => self.error = Some(e.to_string()),
        }
      }
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
        self.error = Some(format!("Complaint was not sent: {}", e));
        ViewAction::None
      }
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" Complaint · {} ", self.student.name))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [form_area, status_area] =
      Layout::vertical([Constraint::Length(6), Constraint::Min(1)]).areas(inner);
    self.form.render(frame, form_area, self.submission.is_none());

    let status = match (&self.submission, &self.error) {
      (Some(_), _) => Line::styled(" Sending...", Style::default().fg(Color::Yellow)),
      (None, Some(error)) => Line::styled(format!(" {}", error), Style::default().fg(Color::Red)),
      (None, None) => Line::styled(
        " The school office reads every complaint",
        Style::default().fg(Color::DarkGray),
      ),
    };
    frame.render_widget(Paragraph::new(status), status_area);
  }

  fn breadcrumb_label(&self) -> String {
    "Complaint".to_string()
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

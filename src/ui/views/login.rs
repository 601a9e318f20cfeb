use crate::api::types::{Ack, AdminAccount, StudentRef};
use crate::api::{ApiError, CachedDpsClient};
use crate::query::Query;
use crate::school::forms::{admin_credentials, validate_mobile, validate_otp};
use crate::session::Session;
use crate::ui::components::{Charset, Form, FormEvent, FormField, KeyResult, TextInput};
use crate::ui::ensure_valid_selection;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tracing::info;

enum Step {
  Mobile,
  Otp { mobile: String },
  PickStudent { mobile: String, students: Vec<StudentRef> },
  Admin,
}

enum Pending {
  SendOtp {
    mobile: String,
    query: Query<Result<Ack, ApiError>>,
  },
  Verify {
    mobile: String,
    query: Query<Result<Vec<StudentRef>, ApiError>>,
  },
  Admin(Query<Result<AdminAccount, ApiError>>),
}

/// Parent OTP login (mobile, then code, then child if several) and admin
/// username/password login, toggled with F2.
pub struct LoginView {
  client: CachedDpsClient,
  step: Step,
  form: Form,
  pending: Option<Pending>,
  students: ListState,
  error: Option<String>,
  info: Option<String>,
}

fn mobile_form() -> Form {
  Form::new(vec![FormField::new(
    "Mobile number",
    TextInput::new().with_charset(Charset::Digits).with_max_len(11),
  )
  .with_hint("registered with the school")])
}

fn otp_form() -> Form {
  Form::new(vec![FormField::new(
    "OTP",
    TextInput::new().with_charset(Charset::Digits).with_max_len(6),
  )
  .with_hint("Esc to change number")])
}

fn admin_form() -> Form {
  Form::new(vec![
    FormField::new("Username", TextInput::new()),
    FormField::new("Password", TextInput::new().masked()),
  ])
}

impl LoginView {
  pub fn new(client: CachedDpsClient) -> Self {
    Self {
      client,
      step: Step::Mobile,
      form: mobile_form(),
      pending: None,
      students: ListState::default(),
      error: None,
      info: None,
    }
  }

  fn go_to(&mut self, step: Step) {
    self.form = match step {
      Step::Mobile => mobile_form(),
      Step::Otp { .. } => otp_form(),
      Step::Admin => admin_form(),
      Step::PickStudent { .. } => Form::new(Vec::new()),
    };
    self.step = step;
    self.error = None;
  }

  fn is_busy(&self) -> bool {
    self.pending.is_some()
  }

  fn submit(&mut self, values: Vec<String>) {
    let first = values.first().map(String::as_str).unwrap_or("");
    self.error = None;

    let result = match &self.step {
      Step::Mobile => validate_mobile(first).map(|mobile| {
        let client = self.client.clone();
        let m = mobile.clone();
        let mut query = Query::new(move || {
          let client = client.clone();
          let m = m.clone();
          async move { client.send_otp(&m).await }
        });
        query.fetch();
        Pending::SendOtp { mobile, query }
      }),
      Step::Otp { mobile } => validate_otp(first).map(|otp| {
        let client = self.client.clone();
        let m = mobile.clone();
        let mut query = Query::new(move || {
          let client = client.clone();
          let (m, otp) = (m.clone(), otp.clone());
          async move { client.verify_otp(&m, &otp).await }
        });
        query.fetch();
        Pending::Verify {
          mobile: mobile.clone(),
          query,
        }
      }),
      Step::Admin => {
        let password = values.get(1).map(String::as_str).unwrap_or("");
        admin_credentials(first, password).map(|(username, password)| {
          let client = self.client.clone();
          let mut query = Query::new(move || {
            let client = client.clone();
            let (u, p) = (username.clone(), password.clone());
            async move { client.admin_login(&u, &p).await }
          });
          query.fetch();
          Pending::Admin(query)
        })
      }
      Step::PickStudent { .. } => return,
    };

    match result {
      Ok(pending) => self.pending = Some(pending),
      Err(e) => self.error = Some(e.to_string()),
    }
  }

  fn pick_student(&self) -> ViewAction {
    let Step::PickStudent { mobile, students } = &self.step else {
      return ViewAction::None;
    };
    let Some(chosen) = self.students.selected().and_then(|i| students.get(i)) else {
      return ViewAction::None;
    };

    let mut session = Session::parent(mobile, students.clone());
    session.select_student(&chosen.student_id);
    info!(students = students.len(), "parent logged in");
    ViewAction::LoggedIn(session)
  }

  fn render_students(&mut self, frame: &mut Frame, area: Rect) {
    let Step::PickStudent { students, .. } = &self.step else {
      return;
    };
    ensure_valid_selection(&mut self.students, students.len());

    let items: Vec<ListItem> = students
      .iter()
      .map(|s| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<24}", s.name), Style::default().fg(Color::White)),
          Span::styled(s.class_name.clone(), Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Yellow))
          .title(" Choose a student "),
      )
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.students);
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.is_busy() {
      return ViewAction::None;
    }

    if key.code == KeyCode::F(2) {
      let next = match self.step {
        Step::Admin => Step::Mobile,
        _ => Step::Admin,
      };
      self.go_to(next);
      return ViewAction::None;
    }

    if matches!(self.step, Step::PickStudent { .. }) {
      match key.code {
        KeyCode::Char('j') | KeyCode::Down => self.students.select_next(),
        KeyCode::Char('k') | KeyCode::Up => self.students.select_previous(),
        KeyCode::Enter => return self.pick_student(),
        KeyCode::Esc => self.go_to(Step::Mobile),
        _ => {}
      }
      return ViewAction::None;
    }

    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted(values)) => self.submit(values),
      KeyResult::Event(FormEvent::Cancelled) => match self.step {
        Step::Mobile => return ViewAction::Pop,
        _ => self.go_to(Step::Mobile),
      },
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
    ViewAction::None
  }

  fn tick(&mut self) -> ViewAction {
    let Some(pending) = self.pending.as_mut() else {
      return ViewAction::None;
    };

    match pending {
      Pending::SendOtp { mobile, query } => {
        let Some(result) = query.take() else {
          return ViewAction::None;
        };
        let mobile = std::mem::take(mobile);
        self.pending = None;
        match result {
          Ok(ack) => {
            self.go_to(Step::Otp { mobile });
            self.info = Some(ack.message);
          }
          Err(e) => self.error = Some(e.to_string()),
        }
      }
      Pending::Verify { mobile, query } => {
        let Some(result) = query.take() else {
          return ViewAction::None;
        };
        let mobile = std::mem::take(mobile);
        self.pending = None;
        match result {
          Ok(mut students) if students.len() == 1 => {
            info!("parent logged in");
            let only = students.remove(0);
            return ViewAction::LoggedIn(Session::parent(&mobile, vec![only]));
          }
          Ok(students) if students.is_empty() => {
            self.error = Some("No student is linked to this number".to_string());
          }
          Ok(students) => {
            self.info = Some(format!("{} students are linked to this number", students.len()));
            self.students.select(Some(0));
            self.go_to(Step::PickStudent { mobile, students });
          }
          Err(e) => self.error = Some(e.to_string()),
        }
      }
      Pending::Admin(query) => {
        let Some(result) = query.take() else {
          return ViewAction::None;
        };
        self.pending = None;
        match result {
          Ok(account) => {
            info!(admin = %account.id, "admin logged in");
            return ViewAction::LoggedIn(Session::admin(account));
          }
          Err(e) => self.error = Some(e.to_string()),
        }
      }
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let width = area.width.min(60);
    let x = area.x + (area.width - width) / 2;
    let panel = Rect::new(x, area.y + 1, width, area.height.saturating_sub(1));

    let title = match self.step {
      Step::Admin => " Office login ",
      _ => " Parent login ",
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue))
      .title(title)
      .title_alignment(Alignment::Center);
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let [body, status] =
      Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(inner);

    if matches!(self.step, Step::PickStudent { .. }) {
      self.render_students(frame, body);
    } else {
      self.form.render(frame, body, !self.is_busy());
    }

    let status_line = if self.is_busy() {
      Line::styled("Please wait...", Style::default().fg(Color::Yellow))
    } else if let Some(error) = &self.error {
      Line::styled(error.clone(), Style::default().fg(Color::Red))
    } else if let Some(info) = &self.info {
      Line::styled(info.clone(), Style::default().fg(Color::Green))
    } else {
      Line::styled(
        "F2 switches between parent and office login",
        Style::default().fg(Color::DarkGray),
      )
    };
    frame.render_widget(Paragraph::new(status_line).wrap(Wrap { trim: true }), status);
  }

  fn breadcrumb_label(&self) -> String {
    match self.step {
      Step::Mobile => "Login".to_string(),
      Step::Otp { .. } => "Login > OTP".to_string(),
      Step::PickStudent { .. } => "Login > Student".to_string(),
      Step::Admin => "Office login".to_string(),
    }
  }

  fn captures_input(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Enter", "continue").with_priority(10),
      ShortcutInfo::new("F2", "parent/office").with_priority(20),
      ShortcutInfo::new("Esc", "back").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_text(view: &mut LoginView, text: &str) {
    for c in text.chars() {
      view.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_short_mobile_is_rejected_locally() {
    let mut view = LoginView::new(super::super::test_client());
    type_text(&mut view, "12345");
    view.handle_key(key(KeyCode::Enter));
    assert!(view.pending.is_none());
    assert_eq!(view.error.as_deref(), Some("Enter a 10 digit mobile number"));
  }

  #[test]
  fn test_f2_toggles_office_login() {
    let mut view = LoginView::new(super::super::test_client());
    view.handle_key(key(KeyCode::F(2)));
    assert_eq!(view.breadcrumb_label(), "Office login");
    view.handle_key(key(KeyCode::F(2)));
    assert_eq!(view.breadcrumb_label(), "Login");
  }

  #[test]
  fn test_picking_a_student_logs_in_with_that_child() {
    let mut view = LoginView::new(super::super::test_client());
    let students = vec![
      StudentRef {
        student_id: "S1".to_string(),
        name: "Riya".to_string(),
        class_name: "V-A".to_string(),
      },
      StudentRef {
        student_id: "S2".to_string(),
        name: "Aman".to_string(),
        class_name: "II-B".to_string(),
      },
    ];
    view.students.select(Some(0));
    view.go_to(Step::PickStudent {
      mobile: "9876543210".to_string(),
      students,
    });

    view.handle_key(key(KeyCode::Down));
    match view.handle_key(key(KeyCode::Enter)) {
      ViewAction::LoggedIn(session) => assert_eq!(session.subject(), "S2"),
      _ => panic!("expected login"),
    }
  }

  #[tokio::test]
  async fn test_valid_mobile_starts_request_and_blocks_input() {
    let mut view = LoginView::new(super::super::test_client());
    type_text(&mut view, "9876543210");
    view.handle_key(key(KeyCode::Enter));
    assert!(view.is_busy());
    assert!(matches!(view.handle_key(key(KeyCode::Esc)), ViewAction::None));
  }
}

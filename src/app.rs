use crate::api::CachedDpsClient;
use crate::commands::Route;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::school::notices::NoticeWindow;
use crate::session::{Role, Session, SessionStore};
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{
  AttendanceView, ComplaintView, FeesView, HolidaysView, HomeView, LeaveView, LoginView,
  NoticesView, ProfileView, RatingView, StudentSearchView,
};
use crate::ui::Flash;
use chrono::Local;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{info, warn};

/// Main application state
pub struct App {
  config: Config,
  client: CachedDpsClient,
  store: SessionStore,
  session: Option<Session>,

  /// Navigation stack; the root is Login before sign-in and Home after
  view_stack: Vec<Box<dyn View>>,

  /// `:` palette
  command_input: CommandInput,

  flash: Option<Flash>,
  should_quit: bool,
}

impl App {
  pub fn new(
    config: Config,
    client: CachedDpsClient,
    store: SessionStore,
    session: Option<Session>,
  ) -> Self {
    let role = session.as_ref().map(|s| s.role).unwrap_or(Role::Parent);
    let root: Box<dyn View> = match &session {
      Some(session) => Box::new(HomeView::new(session)),
      None => Box::new(LoginView::new(client.clone())),
    };

    Self {
      config,
      client,
      store,
      session,
      view_stack: vec![root],
      command_input: CommandInput::new(role),
      flash: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
  ) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(250));

    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    let [header, content, footer] = Layout::vertical([
      Constraint::Length(1),
      Constraint::Min(0),
      Constraint::Length(1),
    ])
    .areas(frame.area());

    let shortcuts = self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default();
    draw_header(
      frame,
      header,
      self.config.display_title(),
      self.session.as_ref(),
      &shortcuts,
    );

    if let Some(view) = self.view_stack.last_mut() {
      view.render(frame, content);
    }
    self.command_input.render_overlay(frame, content);

    let breadcrumb: Vec<String> = self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect();
    draw_footer(frame, footer, &breadcrumb, self.flash.as_ref());
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if self.command_input.is_active() {
      if let KeyResult::Event(event) = self.command_input.handle_key(key) {
        match event {
          CommandEvent::Submitted(route) => self.open(route),
          CommandEvent::Unknown(text) if !text.is_empty() => {
            self.flash = Some(Flash::error(format!("Unknown command: {}", text)));
          }
          CommandEvent::Unknown(_) | CommandEvent::Cancelled => {}
        }
      }
      return;
    }

    let Some(view) = self.view_stack.last_mut() else {
      self.should_quit = true;
      return;
    };

    if self.session.is_some() && !view.captures_input() && key.code == KeyCode::Char(':') {
      self.command_input.activate();
      return;
    }

    let action = view.handle_key(key);
    self.apply(action);
  }

  fn tick(&mut self) {
    let actions: Vec<ViewAction> = self.view_stack.iter_mut().map(|v| v.tick()).collect();
    for action in actions {
      self.apply(action);
    }

    if self.flash.as_ref().is_some_and(|f| f.is_expired()) {
      self.flash = None;
    }
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Navigate(route) => self.open(route),
      ViewAction::LoggedIn(session) => self.log_in(session),
      ViewAction::Flash(message) => self.flash = Some(Flash::info(message)),
    }
  }

  fn log_in(&mut self, session: Session) {
    info!(role = ?session.role, students = session.students.len(), "logged in");
    if let Err(e) = self.store.save(&session) {
      warn!(error = %e, "could not persist session");
      self.flash = Some(Flash::error("Logged in, but the session could not be saved"));
    } else {
      self.flash = Some(Flash::info(format!("Welcome, {}", session.display_name)));
    }

    self.command_input.set_role(session.role);
    self.view_stack = vec![Box::new(HomeView::new(&session))];
    self.session = Some(session);
  }

  fn log_out(&mut self) {
    if let Err(e) = self.store.clear() {
      warn!(error = %e, "could not remove saved session");
    }
    info!("logged out");

    self.session = None;
    self.command_input.set_role(Role::Parent);
    self.view_stack = vec![Box::new(LoginView::new(self.client.clone()))];
    self.flash = Some(Flash::info("Logged out"));
  }

  fn switch_student(&mut self) {
    let Some(session) = self.session.as_mut() else {
      return;
    };
    if session.students.len() < 2 {
      self.flash = Some(Flash::error("No other student on this account"));
      return;
    }
    let Some(student) = session.cycle_student().cloned() else {
      return;
    };

    if let Err(e) = self.store.save(session) {
      warn!(error = %e, "could not persist student switch");
    }
    self.view_stack = vec![Box::new(HomeView::new(session))];
    self.flash = Some(Flash::info(format!("Now showing {}", student.name)));
  }

  /// Open a top-level screen above Home.
  fn open(&mut self, route: Route) {
    match route {
      Route::Quit => {
        self.should_quit = true;
        return;
      }
      Route::Logout => {
        self.log_out();
        return;
      }
      Route::SwitchStudent => {
        self.switch_student();
        return;
      }
      _ => {}
    }

    let Some(session) = self.session.as_ref() else {
      return;
    };
    if route == Route::Home {
      self.view_stack = vec![Box::new(HomeView::new(session))];
      return;
    }

    let today = Local::now().date_naive();
    let client = self.client.clone();
    let student = session.active_student().cloned();

    let view: Box<dyn View> = match (route, student) {
      (Route::Holidays, _) => Box::new(HolidaysView::new(client, session.subject(), today)),
      (Route::Search, _) if session.is_admin() => {
        Box::new(StudentSearchView::new(client, session.subject(), today))
      }
      (Route::Attendance, Some(student)) => Box::new(AttendanceView::new(client, student, today)),
      (Route::Notices, Some(student)) => Box::new(NoticesView::new(
        client,
        student.student_id,
        NoticeWindow::from_days(self.config.notices.window_days),
        today,
      )),
      (Route::Leave, Some(student)) => Box::new(LeaveView::new(client, student)),
      (Route::Fees, Some(student)) => Box::new(FeesView::new(client, student.student_id, today)),
      (Route::Complaints, Some(student)) => Box::new(ComplaintView::new(client, student)),
      (Route::Rate, Some(student)) => Box::new(RatingView::new(client, student)),
      (Route::Profile, Some(student)) => Box::new(ProfileView::new(client, student, false, today)),
      (route, _) => {
        warn!(?route, role = ?session.role, "screen not available for this login");
        self.flash = Some(Flash::error("That screen is not available for this login"));
        return;
      }
    };

    self.view_stack.truncate(1);
    self.view_stack.push(view);
  }
}

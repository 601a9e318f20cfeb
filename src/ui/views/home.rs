use crate::commands::{Command, Route, COMMANDS};
use crate::session::{Role, Session};
use crate::ui::ensure_valid_selection;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Main menu: every screen the logged-in role can open
pub struct HomeView {
  greeting: Vec<Line<'static>>,
  items: Vec<&'static Command>,
  list_state: ListState,
}

impl HomeView {
  pub fn new(session: &Session) -> Self {
    let items = COMMANDS
      .iter()
      .filter(|c| c.audience.allows(session.role) && c.route != Route::Home)
      .filter(|c| c.route != Route::SwitchStudent || session.students.len() > 1)
      .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(0));

    Self {
      greeting: greeting(session),
      items,
      list_state,
    }
  }
}

fn greeting(session: &Session) -> Vec<Line<'static>> {
  let dim = Style::default().fg(Color::DarkGray);
  let mut lines = vec![Line::from(Span::styled(
    format!("Welcome, {}", session.display_name),
    Style::default().fg(Color::Cyan).bold(),
  ))];

  match (session.role, session.active_student()) {
    (Role::Parent, Some(student)) => {
      lines.push(Line::from(vec![
        Span::styled("Student  ", dim),
        Span::raw(format!("{} ({})", student.name, student.class_name)),
      ]));
      lines.push(Line::from(vec![
        Span::styled("Mobile   ", dim),
        Span::raw(session.login.clone()),
      ]));
    }
    (Role::Admin, _) => {
      lines.push(Line::styled("School office", dim));
    }
    (Role::Parent, None) => {}
  }

  lines.push(Line::from(vec![
    Span::styled("Since    ", dim),
    Span::raw(
      session
        .started_at
        .with_timezone(&chrono::Local)
        .format("%d %b %Y %H:%M")
        .to_string(),
    ),
  ]));
  lines
}

impl View for HomeView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Enter => {
        if let Some(cmd) = self.list_state.selected().and_then(|i| self.items.get(i)) {
          return ViewAction::Navigate(cmd.route);
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let [top, menu] =
      Layout::vertical([Constraint::Length(self.greeting.len() as u16 + 2), Constraint::Min(3)])
        .areas(area);

    let greeting = Paragraph::new(self.greeting.clone()).block(
      Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(greeting, top);

    ensure_valid_selection(&mut self.list_state, self.items.len());
    let items: Vec<ListItem> = self
      .items
      .iter()
      .map(|cmd| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<14}", cmd.name), Style::default().fg(Color::Cyan)),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(
        Block::default()
          .title(" Menu ")
          .title_alignment(Alignment::Center)
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Blue)),
      )
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, menu, &mut self.list_state);
  }

  fn breadcrumb_label(&self) -> String {
    "Home".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "go to").with_priority(10),
      ShortcutInfo::new("Enter", "open").with_priority(20),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

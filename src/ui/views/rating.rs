use crate::api::types::StudentRef;
use crate::api::CachedDpsClient;
use crate::school::forms::review;
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::{submit, Submission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
  Stars,
  Comment,
}

/// Star rating (1 to 5) with an optional comment
pub struct RatingView {
  client: CachedDpsClient,
  student: StudentRef,
  rating: u8,
  comment: TextInput,
  focus: Focus,
  submission: Option<Submission>,
  error: Option<String>,
}

impl RatingView {
  pub fn new(client: CachedDpsClient, student: StudentRef) -> Self {
    Self {
      client,
      student,
      rating: 0,
      comment: TextInput::new().with_max_len(500),
      focus: Focus::Stars,
      submission: None,
      error: None,
    }
  }

  fn send(&mut self) {
    match review(&self.student.student_id, self.rating, self.comment.value()) {
      Ok(review) => {
        self.error = None;
        let client = self.client.clone();
        self.submission = Some(submit(move || {
          let client = client.clone();
          let review = review.clone();
          async move { client.send_review(&review).await }
        }));
      }
      Err(e) => self.error = Some(e.to_string()),
    }
  }

  fn stars(&self) -> Line<'static> {
    let active = self.focus == Focus::Stars;
    let spans = (1..=5u8)
      .map(|n| {
        let style = if n <= self.rating {
          Style::default().fg(Color::Yellow).bold()
        } else {
          Style::default().fg(Color::DarkGray)
        };
        Span::styled(if n <= self.rating { " ★ " } else { " ☆ " }, style)
      })
      .chain(std::iter::once(Span::styled(
        if active { "  ←/→ or 1-5" } else { "" },
        Style::default().fg(Color::DarkGray),
      )))
      .collect::<Vec<_>>();
    Line::from(spans)
  }
}

impl View for RatingView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.submission.is_some() {
      return ViewAction::None;
    }

    match (self.focus, key.code) {
      (_, KeyCode::Tab) | (_, KeyCode::BackTab) => {
        self.focus = match self.focus {
          Focus::Stars => Focus::Comment,
          Focus::Comment => Focus::Stars,
        };
      }
      (Focus::Stars, KeyCode::Left | KeyCode::Char('h')) => {
        self.rating = self.rating.saturating_sub(1).max(1);
      }
      (Focus::Stars, KeyCode::Right | KeyCode::Char('l')) => {
        self.rating = (self.rating + 1).min(5);
      }
      (Focus::Stars, KeyCode::Char(c @ '1'..='5')) => {
        self.rating = c as u8 - b'0';
      }
      (Focus::Stars, KeyCode::Enter) => self.send(),
      (Focus::Stars, KeyCode::Char('q') | KeyCode::Esc) => return ViewAction::Pop,
      (Focus::Comment, _) => match self.comment.handle_key(key) {
        InputResult::Submitted(_) => self.send(),
        InputResult::Cancelled => self.focus = Focus::Stars,
        InputResult::Consumed | InputResult::NotHandled => {}
      },
      _ => {}
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
        self.rating = 0;
        self.comment.clear();
        self.focus = Focus::Stars;
        ViewAction::Flash(ack.message)
      }
      Err(e) => {
        self.error = Some(format!("Rating was not sent: {}", e));
        ViewAction::None
      }
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Rate the school ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [stars_area, comment_area, status_area] = Layout::vertical([
      Constraint::Length(3),
      Constraint::Length(5),
      Constraint::Min(1),
    ])
    .areas(inner);

    let focus_color = |focus: Focus| {
      if self.focus == focus && self.submission.is_none() {
        Color::Yellow
      } else {
        Color::DarkGray
      }
    };

    frame.render_widget(
      Paragraph::new(self.stars()).block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(focus_color(Focus::Stars)))
          .title(" Rating "),
      ),
      stars_area,
    );

    let mut comment = vec![Span::raw(self.comment.display())];
    if self.focus == Focus::Comment {
      comment.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(
      Paragraph::new(Line::from(comment)).wrap(Wrap { trim: false }).block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(focus_color(Focus::Comment)))
          .title(" Comment (optional) "),
      ),
      comment_area,
    );

    let status = match (&self.submission, &self.error) {
      (Some(_), _) => Line::styled(" Sending...", Style::default().fg(Color::Yellow)),
      (None, Some(error)) => Line::styled(format!(" {}", error), Style::default().fg(Color::Red)),
      (None, None) => Line::styled(
        format!(" Rating on behalf of {}'s family", self.student.name),
        Style::default().fg(Color::DarkGray),
      ),
    };
    frame.render_widget(Paragraph::new(status), status_area);
  }

  fn breadcrumb_label(&self) -> String {
    "Rate".to_string()
  }

  fn captures_input(&self) -> bool {
    self.focus == Focus::Comment
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("←/→", "stars").with_priority(10),
      ShortcutInfo::new("Tab", "comment").with_priority(20),
      ShortcutInfo::new("Enter", "send").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(90),
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

  fn view() -> RatingView {
    RatingView::new(
      super::super::test_client(),
      StudentRef {
        student_id: "S1".to_string(),
        name: "Riya".to_string(),
        class_name: "V-A".to_string(),
      },
    )
  }

  #[test]
  fn test_star_keys() {
    let mut view = view();
    view.handle_key(key(KeyCode::Right));
    view.handle_key(key(KeyCode::Right));
    assert_eq!(view.rating, 2);
    view.handle_key(key(KeyCode::Char('5')));
    view.handle_key(key(KeyCode::Right));
    assert_eq!(view.rating, 5);
    view.handle_key(key(KeyCode::Char('1')));
    view.handle_key(key(KeyCode::Left));
    assert_eq!(view.rating, 1);
  }

  #[test]
  fn test_unrated_submit_is_rejected() {
    let mut view = view();
    view.handle_key(key(KeyCode::Enter));
    assert!(view.submission.is_none());
    assert_eq!(view.error.as_deref(), Some("Rating must be between 1 and 5"));
  }

  #[test]
  fn test_comment_focus_captures_q() {
    let mut view = view();
    view.handle_key(key(KeyCode::Tab));
    assert!(view.captures_input());
    assert!(matches!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::None));
    assert_eq!(view.comment.value(), "q");
  }
}

use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

#[derive(Debug, Clone)]
pub struct FormField {
  pub label: &'static str,
  pub hint: &'static str,
  pub input: TextInput,
}

impl FormField {
  pub fn new(label: &'static str, input: TextInput) -> Self {
    Self {
      label,
      hint: "",
      input,
    }
  }

  pub fn with_hint(mut self, hint: &'static str) -> Self {
    self.hint = hint;
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Enter on the last field; values in field order
  Submitted(Vec<String>),
  Cancelled,
}

/// Stack of labelled inputs. Tab/Down and Enter move forward, Enter on the
/// last field submits.
#[derive(Debug, Clone)]
pub struct Form {
  fields: Vec<FormField>,
  focus: usize,
}

impl Form {
  pub fn new(fields: Vec<FormField>) -> Self {
    Self { fields, focus: 0 }
  }

  pub fn values(&self) -> Vec<String> {
    self.fields.iter().map(|f| f.input.value().to_string()).collect()
  }

  pub fn value(&self, index: usize) -> &str {
    self.fields.get(index).map(|f| f.input.value()).unwrap_or("")
  }

  pub fn focus(&self) -> usize {
    self.focus
  }

  pub fn set_value(&mut self, index: usize, value: &str) {
    if let Some(field) = self.fields.get_mut(index) {
      field.input.set_value(value);
    }
  }

  pub fn clear(&mut self) {
    for field in &mut self.fields {
      field.input.clear();
    }
    self.focus = 0;
  }

  fn next(&mut self) {
    if !self.fields.is_empty() {
      self.focus = (self.focus + 1) % self.fields.len();
    }
  }

  fn previous(&mut self) {
    if !self.fields.is_empty() {
      self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.next();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.previous();
        return KeyResult::Handled;
      }
      _ => {}
    }

    let Some(field) = self.fields.get_mut(self.focus) else {
      return KeyResult::NotHandled;
    };

    match field.input.handle_key(key) {
      InputResult::Submitted(_) if self.focus + 1 == self.fields.len() => {
        KeyResult::Event(FormEvent::Submitted(self.values()))
      }
      InputResult::Submitted(_) => {
        self.next();
        KeyResult::Handled
      }
      InputResult::Cancelled => KeyResult::Event(FormEvent::Cancelled),
      InputResult::Consumed => KeyResult::Handled,
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// Draw the fields top to bottom, two rows each.
  pub fn render(&self, frame: &mut Frame, area: Rect, active: bool) {
    let rows: Vec<Constraint> = self
      .fields
      .iter()
      .map(|_| Constraint::Length(3))
      .chain(std::iter::once(Constraint::Min(0)))
      .collect();
    let areas = Layout::vertical(rows).split(area);

    for (i, (field, field_area)) in self.fields.iter().zip(areas.iter()).enumerate() {
      let focused = active && i == self.focus;
      let border = if focused { Color::Yellow } else { Color::DarkGray };

      let mut title = vec![Span::styled(
        format!(" {} ", field.label),
        Style::default().fg(Color::White),
      )];
      if !field.hint.is_empty() {
        title.push(Span::styled(
          format!("({}) ", field.hint),
          Style::default().fg(Color::DarkGray),
        ));
      }

      let paragraph = Paragraph::new(field.input.display())
        .block(
          Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(Line::from(title)),
        );
      frame.render_widget(paragraph, *field_area);

      if focused {
        let column = (field.input.cursor_position() as u16).min(field_area.width.saturating_sub(3));
        frame.set_cursor_position((field_area.x + 1 + column, field_area.y + 1));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn form() -> Form {
    Form::new(vec![
      FormField::new("Subject", TextInput::new()),
      FormField::new("Message", TextInput::new()),
    ])
  }

  fn type_str(form: &mut Form, s: &str) {
    for c in s.chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_enter_advances_then_submits() {
    let mut form = form();
    type_str(&mut form, "Bus");
    assert_eq!(form.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert_eq!(form.focus(), 1);
    type_str(&mut form, "Late");
    assert_eq!(
      form.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(FormEvent::Submitted(vec![
        "Bus".to_string(),
        "Late".to_string()
      ]))
    );
  }

  #[test]
  fn test_tab_wraps_around() {
    let mut form = form();
    form.handle_key(key(KeyCode::Tab));
    form.handle_key(key(KeyCode::Tab));
    assert_eq!(form.focus(), 0);
    form.handle_key(key(KeyCode::BackTab));
    assert_eq!(form.focus(), 1);
  }

  #[test]
  fn test_escape_cancels_and_clear_resets() {
    let mut form = form();
    type_str(&mut form, "x");
    assert_eq!(
      form.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(FormEvent::Cancelled)
    );
    form.clear();
    assert_eq!(form.value(0), "");
    assert_eq!(form.focus(), 0);
  }
}

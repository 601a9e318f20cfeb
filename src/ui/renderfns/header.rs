use crate::session::{Role, Session};
use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar: portal title, who is logged in, and the current
/// view's shortcuts.
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  session: Option<&Session>,
  shortcuts: &[ShortcutInfo],
) {
  let separator = || Span::styled("│", Style::default().fg(Color::DarkGray));

  let mut spans = vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    separator(),
  ];

  if let Some(session) = session {
    spans.push(Span::styled(
      format!(" {} ", who(session)),
      Style::default().fg(Color::Yellow).bold(),
    ));
    spans.push(separator());
  }

  let mut shortcuts = shortcuts.to_vec();
  shortcuts.sort_by_key(|s| s.priority);
  for shortcut in shortcuts {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn who(session: &Session) -> String {
  match session.role {
    Role::Admin => format!("{} (admin)", session.display_name),
    Role::Parent => match session.active_student() {
      Some(student) if session.students.len() > 1 => format!(
        "{} · {} (+{} more)",
        student.name,
        student.class_name,
        session.students.len() - 1
      ),
      Some(student) => format!("{} · {}", student.name, student.class_name),
      None => session.display_name.clone(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::{AdminAccount, StudentRef};

  #[test]
  fn test_who_shows_active_student() {
    let session = Session::parent(
      "9876543210",
      vec![StudentRef {
        student_id: "S1".to_string(),
        name: "Riya".to_string(),
        class_name: "V-A".to_string(),
      }],
    );
    assert_eq!(who(&session), "Riya · V-A");
  }

  #[test]
  fn test_who_marks_admin() {
    let session = Session::admin(AdminAccount {
      id: "1".to_string(),
      name: "Office".to_string(),
    });
    assert_eq!(who(&session), "Office (admin)");
  }
}

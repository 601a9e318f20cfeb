use crate::ui::{Flash, FlashLevel};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer: navigation breadcrumb, then the flash message if any.
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], flash: Option<&Flash>) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i + 1 == breadcrumb.len() {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };
    spans.push(Span::styled(part.clone(), style));
  }

  if let Some(flash) = flash {
    let color = match flash.level {
      FlashLevel::Info => Color::Green,
      FlashLevel::Error => Color::Red,
    };
    spans.push(Span::styled("   ", Style::default()));
    spans.push(Span::styled(flash.message.clone(), Style::default().fg(color)));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum Event {
  /// Key press (releases and repeats are filtered out)
  Key(KeyEvent),
  /// Terminal resized; forces a redraw
  Resize,
  /// Periodic tick: queries are polled and flash messages age out
  Tick,
}

/// Reads terminal input on a background task and interleaves ticks.
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
      loop {
        let event = match event::poll(tick_rate) {
          Ok(true) => match event::read() {
            Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
            Ok(CrosstermEvent::Resize(_, _)) => Event::Resize,
            _ => continue,
          },
          _ => Event::Tick,
        };

        if tx.send(event).is_err() {
          break;
        }
      }
    });

    Self { rx }
  }

  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

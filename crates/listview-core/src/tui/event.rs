//! Terminal events, read on a helper thread and delivered over a channel.

use std::sync::mpsc::{self, Receiver};
use std::thread;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Terminal resized; the next draw picks up the new size.
    Resize,
}

pub struct EventHandler {
    rx: Receiver<Event>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(evt) = event::read() {
                let event = match evt {
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
                    CrosstermEvent::Resize(_, _) => Event::Resize,
                    _ => continue,
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Blocks until the next event. Fails once the reader thread is gone.
    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

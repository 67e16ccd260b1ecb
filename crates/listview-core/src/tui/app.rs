//! Main TUI application.

use std::io;
use std::path::PathBuf;

use crossterm::event::KeyEvent;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::debug;

use crate::export::{CsvOptions, export_to_path};
use crate::provider::{
    Notification, Notifier, RecordSink, RecordSource, RecordingNotifier, Severity,
};
use crate::session::ListSession;

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;
use super::state::AppState;

/// Interactive browser over a loaded session.
pub struct App<S, K> {
    session: ListSession<S, K, RecordingNotifier>,
    state: AppState,
    title: String,
    csv: CsvOptions,
    should_quit: bool,
}

impl<S, K> App<S, K>
where
    S: RecordSource,
    K: RecordSink,
{
    pub fn new(session: ListSession<S, K, RecordingNotifier>, title: impl Into<String>) -> Self {
        Self {
            session,
            state: AppState::default(),
            title: title.into(),
            csv: CsvOptions::default(),
            should_quit: false,
        }
    }

    /// Enables `e`, writing CSV to `path`.
    pub fn with_export(mut self, path: PathBuf, csv: CsvOptions) -> Self {
        self.state.export_path = Some(path);
        self.csv = csv;
        self
    }

    pub fn session(&self) -> &ListSession<S, K, RecordingNotifier> {
        &self.session
    }

    /// Runs the TUI until the user quits.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let events = EventHandler::new();
        let result = self.event_loop(&mut terminal, &events);

        // Restore the terminal even when drawing failed.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        events: &EventHandler,
    ) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| {
                render(
                    frame,
                    &self.state,
                    self.session.view(),
                    &self.title,
                    self.session.notifier().last(),
                )
            })?;

            match events.next() {
                Ok(Event::Key(key)) => self.on_key(key),
                Ok(Event::Resize) => {}
                Err(_) => self.should_quit = true,
            }
        }
        Ok(())
    }

    /// Applies a key press and carries out the resulting action.
    pub fn on_key(&mut self, key: KeyEvent) {
        let action = handle_key(&mut self.state, self.session.view_mut(), key);
        debug!(?action, page = self.session.view().state().page, "key handled");
        match action {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Reload => {
                if let Ok(count) = self.session.reload() {
                    self.session.notifier_mut().notify(Notification::new(
                        "Reloaded",
                        format!("{} records", count),
                        Severity::Info,
                    ));
                }
            }
            KeyAction::Export => self.export(),
            KeyAction::None => {}
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn export(&mut self) {
        let Some(path) = self.state.export_path.clone() else {
            self.session.notifier_mut().notify(Notification::new(
                "Export",
                "No export path configured",
                Severity::Warning,
            ));
            return;
        };
        let outcome = export_to_path(self.session.view(), &self.csv, &path);
        let notification = match outcome {
            Ok(rows) => Notification::success(
                "Exported",
                format!("{} records to {}", rows, path.display()),
            ),
            Err(e) => Notification::error(
                "Error",
                format!("Failed to export to {}: {}", path.display(), e),
            ),
        };
        self.session.notifier_mut().notify(notification);
    }
}

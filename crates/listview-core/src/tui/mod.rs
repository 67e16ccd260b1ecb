//! Terminal browser for a record list.
//!
//! Pages, sorts and filters a [`crate::session::ListSession`] interactively,
//! with a status line showing the last notification.

mod app;
mod event;
mod input;
mod render;
mod state;
mod style;

pub use app::App;
pub use input::KeyAction;
pub use state::{AppState, InputMode};

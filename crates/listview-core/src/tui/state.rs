//! Interaction state of the browser, separate from the list's own view state.

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a filter for the selected column.
    Filter,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub input_mode: InputMode,
    /// Schema column index the filter input applies to.
    pub filter_column: usize,
    pub filter_input: String,
    /// Destination for `e`; export is unavailable when unset.
    pub export_path: Option<PathBuf>,
}

impl AppState {
    /// Moves the filter column forward, wrapping at `columns`.
    pub fn cycle_filter_column(&mut self, columns: usize) {
        if columns > 0 {
            self.filter_column = (self.filter_column + 1) % columns;
        }
    }
}

//! listview-core: filterable, sortable, paginated record lists.
//!
//! Provides:
//! - `record`: dynamically typed records and values
//! - `schema`: column declarations (label, kind, filter mode, sortability)
//! - `table`: [`table::ListView`], the filter/sort/page state machine
//! - `view`: UI-agnostic table view model and plain-text rendering
//! - `fmt`: shared formatting helpers (numbers, dates, footers)
//! - `provider`: record source, record sink and notifier collaborators
//! - `form`: draft record validation for create flows
//! - `session`: a list bound to its collaborators
//! - `export`: CSV export of the filtered list
//!
//! With `tui` feature (default):
//! - `tui`: interactive browser (ratatui/crossterm)

pub mod export;
pub mod fmt;
pub mod form;
pub mod provider;
pub mod record;
pub mod schema;
pub mod session;
pub mod table;
pub mod view;

#[cfg(feature = "tui")]
pub mod tui;

/// Crate version, shown by the binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use record::{Record, Value};
pub use schema::{Column, FieldKind, FilterMode, Schema};
pub use table::{ListView, PageResult, SortDirection, ViewState};

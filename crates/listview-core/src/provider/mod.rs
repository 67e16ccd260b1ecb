//! Collaborators that feed and consume a list.
//!
//! - [`RecordSource`] fetches an ordered collection for some criteria.
//! - [`RecordSink`] accepts a created or edited record.
//! - [`Notifier`] surfaces outcomes to the user.
//!
//! A [`ListView`](crate::table::ListView) never calls any of these itself; the
//! [`ListSession`](crate::session::ListSession) sequences them around it.

mod file;
pub mod mock;

pub use file::{JsonFileSink, JsonFileSource};

use std::collections::BTreeMap;
use std::fmt;

use tracing::{error, info, warn};

use crate::record::Record;

/// A fetch or submit could not reach or read its backing store.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// I/O error while reading/writing data.
    Io(String),
    /// Stored data could not be decoded.
    Parse(String),
    /// Backend refused or could not serve the call.
    Unavailable(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Io(msg) => write!(f, "I/O error: {}", msg),
            TransportError::Parse(msg) => write!(f, "Parse error: {}", msg),
            TransportError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Submission failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// Rejected by backend validation. The message is meant for the user as is.
    Validation(String),
    Transport(TransportError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Validation(msg) => f.write_str(msg),
            SubmitError::Transport(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::Validation(_) => None,
            SubmitError::Transport(e) => Some(e),
        }
    }
}

impl From<TransportError> for SubmitError {
    fn from(e: TransportError) -> Self {
        SubmitError::Transport(e)
    }
}

/// Parameters for a fetch, opaque to the list (e.g. the owning invoice id).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Criteria {
    params: BTreeMap<String, String>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when every parameter equals the display text of the same-named field.
    /// Sources without their own query language use this to scope a fetch.
    pub fn matches(&self, record: &Record) -> bool {
        self.params
            .iter()
            .all(|(k, v)| record.get(k).display_text() == *v)
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            return f.write_str("*");
        }
        let parts: Vec<String> = self.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        f.write_str(&parts.join(","))
    }
}

/// Returned by a sink on success.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitReceipt {
    /// Identity assigned or confirmed by the sink.
    pub id: Option<String>,
}

/// Source of ordered records.
pub trait RecordSource {
    fn fetch(&mut self, criteria: &Criteria) -> Result<Vec<Record>, TransportError>;
}

/// Destination for created or edited records.
pub trait RecordSink {
    fn submit(&mut self, record: Record) -> Result<SubmitReceipt, SubmitError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A user-facing outcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Success)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Error)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Fire-and-forget sink for [`Notification`]s.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

fn log_notification(n: &Notification) {
    match n.severity {
        Severity::Success | Severity::Info => info!(title = %n.title, "{}", n.message),
        Severity::Warning => warn!(title = %n.title, "{}", n.message),
        Severity::Error => error!(title = %n.title, "{}", n.message),
    }
}

/// Logs notifications and keeps them for display (status line, CLI output, tests).
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    history: Vec<Notification>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.history.last()
    }

    pub fn all(&self) -> &[Notification] {
        &self.history
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notification: Notification) {
        log_notification(&notification);
        self.history.push(notification);
    }
}

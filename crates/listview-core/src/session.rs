//! A list bound to its collaborators.
//!
//! [`ListSession`] sequences fetches and submissions around a [`ListView`] and
//! reports outcomes through a [`Notifier`]. A failed fetch leaves the view
//! exactly as it was; a failed submission leaves the form exactly as it was.

use std::fmt;

use tracing::{info, warn};

use crate::form::{FormError, RecordForm};
use crate::provider::{
    Criteria, Notification, Notifier, RecordSink, RecordSource, SubmitError, SubmitReceipt,
    TransportError,
};
use crate::table::ListView;

/// Why a form submission did not go through.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    Form(FormError),
    Submit(SubmitError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Form(e) => write!(f, "{}", e),
            SessionError::Submit(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Form(e) => Some(e),
            SessionError::Submit(e) => Some(e),
        }
    }
}

impl From<FormError> for SessionError {
    fn from(e: FormError) -> Self {
        SessionError::Form(e)
    }
}

impl From<SubmitError> for SessionError {
    fn from(e: SubmitError) -> Self {
        SessionError::Submit(e)
    }
}

pub struct ListSession<S, K, N> {
    view: ListView,
    source: S,
    sink: K,
    notifier: N,
    /// Criteria of the last successful load; reused by [`ListSession::reload`].
    criteria: Criteria,
}

impl<S, K, N> ListSession<S, K, N>
where
    S: RecordSource,
    K: RecordSink,
    N: Notifier,
{
    pub fn new(view: ListView, source: S, sink: K, notifier: N) -> Self {
        Self {
            view,
            source,
            sink,
            notifier,
            criteria: Criteria::default(),
        }
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ListView {
        &mut self.view
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Fetches with `criteria` and installs the result, resetting the view state.
    /// On failure nothing changes and an error notification is sent.
    pub fn load(&mut self, criteria: Criteria) -> Result<usize, TransportError> {
        match self.source.fetch(&criteria) {
            Ok(records) => {
                let count = records.len();
                info!(%criteria, count, "records loaded");
                self.view.replace_collection(records);
                self.criteria = criteria;
                Ok(count)
            }
            Err(e) => {
                warn!(%criteria, error = %e, "load failed, keeping previous records");
                self.notifier.notify(Notification::error(
                    "Error",
                    format!("Failed to load records: {}", e),
                ));
                Err(e)
            }
        }
    }

    /// Loads again with the criteria of the last successful load.
    pub fn reload(&mut self) -> Result<usize, TransportError> {
        self.load(self.criteria.clone())
    }

    /// Validates and submits `form`. On success the form is reset and the list
    /// reloaded; a reload failure is notified but does not undo the submission.
    pub fn submit_form(&mut self, form: &mut RecordForm) -> Result<SubmitReceipt, SessionError> {
        let record = match form.validate() {
            Ok(record) => record,
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Missing Data", e.to_string()));
                return Err(e.into());
            }
        };

        match self.sink.submit(record) {
            Ok(receipt) => {
                self.notifier.notify(Notification::success(
                    "Success",
                    "Record created successfully",
                ));
                form.reset();
                // `reload` already notified the failure; the submit still succeeded.
                if let Err(e) = self.reload() {
                    warn!(error = %e, "reload after submit failed");
                }
                Ok(receipt)
            }
            Err(SubmitError::Validation(message)) => {
                self.notifier
                    .notify(Notification::error("Error", message.clone()));
                Err(SubmitError::Validation(message).into())
            }
            Err(SubmitError::Transport(e)) => {
                warn!(error = %e, "submit failed");
                self.notifier.notify(Notification::error(
                    "Error",
                    format!("Failed to save record: {}", e),
                ));
                Err(SubmitError::Transport(e).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::{MockSink, MockSource};
    use crate::provider::{RecordingNotifier, Severity};
    use crate::record::{Record, Value};
    use crate::schema::{Column, Schema};

    type TestSession = ListSession<MockSource, MockSink, RecordingNotifier>;

    fn lines() -> Vec<Record> {
        (1..=7)
            .map(|i| {
                Record::new()
                    .with("Id", format!("l{}", i))
                    .with("InvoiceM__c", if i % 2 == 0 { "a02" } else { "a01" })
                    .with("Quantity__c", i as i64)
            })
            .collect()
    }

    fn session() -> TestSession {
        let schema = Schema::new()
            .column(Column::text("Product_Name__c", "Product").required())
            .column(Column::number("Quantity__c", "Quantity").required());
        ListSession::new(
            ListView::new(schema),
            MockSource::new(lines()),
            MockSink::new(),
            RecordingNotifier::new(),
        )
    }

    #[test]
    fn test_load_replaces_collection() {
        let mut s = session();
        let count = s.load(Criteria::new().with("InvoiceM__c", "a01")).unwrap();
        assert_eq!(count, 4);
        assert_eq!(s.view().len(), 4);
        assert_eq!(s.criteria().get("InvoiceM__c"), Some("a01"));
        assert!(s.notifier().all().is_empty());
    }

    #[test]
    fn test_failed_load_keeps_view_state() {
        let mut s = session();
        s.load(Criteria::new()).unwrap();
        s.view_mut().set_sort("Quantity__c");
        s.view_mut().set_filter("InvoiceM__c", "a01");
        s.view_mut().next_page();
        let before_state = s.view().state().clone();
        let before_records = s.view().records().to_vec();

        s.source_mut()
            .fail_next(TransportError::Unavailable("offline".into()));
        let err = s.load(Criteria::new().with("InvoiceM__c", "a02")).unwrap_err();

        assert_eq!(err, TransportError::Unavailable("offline".into()));
        assert_eq!(s.view().state(), &before_state);
        assert_eq!(s.view().records(), before_records.as_slice());
        assert!(s.criteria().is_empty());
        let last = s.notifier().last().unwrap();
        assert_eq!(last.severity, Severity::Error);
        assert_eq!(
            last.message,
            "Failed to load records: Unavailable: offline"
        );
    }

    #[test]
    fn test_submit_resets_form_and_reloads() {
        let mut s = session();
        s.load(Criteria::new().with("InvoiceM__c", "a01")).unwrap();
        s.view_mut().set_sort("Quantity__c");

        let mut form = RecordForm::from_schema(s.view().schema());
        form.set("Product_Name__c", "Widget");
        form.set("Quantity__c", 3);
        form.set("InvoiceM__c", "a01");

        let receipt = s.submit_form(&mut form).unwrap();
        assert_eq!(receipt.id.as_deref(), Some("mock-1"));
        assert!(form.values().is_empty());
        assert_eq!(s.sink().accepted().len(), 1);
        assert_eq!(s.source().fetches().len(), 2);
        assert_eq!(
            s.source().fetches()[1].get("InvoiceM__c"),
            Some("a01"),
            "reload reuses the last criteria"
        );
        assert_eq!(s.view().state().sort_field, None);
        assert_eq!(s.notifier().last().unwrap().severity, Severity::Success);
    }

    #[test]
    fn test_failed_reload_after_submit_still_succeeds() {
        let mut s = session();
        s.load(Criteria::new()).unwrap();
        s.source_mut()
            .fail_next(TransportError::Unavailable("offline".into()));
        let mut form = RecordForm::from_schema(s.view().schema());
        form.set("Product_Name__c", "Widget");
        form.set("Quantity__c", 2);

        assert!(s.submit_form(&mut form).is_ok());
        assert!(form.values().is_empty());
        assert_eq!(s.view().len(), 7, "previous records kept");
        let severities: Vec<Severity> = s.notifier().all().iter().map(|n| n.severity).collect();
        assert_eq!(severities, vec![Severity::Success, Severity::Error]);
    }

    #[test]
    fn test_incomplete_form_is_not_submitted() {
        let mut s = session();
        let mut form = RecordForm::from_schema(s.view().schema());
        form.set("Quantity__c", 3);

        let err = s.submit_form(&mut form).unwrap_err();
        assert_eq!(
            err,
            SessionError::Form(FormError::MissingFields(vec!["Product_Name__c".into()]))
        );
        assert!(s.sink().accepted().is_empty());
        assert_eq!(form.get("Quantity__c"), &Value::Number(3.0));
        assert_eq!(s.notifier().last().unwrap().title, "Missing Data");
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let mut s = session();
        s.sink_mut()
            .reject_next(SubmitError::Validation("Quantity must be positive".into()));
        let mut form = RecordForm::from_schema(s.view().schema());
        form.set("Product_Name__c", "Widget");
        form.set("Quantity__c", -1);

        let err = s.submit_form(&mut form).unwrap_err();
        assert_eq!(
            err,
            SessionError::Submit(SubmitError::Validation("Quantity must be positive".into()))
        );
        assert_eq!(s.notifier().last().unwrap().message, "Quantity must be positive");
        assert_eq!(form.get("Product_Name__c"), &Value::Text("Widget".into()));
        assert!(s.source().fetches().is_empty());
    }

    #[test]
    fn test_transport_failure_on_submit_keeps_form() {
        let mut s = session();
        s.sink_mut()
            .reject_next(SubmitError::Transport(TransportError::Io("timeout".into())));
        let mut form = RecordForm::from_schema(s.view().schema());
        form.set("Product_Name__c", "Widget");
        form.set("Quantity__c", 1);

        assert!(s.submit_form(&mut form).is_err());
        assert!(!form.values().is_empty());
        assert_eq!(
            s.notifier().last().unwrap().message,
            "Failed to save record: I/O error: timeout"
        );
    }
}

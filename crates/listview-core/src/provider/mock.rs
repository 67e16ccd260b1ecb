//! In-memory collaborators for tests and demos.

use std::collections::VecDeque;

use crate::record::Record;

use super::{Criteria, RecordSink, RecordSource, SubmitError, SubmitReceipt, TransportError};

/// Serves a fixed collection, scoped by [`Criteria::matches`]. Failures can be
/// queued to simulate transport errors on upcoming fetches.
#[derive(Debug, Default)]
pub struct MockSource {
    records: Vec<Record>,
    failures: VecDeque<TransportError>,
    fetches: Vec<Criteria>,
}

impl MockSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Makes the next fetch fail with `error`.
    pub fn fail_next(&mut self, error: TransportError) {
        self.failures.push_back(error);
    }

    /// Criteria of every fetch so far, failed ones included.
    pub fn fetches(&self) -> &[Criteria] {
        &self.fetches
    }
}

impl RecordSource for MockSource {
    fn fetch(&mut self, criteria: &Criteria) -> Result<Vec<Record>, TransportError> {
        self.fetches.push(criteria.clone());
        if let Some(error) = self.failures.pop_front() {
            return Err(error);
        }
        Ok(self
            .records
            .iter()
            .filter(|r| criteria.matches(r))
            .cloned()
            .collect())
    }
}

/// Accepts every record unless a rejection is queued.
#[derive(Debug, Default)]
pub struct MockSink {
    accepted: Vec<Record>,
    rejections: VecDeque<SubmitError>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_next(&mut self, error: SubmitError) {
        self.rejections.push_back(error);
    }

    pub fn accepted(&self) -> &[Record] {
        &self.accepted
    }
}

impl RecordSink for MockSink {
    fn submit(&mut self, record: Record) -> Result<SubmitReceipt, SubmitError> {
        if let Some(error) = self.rejections.pop_front() {
            return Err(error);
        }
        self.accepted.push(record);
        Ok(SubmitReceipt {
            id: Some(format!("mock-{}", self.accepted.len())),
        })
    }
}

//! JSON-file backed source and sink.
//!
//! The file holds a single JSON array of flat objects. The source reads it on
//! every fetch; the sink rewrites it with the submitted record appended.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::record::{Record, Value};
use crate::schema::Schema;

use super::{Criteria, RecordSink, RecordSource, SubmitError, SubmitReceipt, TransportError};

fn read_array(path: &Path) -> Result<Vec<serde_json::Value>, TransportError> {
    let text = fs::read_to_string(path)
        .map_err(|e| TransportError::Io(format!("{}: {}", path.display(), e)))?;
    match serde_json::from_str(&text) {
        Ok(serde_json::Value::Array(items)) => Ok(items),
        Ok(_) => Err(TransportError::Parse(format!(
            "{}: expected a JSON array of objects",
            path.display()
        ))),
        Err(e) => Err(TransportError::Parse(format!("{}: {}", path.display(), e))),
    }
}

/// Reads records from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    schema: Schema,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonFileSource {
    fn fetch(&mut self, criteria: &Criteria) -> Result<Vec<Record>, TransportError> {
        let items = read_array(&self.path)?;
        let mut records = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let Some(object) = item.as_object() else {
                return Err(TransportError::Parse(format!(
                    "{}: element {} is not an object",
                    self.path.display(),
                    i
                )));
            };
            let record = Record::from_json_object(object, &self.schema);
            if criteria.matches(&record) {
                records.push(record);
            }
        }
        debug!(
            path = %self.path.display(),
            %criteria,
            total = items.len(),
            matched = records.len(),
            "fetched records"
        );
        Ok(records)
    }
}

/// Appends records to a JSON file, assigning an id when the record has none.
///
/// Records with a blank required field (per schema) are rejected with
/// [`SubmitError::Validation`] before the file is touched.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
    schema: Schema,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    fn next_id(&self, items: &[serde_json::Value]) -> String {
        let taken = |candidate: &str| {
            items.iter().any(|item| {
                item.get(&self.schema.id_field)
                    .map(|v| Value::from_json(v, None).display_text() == candidate)
                    .unwrap_or(false)
            })
        };
        let mut n = items.len() + 1;
        loop {
            let candidate = format!("rec-{:06}", n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl RecordSink for JsonFileSink {
    fn submit(&mut self, mut record: Record) -> Result<SubmitReceipt, SubmitError> {
        let missing: Vec<&str> = self
            .schema
            .required_fields()
            .into_iter()
            .filter(|f| record.get(f).is_blank())
            .collect();
        if !missing.is_empty() {
            return Err(SubmitError::Validation(format!(
                "Required fields are missing: {}",
                missing.join(", ")
            )));
        }

        let mut items = match read_array(&self.path) {
            Ok(items) => items,
            Err(TransportError::Io(_)) if !self.path.exists() => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let id_field = self.schema.id_field.clone();
        let id = match record.id(&id_field) {
            Some(id) => id,
            None => {
                let id = self.next_id(&items);
                record.set(id_field, id.clone());
                id
            }
        };

        items.push(record.to_json());
        let text = serde_json::to_string_pretty(&serde_json::Value::Array(items))
            .map_err(|e| SubmitError::Transport(TransportError::Parse(e.to_string())))?;
        replace_file(&self.path, text.as_bytes()).map_err(|e| io_error(&self.path, e))?;

        info!(path = %self.path.display(), %id, "record saved");
        Ok(SubmitReceipt { id: Some(id) })
    }
}

/// Writes `contents` to a temporary file next to `path`, then renames it over
/// `path`. A failed write leaves the previous file untouched.
fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn io_error(path: &Path, e: io::Error) -> SubmitError {
    SubmitError::Transport(TransportError::Io(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn line_schema() -> Schema {
        Schema::new()
            .column(Column::text("Product_Name__c", "Product").required())
            .column(Column::number("Quantity__c", "Quantity").required())
            .column(Column::date("Invoice_Date__c", "Date"))
    }

    #[test]
    fn test_fetch_with_criteria() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.json");
        fs::write(
            &path,
            r#"[
                {"Id": "l1", "InvoiceM__c": "a01", "Quantity__c": 2, "Invoice_Date__c": "2024-01-02"},
                {"Id": "l2", "InvoiceM__c": "a02", "Quantity__c": 1},
                {"Id": "l3", "InvoiceM__c": "a01", "Quantity__c": null}
            ]"#,
        )
        .unwrap();

        let mut source = JsonFileSource::new(&path, line_schema());
        let all = source.fetch(&Criteria::new()).unwrap();
        assert_eq!(all.len(), 3);
        assert!(matches!(all[0].get("Invoice_Date__c"), Value::Date(_)));

        let scoped = source
            .fetch(&Criteria::new().with("InvoiceM__c", "a01"))
            .unwrap();
        let ids: Vec<String> = scoped.iter().filter_map(|r| r.id("Id")).collect();
        assert_eq!(ids, vec!["l1", "l3"]);
    }

    #[test]
    fn test_fetch_errors() {
        let dir = tempfile::tempdir().unwrap();

        let mut missing = JsonFileSource::new(dir.path().join("nope.json"), Schema::new());
        assert!(matches!(
            missing.fetch(&Criteria::new()),
            Err(TransportError::Io(_))
        ));

        let path = dir.path().join("object.json");
        fs::write(&path, r#"{"Id": "x"}"#).unwrap();
        let mut not_array = JsonFileSource::new(&path, Schema::new());
        assert!(matches!(
            not_array.fetch(&Criteria::new()),
            Err(TransportError::Parse(_))
        ));

        let path = dir.path().join("scalars.json");
        fs::write(&path, "[1, 2]").unwrap();
        let mut scalars = JsonFileSource::new(&path, Schema::new());
        assert!(matches!(
            scalars.fetch(&Criteria::new()),
            Err(TransportError::Parse(_))
        ));
    }

    #[test]
    fn test_sink_appends_and_assigns_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.json");
        let mut sink = JsonFileSink::new(&path, line_schema());

        let receipt = sink
            .submit(
                Record::new()
                    .with("Product_Name__c", "Widget")
                    .with("Quantity__c", 4),
            )
            .unwrap();
        assert_eq!(receipt.id.as_deref(), Some("rec-000001"));

        let receipt = sink
            .submit(
                Record::new()
                    .with("Id", "custom")
                    .with("Product_Name__c", "Gadget")
                    .with("Quantity__c", 1),
            )
            .unwrap();
        assert_eq!(receipt.id.as_deref(), Some("custom"));

        let mut source = JsonFileSource::new(&path, line_schema());
        let records = source.fetch(&Criteria::new()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Quantity__c"), &Value::Number(4.0));
        assert_eq!(records[1].id("Id").as_deref(), Some("custom"));

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["lines.json"], "no temporary files left behind");
    }

    #[test]
    fn test_sink_keeps_file_when_replace_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.json");
        fs::write(&path, r#"[{"Id": "a"}]"#).unwrap();
        // A directory at the destination makes the final rename fail.
        let blocked = dir.path().join("blocked");
        fs::create_dir(&blocked).unwrap();

        assert!(replace_file(&blocked, b"[]").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"[{"Id": "a"}]"#);
        assert!(blocked.is_dir());

        replace_file(&path, b"[]").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_sink_skips_taken_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.json");
        fs::write(&path, r#"[{"Id": "rec-000002"}]"#).unwrap();
        let mut sink = JsonFileSink::new(&path, Schema::new());
        let receipt = sink.submit(Record::new().with("Name", "x")).unwrap();
        assert_eq!(receipt.id.as_deref(), Some("rec-000003"));
    }

    #[test]
    fn test_sink_rejects_missing_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.json");
        let mut sink = JsonFileSink::new(&path, line_schema());

        let err = sink
            .submit(Record::new().with("Product_Name__c", "  "))
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::Validation(
                "Required fields are missing: Product_Name__c, Quantity__c".into()
            )
        );
        assert!(!path.exists());
    }
}

//! Draft record for create/edit flows.
//!
//! A form collects field values and confirmation checkboxes, and refuses to
//! produce a record until every required field is filled and every
//! confirmation is ticked. Nothing is cleared on failure, so the user can
//! correct the draft and try again.

use std::collections::BTreeMap;
use std::fmt;

use crate::record::{Record, Value};
use crate::schema::{FieldKind, Schema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingFields(Vec<String>),
    UncheckedConfirmations(Vec<String>),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingFields(fields) => write!(
                f,
                "Please fill all fields before saving: {}",
                fields.join(", ")
            ),
            FormError::UncheckedConfirmations(names) => {
                write!(f, "Please confirm: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for FormError {}

#[derive(Debug, Clone, Default)]
pub struct RecordForm {
    required: Vec<String>,
    kinds: BTreeMap<String, FieldKind>,
    confirmations: Vec<(String, bool)>,
    values: Record,
}

impl RecordForm {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Required fields and field kinds taken from the schema.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut form = Self::new(schema.required_fields());
        form.kinds = schema
            .columns()
            .iter()
            .map(|c| (c.field.clone(), c.kind))
            .collect();
        form
    }

    /// Adds an unticked confirmation (e.g. "e-signature").
    pub fn with_confirmation(mut self, name: impl Into<String>) -> Self {
        self.confirmations.push((name.into(), false));
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.values.set(field, value);
    }

    /// Sets a field from user-entered text, typed by the field's declared kind.
    pub fn set_input(&mut self, field: &str, input: &str) {
        let kind = self.kinds.get(field).copied().unwrap_or_default();
        self.values.set(field, Value::from_input(kind, input));
    }

    pub fn get(&self, field: &str) -> &Value {
        self.values.get(field)
    }

    /// Returns false for an unknown confirmation.
    pub fn set_confirmed(&mut self, name: &str, confirmed: bool) -> bool {
        match self.confirmations.iter_mut().find(|(n, _)| n == name) {
            Some((_, value)) => {
                *value = confirmed;
                true
            }
            None => false,
        }
    }

    pub fn values(&self) -> &Record {
        &self.values
    }

    pub fn validate(&self) -> Result<Record, FormError> {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|f| self.values.get(f).is_blank())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        let unchecked: Vec<String> = self
            .confirmations
            .iter()
            .filter(|(_, confirmed)| !confirmed)
            .map(|(name, _)| name.clone())
            .collect();
        if !unchecked.is_empty() {
            return Err(FormError::UncheckedConfirmations(unchecked));
        }

        Ok(self.values.clone())
    }

    /// Clears values and unticks confirmations.
    pub fn reset(&mut self) {
        self.values.clear();
        for (_, confirmed) in &mut self.confirmations {
            *confirmed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    #[test]
    fn test_missing_fields_listed_in_order() {
        let mut form = RecordForm::new(["Product_Name__c", "Quantity__c", "Price__c", "Taxes__c"]);
        form.set("Quantity__c", 2);
        form.set("Price__c", "   ");
        assert_eq!(
            form.validate(),
            Err(FormError::MissingFields(vec![
                "Product_Name__c".into(),
                "Price__c".into(),
                "Taxes__c".into()
            ]))
        );
    }

    #[test]
    fn test_confirmations_required() {
        let mut form = RecordForm::new(["Country__c"])
            .with_confirmation("confirmation")
            .with_confirmation("e-signature");
        form.set("Country__c", "Canada");
        assert_eq!(
            form.validate(),
            Err(FormError::UncheckedConfirmations(vec![
                "confirmation".into(),
                "e-signature".into()
            ]))
        );

        assert!(form.set_confirmed("confirmation", true));
        assert!(form.set_confirmed("e-signature", true));
        assert!(!form.set_confirmed("unknown", true));
        let record = form.validate().unwrap();
        assert_eq!(record.get("Country__c"), &Value::Text("Canada".into()));
    }

    #[test]
    fn test_reset() {
        let mut form = RecordForm::new(["Email"]).with_confirmation("confirmation");
        form.set("Email", "a@b.c");
        form.set_confirmed("confirmation", true);
        form.reset();
        assert!(form.values().is_empty());
        assert!(matches!(
            form.validate(),
            Err(FormError::MissingFields(_))
        ));
    }

    #[test]
    fn test_set_input_uses_schema_kind() {
        let schema = Schema::new()
            .column(Column::number("Quantity__c", "Quantity").required())
            .column(Column::text("Comments", "Comments"));
        let mut form = RecordForm::from_schema(&schema);
        form.set_input("Quantity__c", "3");
        form.set_input("Comments", "42");
        assert_eq!(form.get("Quantity__c"), &Value::Number(3.0));
        assert_eq!(form.get("Comments"), &Value::Text("42".into()));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FormError::MissingFields(vec!["a".into(), "b".into()]).to_string(),
            "Please fill all fields before saving: a, b"
        );
        assert_eq!(
            FormError::UncheckedConfirmations(vec!["e-signature".into()]).to_string(),
            "Please confirm: e-signature"
        );
    }
}

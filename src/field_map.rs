//! Mapping from a domain record to form field values.
//!
//! A field map is JSON configuration that says where each form field's value comes
//! from in a JSON record:
//!
//! ```json
//! { "fields": [ { "field": "Name", "source": "/applicant/full_name" },
//!               { "field": "IsVeteran", "source": "/applicant/veteran", "default": "0" } ] }
//! ```
//!
//! `source` is an RFC 6901 JSON pointer.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;

/// One field binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Fully-qualified form field name
    pub field: String,
    /// JSON pointer into the record
    pub source: String,
    /// Value used when the record has no value at `source`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A list of field bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    /// Bindings in fill order
    pub fields: Vec<FieldMapping>,
}

impl FieldMap {
    /// Parse and validate a field map.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] for malformed JSON, [`Error::FieldMap`] for an empty field name
    /// or a source that is not a JSON pointer.
    pub fn from_json(json: &str) -> Result<Self> {
        let map: FieldMap = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    /// Read and validate a field map.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let map: FieldMap = serde_json::from_reader(reader)?;
        map.validate()?;
        Ok(map)
    }

    fn validate(&self) -> Result<()> {
        for (i, mapping) in self.fields.iter().enumerate() {
            if mapping.field.is_empty() {
                return Err(Error::FieldMap(format!("entry {} has an empty field name", i)));
            }
            if !mapping.source.starts_with('/') {
                return Err(Error::FieldMap(format!(
                    "source {:?} of field '{}' is not a JSON pointer",
                    mapping.source, mapping.field
                )));
            }
        }
        Ok(())
    }

    /// Compute field values for one record.
    ///
    /// Strings are used as-is, numbers as their JSON text, booleans as
    /// `"true"`/`"false"`. A missing or `null` value falls back to the mapping's
    /// default, or leaves the field out.
    ///
    /// # Errors
    ///
    /// [`Error::FieldMap`] if a source points at an array or object.
    ///
    /// ```
    /// # use pdf_acroform::field_map::FieldMap;
    /// let map = FieldMap::from_json(r#"{"fields":[{"field":"Name","source":"/name"}]}"#)?;
    /// let values = map.values_for(&serde_json::json!({"name": "Doe, John E."}))?;
    /// assert_eq!(values["Name"], "Doe, John E.");
    /// # Ok::<(), pdf_acroform::error::Error>(())
    /// ```
    pub fn values_for(&self, record: &Value) -> Result<IndexMap<String, String>> {
        let mut values = IndexMap::new();
        for mapping in &self.fields {
            let value = match record.pointer(&mapping.source) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                Some(Value::Bool(b)) => Some(b.to_string()),
                Some(Value::Null) | None => mapping.default.clone(),
                Some(other) => {
                    let kind = if other.is_array() { "an array" } else { "an object" };
                    return Err(Error::FieldMap(format!(
                        "{} for field '{}' is {}",
                        mapping.source, mapping.field, kind
                    )));
                },
            };
            match value {
                Some(v) => {
                    values.insert(mapping.field.clone(), v);
                },
                None => log::debug!("No value for '{}' at {}", mapping.field, mapping.source),
            }
        }
        Ok(values)
    }
}

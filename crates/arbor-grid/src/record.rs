//! Records and row identity.
//!
//! A [`Record`] is one row of grid data: an ordered field-name to
//! [`FieldValue`] map plus a **row identity**, a stable integer stamped when
//! the record is ingested into a data source. The row identity equals the
//! record's index in the base array at ingestion time and is never
//! recomputed by sorting, filtering, or grouping, so the rendering layer can
//! correlate selection state and row elements back to data across view
//! recomputation. It travels with serialized records under the
//! [`ROW_ID_FIELD`] key.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Field name under which the row identity is serialized.
pub const ROW_ID_FIELD: &str = "_jwRowId";

static NULL_VALUE: FieldValue = FieldValue::Null;

/// One row of grid data: named field values plus a stable row identity.
///
/// # Example
///
/// ```
/// use arbor_grid::Record;
///
/// let record = Record::with_fields([
///     ("name", "Apples".into()),
///     ("stock", 12.into()),
/// ]);
/// assert_eq!(record.field("name").and_then(|v| v.as_str()), Some("Apples"));
/// assert!(record.field("missing").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    row_id: usize,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record with row identity 0.
    ///
    /// The identity is provisional: ingestion via `DataSource::set_data`
    /// re-stamps every record with its base-array index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from `(field, value)` pairs.
    pub fn with_fields<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        Self {
            row_id: 0,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Returns the stable row identity of this record.
    pub fn row_id(&self) -> usize {
        self.row_id
    }

    pub(crate) fn set_row_id(&mut self, row_id: usize) {
        self.row_id = row_id;
    }

    /// Returns the value of the named field, or `None` if absent.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns the value of the named field, treating an absent field as null.
    pub fn field_or_null(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&NULL_VALUE)
    }

    /// Sets the value of the named field, replacing any existing value.
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Iterates over `(field, value)` pairs in field-name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields in this record.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Builds a record from a JSON object.
    ///
    /// Scalar members map to the corresponding [`FieldValue`]; nested arrays
    /// and objects are kept as their JSON text so no data is dropped. A
    /// `_jwRowId` member, if present, becomes the provisional row identity.
    /// Non-object values produce an empty record.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut record = Record::new();
        let Some(object) = value.as_object() else {
            return record;
        };
        for (key, member) in object {
            if key == ROW_ID_FIELD {
                if let Some(id) = member.as_u64() {
                    record.row_id = id as usize;
                }
                continue;
            }
            record.fields.insert(key.clone(), json_to_value(member));
        }
        record
    }
}

fn json_to_value(value: &serde_json::Value) -> FieldValue {
    match value {
        serde_json::Value::Null => FieldValue::Null,
        serde_json::Value::Bool(b) => FieldValue::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Int(i)
            } else {
                FieldValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => FieldValue::String(s.clone()),
        // Nested structure: keep the JSON text rather than dropping the field
        other => FieldValue::String(other.to_string()),
    }
}

/// Builds a record array from a JSON array.
///
/// Row identities are provisional until the array is handed to
/// `DataSource::set_data`, which re-stamps them by index.
pub fn records_from_json(value: &serde_json::Value) -> Vec<Record> {
    match value.as_array() {
        Some(items) => items.iter().map(Record::from_json).collect(),
        None => Vec::new(),
    }
}

impl Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(ROW_ID_FIELD, &self.row_id)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = BTreeMap::<String, FieldValue>::deserialize(deserializer)?;
        let row_id = match fields.remove(ROW_ID_FIELD) {
            Some(FieldValue::Int(id)) if id >= 0 => id as usize,
            _ => 0,
        };
        Ok(Self { row_id, fields })
    }
}

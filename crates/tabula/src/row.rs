use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{Value, ValueType};

/// One record's values projected across a table's columns.
///
/// A row is an ordered label-to-value mapping with a label set that is fixed
/// at construction. Absent labels are distinguishable from present nulls:
/// [`Row::get`] returns `None` for the former and `Some(&Value::Null)` for
/// the latter.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    /// Builds a row from `(label, value)` entries, preserving their order.
    /// Fails with [`Error::AlreadyExists`] on a duplicate label.
    pub fn new(entries: Vec<(String, Value)>) -> Result<Self> {
        crate::validate::ensure_unique_labels(entries.iter().map(|(label, _)| label.as_str()))?;
        Ok(Self { entries })
    }

    /// Internal constructor for entries whose labels are already known to be
    /// unique (e.g. projections of a validated table).
    pub(crate) fn from_entries(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value under `label`, or `None` if the label is absent.
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(entry_label, _)| entry_label == label)
            .map(|(_, value)| value)
    }

    /// Like [`Row::get`] but an absent label is a [`Error::Decode`] failure.
    pub fn require(&self, label: &str) -> Result<&Value> {
        self.get(label)
            .ok_or_else(|| Error::decode(format!("field '{label}' has no matching row label")))
    }

    pub fn require_bool(&self, label: &str) -> Result<bool> {
        match self.require(label)? {
            Value::Bool(v) => Ok(*v),
            other => Err(field_type_error(label, ValueType::Bool, other)),
        }
    }

    pub fn require_i64(&self, label: &str) -> Result<i64> {
        match self.require(label)? {
            Value::Int(v) => Ok(*v),
            other => Err(field_type_error(label, ValueType::Int, other)),
        }
    }

    pub fn require_f64(&self, label: &str) -> Result<f64> {
        match self.require(label)? {
            Value::Float(v) => Ok(v.0),
            other => Err(field_type_error(label, ValueType::Float, other)),
        }
    }

    pub fn require_text(&self, label: &str) -> Result<&str> {
        match self.require(label)? {
            Value::Text(v) => Ok(v),
            other => Err(field_type_error(label, ValueType::Text, other)),
        }
    }

    /// Nullable variant of [`Row::require_i64`]: a present null decodes to
    /// `None`, a wrong type is still a failure.
    pub fn optional_i64(&self, label: &str) -> Result<Option<i64>> {
        match self.require(label)? {
            Value::Null => Ok(None),
            Value::Int(v) => Ok(Some(*v)),
            other => Err(field_type_error(label, ValueType::Int, other)),
        }
    }

    pub fn optional_f64(&self, label: &str) -> Result<Option<f64>> {
        match self.require(label)? {
            Value::Null => Ok(None),
            Value::Float(v) => Ok(Some(v.0)),
            other => Err(field_type_error(label, ValueType::Float, other)),
        }
    }

    pub fn optional_text(&self, label: &str) -> Result<Option<&str>> {
        match self.require(label)? {
            Value::Null => Ok(None),
            Value::Text(v) => Ok(Some(v)),
            other => Err(field_type_error(label, ValueType::Text, other)),
        }
    }

    /// Asserts a strict 1:1 correspondence between this row's labels and
    /// `expected`. [`Mappable::from_row`] implementations call this so that
    /// leftover row labels fail the decode instead of being silently dropped.
    pub fn expect_labels(&self, expected: &[&str]) -> Result<()> {
        for label in expected {
            if self.get(label).is_none() {
                return Err(Error::decode(format!(
                    "field '{label}' has no matching row label"
                )));
            }
        }
        if self.entries.len() != expected.len() {
            for (label, _) in &self.entries {
                if !expected.contains(&label.as_str()) {
                    return Err(Error::decode(format!(
                        "row label '{label}' has no matching target field"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Decodes this row into a record type via its [`Mappable`] capability.
    pub fn decode<T: Mappable>(&self) -> Result<T> {
        T::from_row(self)
    }

    /// Structural copy with no shared sub-objects, round-tripped through the
    /// JSON data model.
    pub fn deep_copy(&self) -> Result<Row> {
        let encoded = serde_json::to_value(self)
            .map_err(|err| Error::decode(format!("row serialization failed: {err}")))?;
        serde_json::from_value(encoded)
            .map_err(|err| Error::decode(format!("row deserialization failed: {err}")))
    }
}

fn field_type_error(label: &str, expected: ValueType, found: &Value) -> Error {
    Error::decode(format!(
        "field '{label}': expected {expected}, found {}",
        found.value_type()
    ))
}

/// Capability for encoding a record type to and from a [`Row`].
///
/// This is the explicit, statically declared counterpart of reflective field
/// inspection: each record type spells out its own bidirectional mapping.
pub trait Mappable: Sized {
    /// Encodes the record as an ordered label-to-value mapping.
    fn to_row(&self) -> Row;

    /// Decodes a record from a row. Implementations must fail with
    /// [`Error::Decode`] unless the row's labels correspond 1:1 to the
    /// record's fields with compatible value types (see
    /// [`Row::expect_labels`]).
    fn from_row(row: &Row) -> Result<Self>;
}

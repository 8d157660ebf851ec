use crate::column::Column;
use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::Value;

/// Builder deriving new columns from one source column's values.
///
/// Derivations accumulate as `(label, mapping)` pairs; [`Splitter::gather`]
/// applies each mapping over the source values and assembles the derived
/// columns into a table.
pub struct Splitter<'a> {
    source: &'a Column,
    derivations: Vec<(String, Box<dyn Fn(&Value) -> Value + 'a>)>,
}

impl<'a> Splitter<'a> {
    pub(crate) fn new(source: &'a Column) -> Self {
        Self {
            source,
            derivations: Vec::new(),
        }
    }

    /// Adds a derived column computed by `mapping` over the source values.
    pub fn derive(mut self, label: impl Into<String>, mapping: impl Fn(&Value) -> Value + 'a) -> Self {
        self.derivations.push((label.into(), Box::new(mapping)));
        self
    }

    /// Assembles the derived columns into a table. With zero derivations the
    /// result wraps the source column itself. Splitting an empty column is an
    /// [`Error::InvalidState`]: there are no elements to infer column types
    /// from downstream.
    pub fn gather(self) -> Result<Table> {
        if self.source.is_empty() {
            return Err(Error::invalid_state(format!(
                "cannot split empty column '{}'",
                self.source.label()
            )));
        }
        if self.derivations.is_empty() {
            return Table::from_columns(vec![self.source.clone()]);
        }
        let mut columns = Vec::with_capacity(self.derivations.len());
        for (label, mapping) in &self.derivations {
            let values = self.source.values().iter().map(mapping).collect();
            columns.push(Column::new(label.clone(), values)?);
        }
        Table::from_columns(columns)
    }
}

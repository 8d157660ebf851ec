use std::collections::HashMap;

use crate::column::{Column, SortOrder};
use crate::error::Result;
use crate::table::Table;
use crate::value::Value;

/// Label of the key column in every grouping result.
pub const VALUE_LABEL: &str = "Value";
/// Label of the count column produced by [`Grouped::count_by`].
pub const COUNT_LABEL: &str = "Count";
/// Label of the aggregate column produced by the folding entry points.
pub const AGGREGATION_LABEL: &str = "ValueAggregation";

/// Grouping/aggregation engine bound to one column.
///
/// Keys use structural equality, and groups appear in the output in
/// first-appearance order. The three entry points differ only in how they
/// treat nulls:
///
/// - [`Grouped::count_by`]: raw nulls and values that map to null merge into
///   one null-keyed group.
/// - [`Grouped::fold_values`]: nulls form their own group whose aggregate is
///   forced to null (the collector is never invoked on it).
/// - [`Grouped::fold_by`]: raw nulls are dropped before grouping.
pub struct Grouped<'a> {
    column: &'a Column,
}

impl<'a> Grouped<'a> {
    pub(crate) fn new(column: &'a Column) -> Self {
        Self { column }
    }

    /// Counts occurrences of each distinct mapped value. The result has a
    /// `Value` column of mapped keys (including a null row when raw nulls or
    /// null-mapped values are present) and a 64-bit `Count` column whose sum
    /// equals the source length.
    pub fn count_by(&self, mapping: impl Fn(&Value) -> Value) -> Result<Table> {
        let mut partitions = Partitions::new();
        for raw in self.column.values() {
            let key = if raw.is_null() {
                Value::Null
            } else {
                mapping(raw)
            };
            partitions.push(key, raw);
        }
        let counts = partitions
            .groups
            .iter()
            .map(|group| Value::from(group.len() as i64))
            .collect();
        Table::from_columns(vec![
            Column::new(VALUE_LABEL, partitions.keys)?,
            Column::new(COUNT_LABEL, counts)?,
        ])
    }

    /// Groups by raw value and folds each group with `collector`. The null
    /// group is kept, but its aggregate is forced to null.
    pub fn fold_values(&self, collector: impl Fn(&[Value]) -> Value) -> Result<Table> {
        let mut partitions = Partitions::new();
        for raw in self.column.values() {
            partitions.push(raw.clone(), raw);
        }
        let aggregates = partitions
            .keys
            .iter()
            .zip(&partitions.groups)
            .map(|(key, group)| {
                if key.is_null() {
                    Value::Null
                } else {
                    collector(group)
                }
            })
            .collect();
        Table::from_columns(vec![
            Column::new(VALUE_LABEL, partitions.keys)?,
            Column::new(AGGREGATION_LABEL, aggregates)?,
        ])
    }

    /// Groups by mapped value after dropping all raw nulls, folding each
    /// group's raw values with `collector`. No null row appears for dropped
    /// values; a non-null value whose mapped key is null still groups under
    /// the null key.
    pub fn fold_by(
        &self,
        mapping: impl Fn(&Value) -> Value,
        collector: impl Fn(&[Value]) -> Value,
    ) -> Result<Table> {
        let mut partitions = Partitions::new();
        for raw in self.column.values() {
            if raw.is_null() {
                continue;
            }
            partitions.push(mapping(raw), raw);
        }
        let aggregates = partitions
            .groups
            .iter()
            .map(|group| collector(group))
            .collect();
        Table::from_columns(vec![
            Column::new(VALUE_LABEL, partitions.keys)?,
            Column::new(AGGREGATION_LABEL, aggregates)?,
        ])
    }

    /// [`Grouped::count_by`] with the identity mapping.
    pub fn value_counts(&self) -> Result<Table> {
        self.count_by(Value::clone)
    }

    /// [`Grouped::value_counts`] sorted by the `Count` column.
    pub fn value_counts_sorted(&self, order: SortOrder) -> Result<Table> {
        self.value_counts()?.sorted(COUNT_LABEL, order)
    }
}

/// Key partitions in first-appearance order, with a hash index for O(1)
/// membership (same pattern as a header index on a data table).
struct Partitions {
    keys: Vec<Value>,
    groups: Vec<Vec<Value>>,
    index: HashMap<Value, usize>,
}

impl Partitions {
    fn new() -> Self {
        Self {
            keys: Vec::new(),
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn push(&mut self, key: Value, raw: &Value) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].push(raw.clone()),
            None => {
                self.index.insert(key.clone(), self.keys.len());
                self.keys.push(key);
                self.groups.push(vec![raw.clone()]);
            }
        }
    }
}

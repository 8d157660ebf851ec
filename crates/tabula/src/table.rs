use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::column::{compare_nulls_first, Column, SortOrder};
use crate::error::{Error, Result};
use crate::row::{Mappable, Row};
use crate::validate;
use crate::value::Value;

/// An ordered set of equal-length, uniquely labeled columns.
///
/// A table with zero columns is *completely empty* (`row_count() == 0`); a
/// table with columns but zero rows is merely *empty*. Every structural
/// operation returns a new table and re-establishes both invariants before
/// returning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableRepr")]
pub struct Table {
    columns: Vec<Column>,
}

/// Wire shape of [`Table`]. Deserialization routes through
/// [`Table::from_columns`] so label uniqueness and uniform length hold for
/// hand-crafted payloads too.
#[derive(Deserialize)]
struct TableRepr {
    columns: Vec<Column>,
}

impl TryFrom<TableRepr> for Table {
    type Error = Error;

    fn try_from(repr: TableRepr) -> Result<Self> {
        Table::from_columns(repr.columns)
    }
}

impl Table {
    /// The completely empty table (zero columns, zero rows).
    pub fn empty() -> Table {
        Table {
            columns: Vec::new(),
        }
    }

    /// Builds a table from columns, validating label uniqueness and uniform
    /// length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Table> {
        validate::ensure_unique_labels(columns.iter().map(Column::label))?;
        validate::ensure_uniform_size(&columns)?;
        Ok(Table { columns })
    }

    /// Builds a table from rows. All rows must share the exact same label
    /// set; columns come out in the label order of the first row.
    pub fn from_rows(rows: Vec<Row>) -> Result<Table> {
        let Some(first) = rows.first() else {
            return Ok(Table::empty());
        };
        let labels: Vec<String> = first.labels().map(str::to_string).collect();
        for (index, row) in rows.iter().enumerate().skip(1) {
            if row.len() != labels.len() || labels.iter().any(|label| row.get(label).is_none()) {
                return Err(Error::invalid_argument(format!(
                    "row {index} does not share the label set of row 0"
                )));
            }
        }

        let mut columns = Vec::with_capacity(labels.len());
        for label in labels {
            let mut values = Vec::with_capacity(rows.len());
            for row in &rows {
                // Present in every row per the check above.
                values.push(row.get(&label).cloned().unwrap_or(Value::Null));
            }
            columns.push(Column::new(label, values)?);
        }
        Table::from_columns(columns)
    }

    /// Builds a table from a column-major 2-D block: `values[c]` holds the
    /// values of the column labeled `labels[c]`.
    pub fn from_column_values(labels: &[&str], values: Vec<Vec<Value>>) -> Result<Table> {
        if labels.len() != values.len() {
            return Err(Error::invalid_argument(format!(
                "{} labels for {} value sequences",
                labels.len(),
                values.len()
            )));
        }
        validate::ensure_rectangular(&values)?;
        let columns = labels
            .iter()
            .zip(values)
            .map(|(label, column_values)| Column::new(*label, column_values))
            .collect::<Result<Vec<_>>>()?;
        Table::from_columns(columns)
    }

    /// Builds a table from a row-major 2-D block: `values[r]` holds one row
    /// in label order.
    pub fn from_row_values(labels: &[&str], values: Vec<Vec<Value>>) -> Result<Table> {
        validate::ensure_rectangular(&values)?;
        if let Some(first) = values.first() {
            if first.len() != labels.len() {
                return Err(Error::invalid_argument(format!(
                    "{} labels for rows of {} values",
                    labels.len(),
                    first.len()
                )));
            }
        }
        let mut columns_values: Vec<Vec<Value>> = labels
            .iter()
            .map(|_| Vec::with_capacity(values.len()))
            .collect();
        for row in values {
            for (slot, value) in columns_values.iter_mut().zip(row) {
                slot.push(value);
            }
        }
        Table::from_column_values(labels, columns_values)
    }

    /// Builds a table by encoding each object into a row via its
    /// [`Mappable`] capability.
    pub fn from_objects<T: Mappable>(objects: &[T]) -> Result<Table> {
        Table::from_rows(objects.iter().map(Mappable::to_row).collect())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, label: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|column| column.label() == label)
            .ok_or_else(|| Error::not_found(label))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::label).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Zero rows (columns may still be present).
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Zero columns, hence zero rows.
    pub fn is_completely_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Row projection at `index`, or `None` past the end.
    pub fn row(&self, index: usize) -> Option<Row> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.row_at(index))
    }

    /// Materialized row snapshot of the whole table.
    pub fn rows(&self) -> Vec<Row> {
        (0..self.row_count()).map(|index| self.row_at(index)).collect()
    }

    fn row_at(&self, index: usize) -> Row {
        Row::from_entries(
            self.columns
                .iter()
                .map(|column| (column.label().to_string(), column.values()[index].clone()))
                .collect(),
        )
    }

    /// One-column projection. Fails with [`Error::NotFound`] for an unknown
    /// label.
    pub fn select(&self, label: &str) -> Result<Table> {
        Table::from_columns(vec![self.column(label)?.clone()])
    }

    /// Multi-column projection in the requested label order.
    pub fn select_columns(&self, labels: &[&str]) -> Result<Table> {
        let columns = labels
            .iter()
            .map(|label| self.column(label).cloned())
            .collect::<Result<Vec<_>>>()?;
        Table::from_columns(columns)
    }

    /// Positional row selection. Indices must be pairwise distinct and in
    /// `[0, row_count())`; violations fail with [`Error::InvalidArgument`].
    pub fn take_rows(&self, indices: &[usize]) -> Result<Table> {
        validate::ensure_row_indices(indices, self.row_count())?;
        Table::from_columns(
            self.columns
                .iter()
                .map(|column| column.take_indices(indices))
                .collect(),
        )
    }

    /// Keeps the rows whose value in `label` satisfies `predicate`. Row
    /// order is preserved (indices are scanned in row order).
    pub fn filter(&self, label: &str, predicate: impl Fn(&Value) -> bool) -> Result<Table> {
        let column = self.column(label)?;
        let indices = matching_indices(column.values(), predicate);
        self.take_rows(&indices)
    }

    /// Like [`Table::filter`], but the predicate runs against an aspect
    /// derived from the raw (possibly null) value.
    pub fn filter_with<K>(
        &self,
        label: &str,
        aspect: impl Fn(&Value) -> K,
        predicate: impl Fn(&K) -> bool,
    ) -> Result<Table> {
        self.filter(label, |value| predicate(&aspect(value)))
    }

    /// Keeps the rows satisfying a whole-row predicate.
    pub fn filter_rows(&self, predicate: impl Fn(&Row) -> bool) -> Result<Table> {
        let rows = self.rows();
        let indices = matching_indices(&rows, predicate);
        self.take_rows(&indices)
    }

    /// Applies the primary row matcher; if it selects zero rows, applies the
    /// fallback matcher instead. One or the other, never a union.
    pub fn filter_rows_or(
        &self,
        primary: impl Fn(&Row) -> bool,
        fallback: impl Fn(&Row) -> bool,
    ) -> Result<Table> {
        let rows = self.rows();
        let indices = matching_indices(&rows, primary);
        if indices.is_empty() {
            let fallback_indices = matching_indices(&rows, fallback);
            return self.take_rows(&fallback_indices);
        }
        self.take_rows(&indices)
    }

    /// Adds a column. A completely empty receiver wraps the column (fill
    /// unused); otherwise the label must be new, and a column shorter than
    /// `row_count()` is padded with `fill`. A longer column is an error, not
    /// truncated.
    pub fn add_column(&self, column: Column, fill: impl Into<Value>) -> Result<Table> {
        if self.is_completely_empty() {
            return Table::from_columns(vec![column]);
        }
        if self.column(column.label()).is_ok() {
            return Err(Error::already_exists(column.label()));
        }
        let row_count = self.row_count();
        if column.len() > row_count {
            return Err(Error::invalid_argument(format!(
                "column '{}' has {} values but the table has {} rows",
                column.label(),
                column.len(),
                row_count
            )));
        }
        let padded = if column.len() < row_count {
            let fill = fill.into();
            column.extend(vec![fill; row_count - column.len()])?
        } else {
            column
        };
        let mut columns = self.columns.clone();
        columns.push(padded);
        Table::from_columns(columns)
    }

    /// Adds columns whose labels are all new and whose sizes match
    /// `row_count()` exactly (no fill).
    pub fn add_columns(&self, new_columns: Vec<Column>) -> Result<Table> {
        if self.is_completely_empty() {
            return Table::from_columns(new_columns);
        }
        let row_count = self.row_count();
        for column in &new_columns {
            if self.column(column.label()).is_ok() {
                return Err(Error::already_exists(column.label()));
            }
            if column.len() != row_count {
                return Err(Error::invalid_argument(format!(
                    "column '{}' has {} values but the table has {} rows",
                    column.label(),
                    column.len(),
                    row_count
                )));
            }
        }
        let mut columns = self.columns.clone();
        columns.extend(new_columns);
        Table::from_columns(columns)
    }

    pub fn drop_column(&self, label: &str) -> Result<Table> {
        self.drop_columns(&[label])
    }

    /// Drops the named columns; dropping every column yields the completely
    /// empty table.
    pub fn drop_columns(&self, labels: &[&str]) -> Result<Table> {
        for label in labels {
            self.column(label)?;
        }
        Table::from_columns(
            self.columns
                .iter()
                .filter(|column| !labels.contains(&column.label()))
                .cloned()
                .collect(),
        )
    }

    /// Vertical concatenation. A completely empty side short-circuits to the
    /// other; otherwise the label *sets* must match (order-independent) and
    /// columns concatenate in the receiver's order.
    pub fn concat(&self, other: &Table) -> Result<Table> {
        if self.is_completely_empty() {
            return Ok(other.clone());
        }
        if other.is_completely_empty() {
            return Ok(self.clone());
        }
        // Label sets must match in both directions; the concat loop below
        // covers receiver labels missing from `other`.
        for label in other.column_names() {
            self.column(label)?;
        }
        let mut columns = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            columns.push(column.concat(other.column(column.label())?)?);
        }
        Table::from_columns(columns)
    }

    /// Appends rows: equivalent to concatenating `from_rows(rows)`.
    pub fn append_rows(&self, rows: Vec<Row>) -> Result<Table> {
        if self.is_completely_empty() {
            return Table::from_rows(rows);
        }
        self.concat(&Table::from_rows(rows)?)
    }

    /// Stable full-table sort by a caller-supplied row comparator.
    pub fn sorted_by(&self, compare: impl Fn(&Row, &Row) -> Ordering) -> Result<Table> {
        let rows = self.rows();
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        indices.sort_by(|&a, &b| compare(&rows[a], &rows[b]));
        self.take_rows(&indices)
    }

    /// Stable sort by one column's natural order. Nulls come first in both
    /// directions.
    pub fn sorted(&self, label: &str, order: SortOrder) -> Result<Table> {
        self.sorted_by_labels(&[label], order)
    }

    /// Stable sort by several columns chained by precedence, each compared
    /// nulls-first in the given direction.
    pub fn sorted_by_labels(&self, labels: &[&str], order: SortOrder) -> Result<Table> {
        let keys = labels
            .iter()
            .map(|label| self.column(label))
            .collect::<Result<Vec<_>>>()?;
        let mut indices: Vec<usize> = (0..self.row_count()).collect();
        indices.sort_by(|&a, &b| {
            for key in &keys {
                let ordering = compare_nulls_first(&key.values()[a], &key.values()[b], order);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
        self.take_rows(&indices)
    }

    /// Adds a column computed from one existing column, which is left intact.
    pub fn derive_from(
        &self,
        label: &str,
        new_label: &str,
        f: impl Fn(&Value) -> Value,
    ) -> Result<Table> {
        let derived = self.column(label)?.map_as(new_label, f)?;
        self.add_columns(vec![derived])
    }

    /// Adds a column computed from two existing columns.
    pub fn derive_from_pair(
        &self,
        label_a: &str,
        label_b: &str,
        new_label: &str,
        f: impl Fn(&Value, &Value) -> Value,
    ) -> Result<Table> {
        let a = self.column(label_a)?;
        let b = self.column(label_b)?;
        let values = a
            .values()
            .iter()
            .zip(b.values())
            .map(|(left, right)| f(left, right))
            .collect();
        self.add_columns(vec![Column::new(new_label, values)?])
    }

    /// Decodes every row into `T` via [`Mappable`] and gathers the results
    /// into a single record column. The decode requires a strict 1:1
    /// correspondence between the table's labels and `T`'s fields.
    pub fn gather_into<T: Mappable>(&self, new_label: &str) -> Result<Table> {
        Table::from_columns(vec![self.gathered_column::<T>(new_label)?])
    }

    /// Restricts to `labels` first, gathers those columns into one record
    /// column, and drops the gathered source columns from the result.
    pub fn gather_into_selected<T: Mappable>(
        &self,
        new_label: &str,
        labels: &[&str],
    ) -> Result<Table> {
        let gathered = self.select_columns(labels)?.gathered_column::<T>(new_label)?;
        let remainder = self.drop_columns(labels)?;
        if remainder.is_completely_empty() {
            return Table::from_columns(vec![gathered]);
        }
        remainder.add_columns(vec![gathered])
    }

    fn gathered_column<T: Mappable>(&self, new_label: &str) -> Result<Column> {
        let mut values = Vec::with_capacity(self.row_count());
        for row in self.rows() {
            let decoded: T = row.decode()?;
            values.push(Value::Record(decoded.to_row()));
        }
        Column::new(new_label, values)
    }

    /// Applies a side-effecting action once per value of the named column.
    /// The column itself is not replaced; values are plain owned data, so
    /// the action observes them without mutating the table.
    pub fn for_each(&self, label: &str, action: impl FnMut(&Value)) -> Result<()> {
        self.column(label)?.for_each(action);
        Ok(())
    }

    /// Whole-table combinator: hands the table to `f` and returns its
    /// result.
    pub fn pipe<T>(self, f: impl FnOnce(Table) -> T) -> T {
        f(self)
    }
}

fn matching_indices<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| predicate(item))
        .map(|(index, _)| index)
        .collect()
}

/// Streaming table construction from a row producer: fix the labels up
/// front, append rows one at a time, validate on finish.
#[derive(Debug)]
pub struct TableBuilder {
    labels: Vec<String>,
    columns: Vec<Vec<Value>>,
}

impl TableBuilder {
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        validate::ensure_unique_labels(labels.iter().map(String::as_str))?;
        let columns = labels.iter().map(|_| Vec::new()).collect();
        Ok(Self { labels, columns })
    }

    /// Appends one row in label order.
    pub fn append_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.labels.len() {
            return Err(Error::invalid_argument(format!(
                "row has {} values but the builder has {} labels",
                row.len(),
                self.labels.len()
            )));
        }
        for (slot, value) in self.columns.iter_mut().zip(row) {
            slot.push(value);
        }
        Ok(())
    }

    pub fn finish(self) -> Result<Table> {
        let columns = self
            .labels
            .into_iter()
            .zip(self.columns)
            .map(|(label, values)| Column::new(label, values))
            .collect::<Result<Vec<_>>>()?;
        Table::from_columns(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn sample_table() -> Table {
        Table::from_column_values(
            &["d", "n"],
            vec![
                vec![Value::from(1), Value::from(2), Value::from(3)],
                vec![Value::from("Alice"), Value::from("Bob"), Value::from("Jose")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn from_columns_rejects_duplicate_labels_and_ragged_sizes() {
        let a = Column::new("a", vec![Value::from(1)]).unwrap();
        let a2 = Column::new("a", vec![Value::from(2)]).unwrap();
        assert_eq!(
            Table::from_columns(vec![a.clone(), a2]).unwrap_err(),
            Error::already_exists("a")
        );

        let b = Column::new("b", vec![Value::from(1), Value::from(2)]).unwrap();
        assert!(matches!(
            Table::from_columns(vec![a, b]),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn deserialization_revalidates_structure() {
        let table = sample_table();
        let json = serde_json::to_string(&table).unwrap();
        let back: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);

        let duplicate_labels = r#"{"columns":[
            {"label":"a","values":[{"type":"int","value":1}],"value_type":"int"},
            {"label":"a","values":[{"type":"int","value":2}],"value_type":"int"}
        ]}"#;
        assert!(serde_json::from_str::<Table>(duplicate_labels).is_err());

        let ragged = r#"{"columns":[
            {"label":"a","values":[{"type":"int","value":1}],"value_type":"int"},
            {"label":"b","values":[],"value_type":"untyped"}
        ]}"#;
        assert!(serde_json::from_str::<Table>(ragged).is_err());
    }

    #[test]
    fn from_rows_requires_matching_label_sets() {
        let rows = vec![
            Row::new(vec![("a".into(), Value::from(1))]).unwrap(),
            Row::new(vec![("b".into(), Value::from(2))]).unwrap(),
        ];
        assert!(matches!(
            Table::from_rows(rows),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(Table::from_rows(Vec::new()).unwrap().is_completely_empty());
    }

    #[test]
    fn from_rows_uses_first_row_label_order() {
        let rows = vec![
            Row::new(vec![
                ("n".into(), Value::from("Alice")),
                ("d".into(), Value::from(1)),
            ])
            .unwrap(),
            Row::new(vec![
                ("d".into(), Value::from(2)),
                ("n".into(), Value::from("Bob")),
            ])
            .unwrap(),
        ];
        let table = Table::from_rows(rows).unwrap();
        assert_eq!(table.column_names(), vec!["n", "d"]);
        assert_eq!(
            table.column("d").unwrap().values(),
            &[Value::from(1), Value::from(2)]
        );
    }

    #[test]
    fn from_column_values_rejects_jagged_blocks() {
        let result = Table::from_column_values(
            &["a", "b"],
            vec![vec![Value::from(1), Value::from(2)], vec![Value::from(3)]],
        );
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn from_row_values_transposes() {
        let table = Table::from_row_values(
            &["a", "b"],
            vec![
                vec![Value::from(1), Value::from("x")],
                vec![Value::from(2), Value::from("y")],
            ],
        )
        .unwrap();
        assert_eq!(
            table.column("a").unwrap().values(),
            &[Value::from(1), Value::from(2)]
        );
        assert_eq!(
            table.column("b").unwrap().values(),
            &[Value::from("x"), Value::from("y")]
        );
    }

    #[test]
    fn empty_vs_completely_empty() {
        let completely_empty = Table::empty();
        assert!(completely_empty.is_completely_empty());
        assert_eq!(completely_empty.row_count(), 0);

        let empty = Table::from_columns(vec![Column::empty("a")]).unwrap();
        assert!(empty.is_empty());
        assert!(!empty.is_completely_empty());
        assert_eq!(empty.column_count(), 1);
    }

    #[test]
    fn select_and_select_columns() {
        let table = sample_table();
        let names = table.select("n").unwrap();
        assert_eq!(names.column_count(), 1);
        assert_eq!(names.row_count(), 3);

        let reordered = table.select_columns(&["n", "d"]).unwrap();
        assert_eq!(reordered.column_names(), vec!["n", "d"]);

        assert_eq!(table.select("missing").unwrap_err(), Error::not_found("missing"));
    }

    #[test]
    fn take_rows_validates_indices() {
        let table = sample_table();
        let picked = table.take_rows(&[2, 0]).unwrap();
        assert_eq!(
            picked.column("n").unwrap().values(),
            &[Value::from("Jose"), Value::from("Alice")]
        );
        assert!(matches!(
            table.take_rows(&[0, 3]),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            table.take_rows(&[1, 1]),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn filter_keeps_row_order() {
        let table = sample_table();
        let kept = table
            .filter("d", |v| v.as_i64().is_some_and(|d| d != 2))
            .unwrap();
        assert_eq!(
            kept.column("n").unwrap().values(),
            &[Value::from("Alice"), Value::from("Jose")]
        );
    }

    #[test]
    fn filter_with_derives_an_aspect_first() {
        let table = sample_table();
        let kept = table
            .filter_with(
                "n",
                |v| v.as_text().map(str::len),
                |len| len.is_some_and(|n| n == 3),
            )
            .unwrap();
        assert_eq!(kept.row_count(), 1);
        assert_eq!(kept.column("n").unwrap().values(), &[Value::from("Bob")]);
    }

    #[test]
    fn filter_rows_or_is_exclusive() {
        let table = sample_table();
        let primary_hits = table
            .filter_rows_or(
                |row| row.get("d").and_then(Value::as_i64) == Some(1),
                |_| true,
            )
            .unwrap();
        assert_eq!(primary_hits.row_count(), 1);

        let fallback = table
            .filter_rows_or(
                |_| false,
                |row| row.get("d").and_then(Value::as_i64) == Some(3),
            )
            .unwrap();
        assert_eq!(fallback.row_count(), 1);
        assert_eq!(
            fallback.column("n").unwrap().values(),
            &[Value::from("Jose")]
        );
    }

    #[test]
    fn add_column_pads_short_and_rejects_long() {
        let table = Table::from_column_values(
            &["x"],
            vec![vec![Value::from(1), Value::from(2), Value::from(3)]],
        )
        .unwrap();

        let y = Column::new("y", vec![Value::from(10), Value::from(20)]).unwrap();
        let padded = table.add_column(y, 0).unwrap();
        assert_eq!(
            padded.column("y").unwrap().values(),
            &[Value::from(10), Value::from(20), Value::from(0)]
        );

        let long = Column::new(
            "z",
            vec![Value::from(1), Value::from(2), Value::from(3), Value::from(4)],
        )
        .unwrap();
        assert!(matches!(
            table.add_column(long, 0),
            Err(Error::InvalidArgument { .. })
        ));

        let dup = Column::new("x", vec![Value::from(9)]).unwrap();
        assert_eq!(table.add_column(dup, 0).unwrap_err(), Error::already_exists("x"));
    }

    #[test]
    fn add_column_to_completely_empty_wraps() {
        let column = Column::new("x", vec![Value::from(1)]).unwrap();
        let table = Table::empty().add_column(column, Value::Null).unwrap();
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn add_columns_requires_exact_sizes() {
        let table = sample_table();
        let exact = Column::new(
            "k",
            vec![Value::from(1), Value::from(2), Value::from(3)],
        )
        .unwrap();
        assert_eq!(table.add_columns(vec![exact]).unwrap().column_count(), 3);

        let short = Column::new("k", vec![Value::from(1)]).unwrap();
        assert!(matches!(
            table.add_columns(vec![short]),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn dropping_all_columns_yields_completely_empty() {
        let table = sample_table();
        let names: Vec<&str> = table.column_names();
        let emptied = table.drop_columns(&names).unwrap();
        assert!(emptied.is_completely_empty());

        assert_eq!(
            table.drop_column("missing").unwrap_err(),
            Error::not_found("missing")
        );
    }

    #[test]
    fn concat_is_identity_on_completely_empty() {
        let table = sample_table();
        assert_eq!(table.concat(&Table::empty()).unwrap(), table);
        assert_eq!(Table::empty().concat(&table).unwrap(), table);
    }

    #[test]
    fn concat_matches_label_sets_order_independent() {
        let table = sample_table();
        let swapped = table.select_columns(&["n", "d"]).unwrap();
        let doubled = table.concat(&swapped).unwrap();
        assert_eq!(doubled.row_count(), 6);
        assert_eq!(doubled.column_names(), vec!["d", "n"]);

        let other = Table::from_column_values(&["d"], vec![vec![Value::from(9)]]).unwrap();
        assert!(matches!(table.concat(&other), Err(Error::NotFound { .. })));
    }

    #[test]
    fn append_rows_goes_through_from_rows() {
        let table = sample_table();
        let appended = table
            .append_rows(vec![Row::new(vec![
                ("d".into(), Value::from(4)),
                ("n".into(), Value::from("Mia")),
            ])
            .unwrap()])
            .unwrap();
        assert_eq!(appended.row_count(), 4);

        let fresh = Table::empty()
            .append_rows(vec![Row::new(vec![("a".into(), Value::from(1))]).unwrap()])
            .unwrap();
        assert_eq!(fresh.column_names(), vec!["a"]);
    }

    #[test]
    fn sorted_descending_by_name() {
        let table = sample_table();
        let sorted = table.sorted("n", SortOrder::Descending).unwrap();
        assert_eq!(
            sorted.row(0).unwrap().get("n"),
            Some(&Value::from("Jose"))
        );
    }

    #[test]
    fn sorted_by_labels_chains_precedence() {
        let table = Table::from_column_values(
            &["a", "b"],
            vec![
                vec![Value::from(1), Value::from(1), Value::from(0)],
                vec![Value::from("y"), Value::from("x"), Value::from("z")],
            ],
        )
        .unwrap();
        let sorted = table.sorted_by_labels(&["a", "b"], SortOrder::Ascending).unwrap();
        assert_eq!(
            sorted.column("b").unwrap().values(),
            &[Value::from("z"), Value::from("x"), Value::from("y")]
        );
    }

    #[test]
    fn sorted_puts_null_rows_first_in_both_directions() {
        let table = Table::from_column_values(
            &["v"],
            vec![vec![Value::from(2), Value::Null, Value::from(1)]],
        )
        .unwrap();
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let sorted = table.sorted("v", order).unwrap();
            assert_eq!(sorted.column("v").unwrap().values()[0], Value::Null);
        }
    }

    #[test]
    fn sorted_by_uses_caller_comparator() {
        let table = sample_table();
        let sorted = table
            .sorted_by(|a, b| {
                let left = a.get("d").and_then(Value::as_i64).unwrap_or(0);
                let right = b.get("d").and_then(Value::as_i64).unwrap_or(0);
                right.cmp(&left)
            })
            .unwrap();
        assert_eq!(
            sorted.column("d").unwrap().values(),
            &[Value::from(3), Value::from(2), Value::from(1)]
        );
    }

    #[test]
    fn derive_from_leaves_source_intact() {
        let table = sample_table();
        let derived = table
            .derive_from("d", "d2", |v| Value::from(v.as_i64().unwrap_or(0) * 2))
            .unwrap();
        assert_eq!(
            derived.column("d2").unwrap().values(),
            &[Value::from(2), Value::from(4), Value::from(6)]
        );
        assert_eq!(derived.column("d").unwrap(), table.column("d").unwrap());
    }

    #[test]
    fn derive_from_pair_zips_two_columns() {
        let table = sample_table();
        let derived = table
            .derive_from_pair("n", "d", "tag", |n, d| {
                Value::from(format!(
                    "{}-{}",
                    n.as_text().unwrap_or(""),
                    d.as_i64().unwrap_or(0)
                ))
            })
            .unwrap();
        assert_eq!(
            derived.column("tag").unwrap().values(),
            &[
                Value::from("Alice-1"),
                Value::from("Bob-2"),
                Value::from("Jose-3")
            ]
        );
    }

    #[test]
    fn for_each_observes_without_mutating() {
        let table = sample_table();
        let mut total = 0i64;
        table
            .for_each("d", |v| total += v.as_i64().unwrap_or(0))
            .unwrap();
        assert_eq!(total, 6);
        assert_eq!(table, sample_table());
    }

    #[test]
    fn builder_accumulates_rows() {
        let mut builder = TableBuilder::new(["a", "b"]).unwrap();
        builder
            .append_row(vec![Value::from(1), Value::from("x")])
            .unwrap();
        builder
            .append_row(vec![Value::from(2), Value::from("y")])
            .unwrap();
        assert!(matches!(
            builder.append_row(vec![Value::from(3)]),
            Err(Error::InvalidArgument { .. })
        ));
        let table = builder.finish().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("a").unwrap().value_type(), ValueType::Int);
    }

    #[test]
    fn builder_rejects_duplicate_labels() {
        assert_eq!(
            TableBuilder::new(["a", "a"]).unwrap_err(),
            Error::already_exists("a")
        );
    }

    #[test]
    fn rows_are_consistent_snapshots() {
        let table = sample_table();
        let rows = table.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get("n"), Some(&Value::from("Bob")));
        assert_eq!(Table::from_rows(rows).unwrap(), table);
    }

    #[test]
    fn pipe_hands_the_table_through() {
        let rows = sample_table().pipe(|t| t.row_count());
        assert_eq!(rows, 3);
    }
}

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::group::Grouped;
use crate::split::Splitter;
use crate::value::{Value, ValueType};

/// Sort direction for column and table ordering.
///
/// Nulls sort first in both directions; only the ordering of non-null values
/// reverses under `Descending`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        };
        f.write_str(name)
    }
}

/// A labeled, homogeneously typed, nullable sequence of values.
///
/// Every non-null value shares one runtime type; the column's
/// [`ValueType`] is the type of the first non-null value, or
/// [`ValueType::Untyped`] when the column is empty or all-null. The
/// constructor validates homogeneity once; every transformation returns a
/// new column and re-establishes the invariant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColumnRepr")]
pub struct Column {
    label: String,
    values: Vec<Value>,
    value_type: ValueType,
}

/// Wire shape of [`Column`]. Deserialization re-runs the homogeneity scan
/// and rejects a payload whose declared type tag disagrees with its values,
/// keeping [`Column::new`] the only way to mint the invariant.
#[derive(Deserialize)]
struct ColumnRepr {
    label: String,
    values: Vec<Value>,
    value_type: ValueType,
}

impl TryFrom<ColumnRepr> for Column {
    type Error = Error;

    fn try_from(repr: ColumnRepr) -> Result<Self> {
        let column = Column::new(repr.label, repr.values)?;
        if repr.value_type != column.value_type {
            return Err(Error::type_mismatch(
                &column.label,
                column.value_type,
                repr.value_type,
            ));
        }
        Ok(column)
    }
}

impl Column {
    /// Builds a column, scanning `values` once to assert homogeneity.
    /// Two distinct non-null runtime types fail with [`Error::TypeMismatch`].
    pub fn new(label: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let label = label.into();
        let value_type = infer_value_type(&label, &values)?;
        Ok(Self {
            label,
            values,
            value_type,
        })
    }

    /// Empty, untyped column.
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: Vec::new(),
            value_type: ValueType::Untyped,
        }
    }

    /// Internal constructor for values taken from an already-validated
    /// column (subsets and permutations stay homogeneous, but removing the
    /// last non-null value must reset the tag to untyped).
    fn from_parts(label: String, values: Vec<Value>) -> Self {
        let value_type = first_concrete_type(&values);
        Self {
            label,
            values,
            value_type,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Runtime type of the column's non-null values.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn has_nulls(&self) -> bool {
        self.values.iter().any(Value::is_null)
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Structural-equality membership test.
    pub fn has(&self, value: &Value) -> bool {
        self.values.contains(value)
    }

    /// Distinct values in first-appearance order (structural equality).
    pub fn distinct(&self) -> Column {
        let mut seen: std::collections::HashSet<&Value> = std::collections::HashSet::new();
        let mut out: Vec<Value> = Vec::new();
        for value in &self.values {
            if seen.insert(value) {
                out.push(value.clone());
            }
        }
        Self::from_parts(self.label.clone(), out)
    }

    /// Same values under a new label.
    pub fn rename_as(&self, label: impl Into<String>) -> Column {
        Column {
            label: label.into(),
            values: self.values.clone(),
            value_type: self.value_type,
        }
    }

    /// Stable filter: keeps values satisfying `predicate`, preserving their
    /// relative order. The predicate sees raw values, nulls included.
    pub fn filter(&self, predicate: impl Fn(&Value) -> bool) -> Column {
        let values = self
            .values
            .iter()
            .filter(|value| predicate(value))
            .cloned()
            .collect();
        Self::from_parts(self.label.clone(), values)
    }

    /// Stable filter through a derived aspect. The aspect is applied to the
    /// raw (possibly null) value; callers handle nulls themselves.
    pub fn filter_with<K>(
        &self,
        aspect: impl Fn(&Value) -> K,
        predicate: impl Fn(&K) -> bool,
    ) -> Column {
        self.filter(|value| predicate(&aspect(value)))
    }

    /// Positional selection. The caller must supply distinct indices in
    /// `[0, len())`; an out-of-range index panics. Bounds and duplicate
    /// validation live at the table layer ([`crate::Table::take_rows`]).
    pub fn take_indices(&self, indices: &[usize]) -> Column {
        let values = indices.iter().map(|&i| self.values[i].clone()).collect();
        Self::from_parts(self.label.clone(), values)
    }

    /// First `min(n, len())` values.
    pub fn head(&self, n: usize) -> Column {
        let take = n.min(self.values.len());
        Self::from_parts(self.label.clone(), self.values[..take].to_vec())
    }

    /// Last `min(n, len())` values, original order preserved.
    pub fn tail(&self, n: usize) -> Column {
        let take = n.min(self.values.len());
        let start = self.values.len() - take;
        Self::from_parts(self.label.clone(), self.values[start..].to_vec())
    }

    /// `min(n, len())` values sampled without replacement, keeping the
    /// original relative order of the chosen positions.
    pub fn sample(&self, n: usize) -> Column {
        let amount = n.min(self.values.len());
        let mut chosen =
            rand::seq::index::sample(&mut rand::thread_rng(), self.values.len(), amount)
                .into_vec();
        chosen.sort_unstable();
        self.take_indices(&chosen)
    }

    /// Stable sort by the natural order of the value type. Nulls come first
    /// in both directions.
    pub fn sorted(&self, order: SortOrder) -> Column {
        let mut values = self.values.clone();
        values.sort_by(|a, b| compare_nulls_first(a, b, order));
        Self::from_parts(self.label.clone(), values)
    }

    /// Stable sort by a caller-supplied total order. No null handling is
    /// injected; the comparator sees raw values.
    pub fn sorted_by(&self, compare: impl Fn(&Value, &Value) -> Ordering) -> Column {
        let mut values = self.values.clone();
        values.sort_by(|a, b| compare(a, b));
        Self::from_parts(self.label.clone(), values)
    }

    /// Appends one value. A receiver with a concrete type rejects non-null
    /// values of a different type with [`Error::TypeMismatch`]; an empty or
    /// all-null receiver takes its type from the first concrete value seen.
    pub fn push(&self, value: impl Into<Value>) -> Result<Column> {
        self.extend(vec![value.into()])
    }

    /// Appends a list of values under the same typing rules as
    /// [`Column::push`].
    pub fn extend(&self, appended: Vec<Value>) -> Result<Column> {
        let mut value_type = self.value_type;
        for value in &appended {
            let found = value.value_type();
            if found == ValueType::Untyped {
                continue;
            }
            if value_type == ValueType::Untyped {
                value_type = found;
            } else if found != value_type {
                return Err(Error::type_mismatch(&self.label, value_type, found));
            }
        }
        let mut values = self.values.clone();
        values.extend(appended);
        Ok(Column {
            label: self.label.clone(),
            values,
            value_type,
        })
    }

    /// Type-checked concatenation of another column's values.
    pub fn concat(&self, other: &Column) -> Result<Column> {
        self.extend(other.values.clone())
    }

    /// Removes null entries, preserving order.
    pub fn drop_nulls(&self) -> Column {
        self.filter(|value| !value.is_null())
    }

    /// Replaces nulls with `fill`. The fill value must be non-null and
    /// type-compatible with the column.
    pub fn fill_nulls(&self, fill: impl Into<Value>) -> Result<Column> {
        let fill = fill.into();
        if fill.is_null() {
            return Err(Error::invalid_argument(format!(
                "fill value for column '{}' must not be null",
                self.label
            )));
        }
        let found = fill.value_type();
        if self.value_type != ValueType::Untyped && found != self.value_type {
            return Err(Error::type_mismatch(&self.label, self.value_type, found));
        }
        let values = self
            .values
            .iter()
            .map(|value| {
                if value.is_null() {
                    fill.clone()
                } else {
                    value.clone()
                }
            })
            .collect();
        Ok(Column::from_parts(self.label.clone(), values))
    }

    /// Maps every value (nulls included; `f` must be null-aware) into a new
    /// column. A mapping that produces two distinct non-null types fails
    /// with [`Error::TypeMismatch`].
    pub fn map(&self, f: impl Fn(&Value) -> Value) -> Result<Column> {
        self.map_as(self.label.clone(), f)
    }

    /// [`Column::map`] under a new label.
    pub fn map_as(&self, label: impl Into<String>, f: impl Fn(&Value) -> Value) -> Result<Column> {
        Column::new(label, self.values.iter().map(f).collect())
    }

    /// Left-fold over the values, in order.
    pub fn fold<A>(&self, init: A, f: impl Fn(A, &Value) -> A) -> A {
        self.values.iter().fold(init, f)
    }

    /// Fold without an identity: `None` on an empty column.
    pub fn reduce(&self, f: impl Fn(Value, &Value) -> Value) -> Option<Value> {
        let mut iter = self.values.iter();
        let first = iter.next()?.clone();
        Some(iter.fold(first, f))
    }

    /// Reducible fold: folds fixed-size batches from `init` and merges the
    /// partial results with `combine`. `fold` and `combine` must agree the
    /// way a reducible-fold contract requires (`combine(a, fold(init, v)) ==
    /// fold(a, v)`), in which case the result equals a plain left fold.
    pub fn fold_with<A: Clone>(
        &self,
        init: A,
        fold: impl Fn(A, &Value) -> A,
        combine: impl Fn(A, A) -> A,
    ) -> A {
        const BATCH: usize = 1024;
        let mut acc = init.clone();
        for batch in self.values.chunks(BATCH) {
            let partial = batch.iter().fold(init.clone(), &fold);
            acc = combine(acc, partial);
        }
        acc
    }

    /// Builder deriving new columns from this column's values.
    pub fn split(&self) -> Splitter<'_> {
        Splitter::new(self)
    }

    /// Grouping/aggregation engine bound to this column.
    pub fn grouped(&self) -> Grouped<'_> {
        Grouped::new(self)
    }

    /// Applies a side-effecting action to every value, in order. Values are
    /// plain owned data, so the action observes them without mutating the
    /// column.
    pub fn for_each(&self, mut action: impl FnMut(&Value)) {
        for value in &self.values {
            action(value);
        }
    }

    /// Whole-column combinator: hands the column to `f` and returns its
    /// result.
    pub fn pipe<T>(self, f: impl FnOnce(Column) -> T) -> T {
        f(self)
    }
}

/// Null-first comparator used by every direction-based sort: nulls are
/// smaller than any concrete value regardless of direction, and only the
/// non-null ordering reverses under `Descending`.
pub(crate) fn compare_nulls_first(a: &Value, b: &Value, order: SortOrder) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => match order {
            SortOrder::Ascending => a.cmp(b),
            SortOrder::Descending => b.cmp(a),
        },
    }
}

fn infer_value_type(label: &str, values: &[Value]) -> Result<ValueType> {
    let mut tag = ValueType::Untyped;
    for value in values {
        let found = value.value_type();
        if found == ValueType::Untyped {
            continue;
        }
        if tag == ValueType::Untyped {
            tag = found;
        } else if found != tag {
            return Err(Error::type_mismatch(label, tag, found));
        }
    }
    Ok(tag)
}

fn first_concrete_type(values: &[Value]) -> ValueType {
    values
        .iter()
        .map(Value::value_type)
        .find(|tag| *tag != ValueType::Untyped)
        .unwrap_or(ValueType::Untyped)
}

//! Pure structural predicates shared by the table and row constructors.
//!
//! Nothing in here mutates; every check either passes or returns a typed
//! error describing the first violation found.

use std::collections::HashSet;

use crate::column::Column;
use crate::error::{Error, Result};
use crate::value::Value;

/// Every label must be unique (set semantics on labels).
pub(crate) fn ensure_unique_labels<'a, I>(labels: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(Error::already_exists(label));
        }
    }
    Ok(())
}

/// All columns must have the same length; returns that length (0 for an empty
/// column set).
pub(crate) fn ensure_uniform_size(columns: &[Column]) -> Result<usize> {
    let Some(first) = columns.first() else {
        return Ok(0);
    };
    let size = first.len();
    for column in &columns[1..] {
        if column.len() != size {
            return Err(Error::invalid_argument(format!(
                "column '{}' has {} values but '{}' has {}",
                column.label(),
                column.len(),
                first.label(),
                size,
            )));
        }
    }
    Ok(size)
}

/// A 2-D value block must be rectangular (no jagged inner sequences).
pub(crate) fn ensure_rectangular(values: &[Vec<Value>]) -> Result<()> {
    let Some(first) = values.first() else {
        return Ok(());
    };
    for (idx, inner) in values.iter().enumerate().skip(1) {
        if inner.len() != first.len() {
            return Err(Error::invalid_argument(format!(
                "jagged input: sequence {idx} has {} values, expected {}",
                inner.len(),
                first.len(),
            )));
        }
    }
    Ok(())
}

/// Row indices must be pairwise distinct and inside `[0, row_count)`.
pub(crate) fn ensure_row_indices(indices: &[usize], row_count: usize) -> Result<()> {
    let mut seen: HashSet<usize> = HashSet::with_capacity(indices.len());
    for &index in indices {
        if index >= row_count {
            return Err(Error::invalid_argument(format!(
                "row index {index} out of range for {row_count} rows"
            )));
        }
        if !seen.insert(index) {
            return Err(Error::invalid_argument(format!(
                "duplicate row index {index}"
            )));
        }
    }
    Ok(())
}

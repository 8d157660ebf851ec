//! `tabula` is an immutable, in-memory columnar table model.
//!
//! The crate is built from three views of the same data:
//! - [`Column`]: a labeled, homogeneously typed, nullable sequence of
//!   [`Value`]s, validated once at construction.
//! - [`Table`]: an ordered set of equal-length, uniquely labeled columns.
//! - [`Row`]: one record's values projected across a table's columns, with a
//!   [`Mappable`] capability for decoding into and out of plain record types.
//!
//! Everything is copy-on-write: operations return new values and never
//! mutate the receiver, so a failed call leaves its inputs untouched and an
//! already-built table is safe to share between readers.
//!
//! IO (CSV/JSON/HTTP loading, printing) is intentionally out of scope; it
//! consumes this crate through [`Table::rows`] / [`Table::columns`] and
//! produces into it through [`TableBuilder`] and the [`Mappable`] decode
//! boundary.

#![forbid(unsafe_code)]

mod column;
mod error;
mod group;
mod row;
mod split;
mod table;
mod validate;
mod value;

pub use column::{Column, SortOrder};
pub use error::{Error, Result};
pub use group::{Grouped, AGGREGATION_LABEL, COUNT_LABEL, VALUE_LABEL};
pub use row::{Mappable, Row};
pub use split::Splitter;
pub use table::{Table, TableBuilder};
pub use value::{Value, ValueType};

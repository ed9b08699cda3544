//! Record transformation
//!
//! Converts one nested patient document into ordered writes against a
//! [`RowWriter`](crate::adapters::database::RowWriter).

pub mod flatten;

pub use flatten::{flatten_record, RowCounts};

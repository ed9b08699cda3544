//! Storage abstraction
//!
//! Backend-neutral traits used by the flattener and the directory driver.

pub mod traits;

pub use traits::{RowWriter, TransactionalStore, WriteScope};

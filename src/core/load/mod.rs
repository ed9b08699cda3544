//! Loading orchestration
//!
//! - [`file`] - read and flatten one input file
//! - [`driver`] - per-file transactions over a whole directory
//! - [`summary`] - run totals and failures

pub mod driver;
pub mod file;
pub mod summary;

pub use driver::{discover_files, DirectoryDriver, LoadOptions};
pub use file::{load_document, load_file, FileReport, SkippedElement};
pub use summary::{FileFailure, LoadSummary, SkippedInput};

//! Domain types for the loader.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`VisitId`], [`DiagnosisId`])
//! - **Visit date parsing** ([`parse_visit_date`])
//! - **Error types** ([`LoaderError`], [`RecordError`], [`StorageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], which uses [`LoaderError`]:
//!
//! ```rust
//! use patient_loader::domain::{RecordError, Result};
//!
//! fn require_code(code: Option<&str>) -> Result<&str> {
//!     code.ok_or_else(|| {
//!         RecordError::MissingField {
//!             entity: "diagnosis",
//!             field: "code",
//!         }
//!         .into()
//!     })
//! }
//! # assert!(require_code(None).is_err());
//! ```

pub mod dates;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use dates::parse_visit_date;
pub use errors::{LoaderError, RecordError, StorageError};
pub use ids::{DiagnosisId, PatientId, VisitId};
pub use result::Result;

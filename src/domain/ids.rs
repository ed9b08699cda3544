//! Domain identifier types
//!
//! Newtype wrappers keep the external patient/visit keys and the generated
//! diagnosis key from being mixed up when rows are written.

use std::fmt;

/// Patient identifier newtype wrapper
///
/// The external key carried by the source document.
///
/// # Examples
///
/// ```
/// use patient_loader::domain::ids::PatientId;
///
/// let id = PatientId::new("P-001");
/// assert_eq!(id.as_str(), "P-001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Visit identifier newtype wrapper
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisitId(String);

impl VisitId {
    /// Creates a new VisitId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the visit ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for VisitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generated diagnosis key
///
/// Only the store hands these out; treatment rows use them as their parent
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagnosisId(i64);

impl DiagnosisId {
    /// Wraps a key produced by the store
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw key
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DiagnosisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

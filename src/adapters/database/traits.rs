//! Storage abstraction traits
//!
//! A [`TransactionalStore`] hands out one [`WriteScope`] per input file. All
//! row writes go through that scope, so there is no ambient connection or
//! cursor: whoever holds the scope decides whether its writes commit.

use crate::domain::ids::{DiagnosisId, PatientId, VisitId};
use crate::domain::Result;
use async_trait::async_trait;

/// One storage mutation per call
///
/// Implementations must use parameterized statements only; names, notes and
/// drug strings may contain arbitrary characters.
#[async_trait]
pub trait RowWriter: Send {
    /// Insert a patient, doing nothing if `id` already exists
    ///
    /// Returns `true` when a new row was created.
    async fn write_patient(&mut self, id: &PatientId, name: &str) -> Result<bool>;

    /// Insert a visit, doing nothing if `id` already exists
    ///
    /// `date` must be `YYYY-MM-DD`; anything else fails with
    /// [`RecordError::InvalidDate`](crate::domain::RecordError::InvalidDate)
    /// before the store is touched. Returns `true` when a new row was created.
    async fn write_visit(&mut self, id: &VisitId, patient_id: &PatientId, date: &str)
        -> Result<bool>;

    /// Insert a diagnosis and return its generated key
    async fn write_diagnosis(
        &mut self,
        visit_id: &VisitId,
        code: &str,
        description: Option<&str>,
    ) -> Result<DiagnosisId>;

    /// Insert a treatment under an existing diagnosis
    async fn write_treatment(
        &mut self,
        diagnosis_id: DiagnosisId,
        drug: &str,
        dose: Option<&str>,
    ) -> Result<()>;

    /// Insert a provider note for a visit
    async fn write_provider_note(
        &mut self,
        visit_id: &VisitId,
        text: Option<&str>,
        author: Option<&str>,
    ) -> Result<()>;
}

/// An open transaction that rows can be written into
///
/// Dropping a scope without calling [`commit`](WriteScope::commit) discards
/// its writes.
#[async_trait]
pub trait WriteScope: RowWriter + Sized {
    /// Make every write of this scope durable
    async fn commit(self) -> Result<()>;

    /// Discard every write of this scope
    async fn rollback(self) -> Result<()>;
}

/// A store that can open transaction scopes
#[async_trait]
pub trait TransactionalStore: Send {
    /// Scope type borrowing the store while a file is in progress
    type Scope<'a>: WriteScope + 'a
    where
        Self: 'a;

    /// Begin a new transaction scope
    async fn begin<'a>(&'a mut self) -> Result<Self::Scope<'a>>;
}

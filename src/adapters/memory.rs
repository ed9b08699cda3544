//! In-memory store
//!
//! Mirrors the relational schema closely enough to stand in for PostgreSQL
//! during dry runs and tests: primary keys with conflict-skip for patients and
//! visits, foreign-key checks on every child row, generated keys that are not
//! reused after a rollback, and all-or-nothing scopes.

use crate::adapters::database::{RowWriter, TransactionalStore, WriteScope};
use crate::domain::ids::{DiagnosisId, PatientId, VisitId};
use crate::domain::{parse_visit_date, Result, StorageError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Row of the `patients` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRow {
    pub patient_id: PatientId,
    pub name: String,
}

/// Row of the `visits` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRow {
    pub visit_id: VisitId,
    pub patient_id: PatientId,
    pub visit_date: NaiveDate,
}

/// Row of the `diagnoses` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisRow {
    pub diagnosis_id: DiagnosisId,
    pub visit_id: VisitId,
    pub code: String,
    pub description: Option<String>,
}

/// Row of the `treatments` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreatmentRow {
    pub id: i64,
    pub diagnosis_id: DiagnosisId,
    pub drug: String,
    pub dose: Option<String>,
}

/// Row of the `provider_notes` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderNoteRow {
    pub id: i64,
    pub visit_id: VisitId,
    pub text: Option<String>,
    pub author: Option<String>,
}

/// Committed contents of all five tables
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub patients: BTreeMap<PatientId, PatientRow>,
    pub visits: BTreeMap<VisitId, VisitRow>,
    pub diagnoses: Vec<DiagnosisRow>,
    pub treatments: Vec<TreatmentRow>,
    pub provider_notes: Vec<ProviderNoteRow>,
}

impl Tables {
    /// Diagnoses recorded for one visit, in insertion order
    pub fn diagnoses_for<'a>(
        &'a self,
        visit_id: &'a VisitId,
    ) -> impl Iterator<Item = &'a DiagnosisRow> {
        self.diagnoses.iter().filter(move |d| &d.visit_id == visit_id)
    }

    /// Treatments recorded for one diagnosis, in insertion order
    pub fn treatments_for(
        &self,
        diagnosis_id: DiagnosisId,
    ) -> impl Iterator<Item = &TreatmentRow> {
        self.treatments
            .iter()
            .filter(move |t| t.diagnosis_id == diagnosis_id)
    }

    /// Total number of rows across all tables
    pub fn row_count(&self) -> usize {
        self.patients.len()
            + self.visits.len()
            + self.diagnoses.len()
            + self.treatments.len()
            + self.provider_notes.len()
    }
}

/// Identity sequences; like database sequences they survive rollbacks
#[derive(Debug, Default)]
struct Sequences {
    diagnoses: i64,
    treatments: i64,
    provider_notes: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

/// Transactional in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Tables,
    sequences: Sequences,
    commits: usize,
    rollbacks: usize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed table contents
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Number of scopes committed so far
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Number of scopes rolled back explicitly
    pub fn rollbacks(&self) -> usize {
        self.rollbacks
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    type Scope<'a>
        = MemoryScope<'a>
    where
        Self: 'a;

    async fn begin<'a>(&'a mut self) -> Result<MemoryScope<'a>> {
        let staged = self.tables.clone();
        Ok(MemoryScope {
            store: self,
            staged,
        })
    }
}

/// Open scope over a [`MemoryStore`]; writes land in a private copy until commit
#[derive(Debug)]
pub struct MemoryScope<'a> {
    store: &'a mut MemoryStore,
    staged: Tables,
}

impl MemoryScope<'_> {
    fn require_visit(&self, visit_id: &VisitId, table: &str) -> Result<()> {
        if self.staged.visits.contains_key(visit_id) {
            Ok(())
        } else {
            Err(StorageError::ForeignKey(format!(
                "{table}.visit_id '{visit_id}' is not present in visits"
            ))
            .into())
        }
    }
}

#[async_trait]
impl RowWriter for MemoryScope<'_> {
    async fn write_patient(&mut self, id: &PatientId, name: &str) -> Result<bool> {
        if self.staged.patients.contains_key(id) {
            return Ok(false);
        }
        self.staged.patients.insert(
            id.clone(),
            PatientRow {
                patient_id: id.clone(),
                name: name.to_string(),
            },
        );
        Ok(true)
    }

    async fn write_visit(
        &mut self,
        id: &VisitId,
        patient_id: &PatientId,
        date: &str,
    ) -> Result<bool> {
        let visit_date = parse_visit_date(date)?;
        if self.staged.visits.contains_key(id) {
            return Ok(false);
        }
        if !self.staged.patients.contains_key(patient_id) {
            return Err(StorageError::ForeignKey(format!(
                "visits.patient_id '{patient_id}' is not present in patients"
            ))
            .into());
        }
        self.staged.visits.insert(
            id.clone(),
            VisitRow {
                visit_id: id.clone(),
                patient_id: patient_id.clone(),
                visit_date,
            },
        );
        Ok(true)
    }

    async fn write_diagnosis(
        &mut self,
        visit_id: &VisitId,
        code: &str,
        description: Option<&str>,
    ) -> Result<DiagnosisId> {
        self.require_visit(visit_id, "diagnoses")?;
        let diagnosis_id = DiagnosisId::new(next(&mut self.store.sequences.diagnoses));
        self.staged.diagnoses.push(DiagnosisRow {
            diagnosis_id,
            visit_id: visit_id.clone(),
            code: code.to_string(),
            description: description.map(str::to_string),
        });
        Ok(diagnosis_id)
    }

    async fn write_treatment(
        &mut self,
        diagnosis_id: DiagnosisId,
        drug: &str,
        dose: Option<&str>,
    ) -> Result<()> {
        if !self
            .staged
            .diagnoses
            .iter()
            .any(|d| d.diagnosis_id == diagnosis_id)
        {
            return Err(StorageError::ForeignKey(format!(
                "treatments.diagnosis_id {diagnosis_id} is not present in diagnoses"
            ))
            .into());
        }
        let id = next(&mut self.store.sequences.treatments);
        self.staged.treatments.push(TreatmentRow {
            id,
            diagnosis_id,
            drug: drug.to_string(),
            dose: dose.map(str::to_string),
        });
        Ok(())
    }

    async fn write_provider_note(
        &mut self,
        visit_id: &VisitId,
        text: Option<&str>,
        author: Option<&str>,
    ) -> Result<()> {
        self.require_visit(visit_id, "provider_notes")?;
        let id = next(&mut self.store.sequences.provider_notes);
        self.staged.provider_notes.push(ProviderNoteRow {
            id,
            visit_id: visit_id.clone(),
            text: text.map(str::to_string),
            author: author.map(str::to_string),
        });
        Ok(())
    }
}

#[async_trait]
impl WriteScope for MemoryScope<'_> {
    async fn commit(self) -> Result<()> {
        self.store.tables = self.staged;
        self.store.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.store.rollbacks += 1;
        Ok(())
    }
}

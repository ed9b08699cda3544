//! Record flattening
//!
//! Walks one nested patient document and turns it into row writes, in this
//! order: the patient; then for each visit the visit row, every diagnosis
//! (each immediately followed by its treatments) and finally the provider
//! note. Source order is preserved at every level.

use crate::adapters::database::RowWriter;
use crate::domain::ids::{PatientId, VisitId};
use crate::domain::{RecordError, Result};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Rows produced by flattening, per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub patients: usize,
    pub visits: usize,
    pub diagnoses: usize,
    pub treatments: usize,
    pub provider_notes: usize,

    /// Patient or visit writes skipped because the key already existed
    pub conflicts_skipped: usize,
}

impl RowCounts {
    /// Add another set of counts to this one
    pub fn merge(&mut self, other: &RowCounts) {
        self.patients += other.patients;
        self.visits += other.visits;
        self.diagnoses += other.diagnoses;
        self.treatments += other.treatments;
        self.provider_notes += other.provider_notes;
        self.conflicts_skipped += other.conflicts_skipped;
    }

    /// Rows actually inserted across all tables
    pub fn total_rows(&self) -> usize {
        self.patients + self.visits + self.diagnoses + self.treatments + self.provider_notes
    }
}

/// Flatten one patient document into `writer`
///
/// # Errors
///
/// Fails with [`RecordError::MissingField`] when a required key is absent,
/// [`RecordError::InvalidField`] when a key has the wrong JSON type, and
/// passes through any error raised by the writer. Nothing is caught here;
/// the caller owns the transaction and decides what to roll back.
///
/// # Examples
///
/// ```
/// use patient_loader::adapters::database::TransactionalStore;
/// use patient_loader::adapters::memory::MemoryStore;
/// use patient_loader::core::transform::flatten_record;
/// use serde_json::json;
///
/// # async fn example() -> patient_loader::domain::Result<()> {
/// let mut store = MemoryStore::new();
/// let mut scope = store.begin().await?;
/// let counts = flatten_record(
///     &mut scope,
///     &json!({"patient_id": "P1", "name": "Alice", "visits": []}),
/// )
/// .await?;
/// assert_eq!(counts.patients, 1);
/// # Ok(())
/// # }
/// ```
pub async fn flatten_record<W>(writer: &mut W, record: &Value) -> Result<RowCounts>
where
    W: RowWriter + ?Sized,
{
    let patient = record.as_object().ok_or(RecordError::InvalidField {
        entity: "record",
        field: "patient",
        expected: "an object",
    })?;

    let mut counts = RowCounts::default();

    let patient_id = PatientId::new(required_text(patient, "patient", "patient_id")?);
    let name = required_text(patient, "patient", "name")?;
    tally(
        &mut counts.patients,
        &mut counts.conflicts_skipped,
        writer.write_patient(&patient_id, &name).await?,
    );

    for visit in optional_array(patient, "patient", "visits")? {
        let visit = element_object(visit, "patient", "visits")?;
        flatten_visit(writer, &patient_id, visit, &mut counts).await?;
    }

    Ok(counts)
}

async fn flatten_visit<W>(
    writer: &mut W,
    patient_id: &PatientId,
    visit: &Map<String, Value>,
    counts: &mut RowCounts,
) -> Result<()>
where
    W: RowWriter + ?Sized,
{
    let visit_id = VisitId::new(required_text(visit, "visit", "visit_id")?);
    let date = required_text(visit, "visit", "date")?;
    tally(
        &mut counts.visits,
        &mut counts.conflicts_skipped,
        writer.write_visit(&visit_id, patient_id, &date).await?,
    );

    for diagnosis in optional_array(visit, "visit", "diagnoses")? {
        let diagnosis = element_object(diagnosis, "visit", "diagnoses")?;
        let code = required_text(diagnosis, "diagnosis", "code")?;
        let description = optional_text(diagnosis, "diagnosis", "description")?;
        let diagnosis_id = writer
            .write_diagnosis(&visit_id, &code, description.as_deref())
            .await?;
        counts.diagnoses += 1;

        for treatment in optional_array(diagnosis, "diagnosis", "treatments")? {
            let treatment = element_object(treatment, "diagnosis", "treatments")?;
            let drug = required_text(treatment, "treatment", "drug")?;
            let dose = optional_text(treatment, "treatment", "dose")?;
            writer
                .write_treatment(diagnosis_id, &drug, dose.as_deref())
                .await?;
            counts.treatments += 1;
        }
    }

    if let Some(notes) = provider_notes(visit)? {
        let text = optional_text(notes, "provider_notes", "text")?;
        let author = optional_text(notes, "provider_notes", "author")?;
        writer
            .write_provider_note(&visit_id, text.as_deref(), author.as_deref())
            .await?;
        counts.provider_notes += 1;
    }

    Ok(())
}

fn tally(inserted: &mut usize, skipped: &mut usize, was_inserted: bool) {
    if was_inserted {
        *inserted += 1;
    } else {
        *skipped += 1;
    }
}

/// Coerce a scalar to text; `null` yields `None`
fn text_value<'v>(
    value: &'v Value,
    entity: &'static str,
    field: &'static str,
) -> Result<Option<Cow<'v, str>>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(Cow::Borrowed(s.as_str()))),
        Value::Number(n) => Ok(Some(Cow::Owned(n.to_string()))),
        Value::Bool(b) => Ok(Some(Cow::Owned(b.to_string()))),
        Value::Array(_) | Value::Object(_) => Err(RecordError::InvalidField {
            entity,
            field,
            expected: "a string",
        }
        .into()),
    }
}

fn required_text<'v>(
    object: &'v Map<String, Value>,
    entity: &'static str,
    field: &'static str,
) -> Result<Cow<'v, str>> {
    let value = object
        .get(field)
        .ok_or(RecordError::MissingField { entity, field })?;
    text_value(value, entity, field)?.ok_or_else(|| RecordError::MissingField { entity, field }.into())
}

fn optional_text<'v>(
    object: &'v Map<String, Value>,
    entity: &'static str,
    field: &'static str,
) -> Result<Option<Cow<'v, str>>> {
    match object.get(field) {
        Some(value) => text_value(value, entity, field),
        None => Ok(None),
    }
}

/// Absent and `null` both mean "no children"
fn optional_array<'v>(
    object: &'v Map<String, Value>,
    entity: &'static str,
    field: &'static str,
) -> Result<&'v [Value]> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(RecordError::InvalidField {
            entity,
            field,
            expected: "an array",
        }
        .into()),
    }
}

fn element_object<'v>(
    value: &'v Value,
    entity: &'static str,
    field: &'static str,
) -> Result<&'v Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        RecordError::InvalidField {
            entity,
            field,
            expected: "an array of objects",
        }
        .into()
    })
}

/// An empty notes object is treated the same as no notes at all
fn provider_notes(visit: &Map<String, Value>) -> Result<Option<&Map<String, Value>>> {
    match visit.get("provider_notes") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(notes)) if notes.is_empty() => Ok(None),
        Some(Value::Object(notes)) => Ok(Some(notes)),
        Some(_) => Err(RecordError::InvalidField {
            entity: "visit",
            field: "provider_notes",
            expected: "an object",
        }
        .into()),
    }
}

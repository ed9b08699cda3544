//! Single-file loading
//!
//! Reads one input file and feeds every patient record it holds to the
//! flattener. Transaction boundaries belong to the caller.

use crate::adapters::database::RowWriter;
use crate::core::transform::{flatten_record, RowCounts};
use crate::domain::{LoaderError, RecordError, Result};
use serde_json::Value;
use std::path::Path;

/// A top-level array element that was not a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedElement {
    pub index: usize,
    pub kind: &'static str,
}

/// Outcome of loading one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    /// Patient records flattened
    pub records: usize,
    pub skipped_elements: Vec<SkippedElement>,
    pub rows: RowCounts,
}

/// Read, parse and flatten the file at `path`
///
/// # Errors
///
/// [`LoaderError::Io`] if the file cannot be read as UTF-8,
/// [`RecordError::Parse`] for malformed JSON, and anything
/// [`load_document`] returns.
pub async fn load_file<W>(writer: &mut W, path: &Path) -> Result<FileReport>
where
    W: RowWriter + ?Sized,
{
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoaderError::Io(format!("Failed to read {}: {e}", path.display())))?;

    let document: Value = serde_json::from_str(&content)?;
    load_document(writer, &path.display().to_string(), &document).await
}

/// Flatten an already-parsed document
///
/// An object is one record. An array is a sequence of records; elements that
/// are not objects are skipped and reported. `label` names the document in
/// error messages.
pub async fn load_document<W>(writer: &mut W, label: &str, document: &Value) -> Result<FileReport>
where
    W: RowWriter + ?Sized,
{
    let mut report = FileReport::default();

    match document {
        Value::Object(_) => {
            let rows = flatten_record(writer, document).await?;
            report.records = 1;
            report.rows = rows;
        }
        Value::Array(elements) => {
            for (index, element) in elements.iter().enumerate() {
                if !element.is_object() {
                    let kind = json_kind(element);
                    tracing::debug!(file = %label, index, kind, "Skipping non-object array element");
                    report.skipped_elements.push(SkippedElement { index, kind });
                    continue;
                }
                let rows = flatten_record(writer, element).await?;
                report.records += 1;
                report.rows.merge(&rows);
            }
        }
        _ => {
            return Err(RecordError::UnsupportedShape {
                file: label.to_string(),
            }
            .into())
        }
    }

    Ok(report)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

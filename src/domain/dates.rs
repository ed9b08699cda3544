//! Visit date parsing

use super::errors::RecordError;
use chrono::NaiveDate;

/// Format of visit dates in source documents
pub const VISIT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` visit date into a calendar date
///
/// # Errors
///
/// Returns [`RecordError::InvalidDate`] when the text is not a valid date in
/// that format (including impossible dates such as `2023-02-30`).
pub fn parse_visit_date(value: &str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(value, VISIT_DATE_FORMAT).map_err(|_| RecordError::InvalidDate {
        value: value.to_string(),
    })
}

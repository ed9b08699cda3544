//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting the result of a
//! directory run.

use crate::core::transform::RowCounts;
use std::fmt;
use std::time::Duration;

/// A file whose transaction was rolled back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// File name as printed on the progress line
    pub file: String,

    /// Rendered error
    pub message: String,
}

/// Input that was ignored without failing anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkippedInput {
    /// A directory entry that is not a `.json` regular file
    Entry { name: String },

    /// A non-object element of a top-level array
    Element {
        file: String,
        index: usize,
        kind: &'static str,
    },
}

impl fmt::Display for SkippedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkippedInput::Entry { name } => write!(f, "Skipped entry: {name}"),
            SkippedInput::Element { file, index, kind } => {
                write!(f, "Skipped element {index} of {file}: {kind} is not a record")
            }
        }
    }
}

/// Summary of a load run
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Candidate `.json` files found
    pub files_seen: usize,

    /// Files committed
    pub files_loaded: usize,

    /// Files rolled back
    pub files_failed: usize,

    /// One entry per rolled-back file, in processing order
    pub failures: Vec<FileFailure>,

    /// Ignored directory entries and array elements
    pub skipped: Vec<SkippedInput>,

    /// Patient records flattened from committed files
    pub records_loaded: usize,

    /// Rows written by committed files
    pub rows: RowCounts,

    /// Wall-clock time of the run
    pub duration: Duration,

    /// Whether the run targeted the in-memory store
    pub dry_run: bool,
}

impl LoadSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a committed file
    pub fn add_loaded(&mut self, records: usize, rows: &RowCounts) {
        self.files_loaded += 1;
        self.records_loaded += records;
        self.rows.merge(rows);
    }

    /// Record a rolled-back file
    pub fn add_failure(&mut self, file: impl Into<String>, message: impl Into<String>) {
        self.files_failed += 1;
        self.failures.push(FileFailure {
            file: file.into(),
            message: message.into(),
        });
    }

    /// Number of skipped directory entries
    pub fn skipped_entries(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| matches!(s, SkippedInput::Entry { .. }))
            .count()
    }

    /// Number of skipped array elements
    pub fn skipped_elements(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| matches!(s, SkippedInput::Element { .. }))
            .count()
    }

    /// Check if every candidate file was committed
    pub fn is_successful(&self) -> bool {
        self.files_failed == 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.files_seen == 0 {
            return 100.0;
        }
        (self.files_loaded as f64 / self.files_seen as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            files_seen = self.files_seen,
            files_loaded = self.files_loaded,
            files_failed = self.files_failed,
            records = self.records_loaded,
            rows = self.rows.total_rows(),
            conflicts_skipped = self.rows.conflicts_skipped,
            skipped_entries = self.skipped_entries(),
            skipped_elements = self.skipped_elements(),
            duration_ms = self.duration.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            dry_run = self.dry_run,
            "Load completed"
        );

        if !self.failures.is_empty() {
            tracing::warn!(
                failed = self.failures.len(),
                "Load completed with failed files"
            );
        }
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.dry_run { " (dry run)" } else { "" };
        writeln!(f, "Load summary{mode}")?;
        writeln!(
            f,
            "  Files: {} seen, {} loaded, {} failed",
            self.files_seen, self.files_loaded, self.files_failed
        )?;
        writeln!(f, "  Records: {}", self.records_loaded)?;
        writeln!(
            f,
            "  Rows: {} patients, {} visits, {} diagnoses, {} treatments, {} provider notes",
            self.rows.patients,
            self.rows.visits,
            self.rows.diagnoses,
            self.rows.treatments,
            self.rows.provider_notes
        )?;
        writeln!(
            f,
            "  Existing patients/visits kept: {}",
            self.rows.conflicts_skipped
        )?;
        writeln!(
            f,
            "  Skipped: {} entries, {} array elements",
            self.skipped_entries(),
            self.skipped_elements()
        )?;
        write!(f, "  Duration: {:.2}s", self.duration.as_secs_f64())
    }
}

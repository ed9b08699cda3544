//! Directory driver - runs every input file in its own transaction
//!
//! Files are processed one at a time in file-name order. A file either
//! commits completely or leaves nothing behind; its failure is reported and
//! the run moves on to the next file.

use crate::adapters::database::{TransactionalStore, WriteScope};
use crate::core::load::file::{load_file, FileReport};
use crate::core::load::summary::{LoadSummary, SkippedInput};
use crate::domain::{LoaderError, Result};
use crate::{log_entry_skipped, log_file_failed, log_file_loaded};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Knobs for a directory run
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Print skipped entries and array elements alongside the progress lines
    pub verbose: bool,

    /// Marks the summary as produced by a dry run
    pub dry_run: bool,
}

/// Result of scanning the input directory
#[derive(Debug, Default)]
pub struct Discovery {
    /// Candidate files, sorted by file name
    pub files: Vec<PathBuf>,

    /// Names of entries that are not `.json` regular files
    pub skipped: Vec<String>,
}

/// Drives a [`TransactionalStore`] over a directory of JSON files
///
/// Progress lines (`Loaded file: ...`, `ERROR loading ...`) go to `out`.
pub struct DirectoryDriver<S, O> {
    store: S,
    options: LoadOptions,
    out: O,
}

impl<S, O> DirectoryDriver<S, O>
where
    S: TransactionalStore,
    O: Write,
{
    pub fn new(store: S, options: LoadOptions, out: O) -> Self {
        Self {
            store,
            options,
            out,
        }
    }

    /// Load every candidate file under `input_dir`
    ///
    /// # Errors
    ///
    /// Only errors that make further progress impossible are returned: the
    /// directory cannot be listed, the progress output cannot be written, or
    /// the database connection is lost. Everything else is reported per file
    /// and counted in the summary.
    pub async fn run(&mut self, input_dir: &Path) -> Result<LoadSummary> {
        let start_time = Instant::now();
        let mut summary = LoadSummary::new();
        summary.dry_run = self.options.dry_run;

        tracing::info!(input_dir = %input_dir.display(), "Starting load");

        let discovery = discover_files(input_dir).await?;
        for name in discovery.skipped {
            log_entry_skipped!(name, "not a .json regular file");
            self.record_skip(&mut summary, SkippedInput::Entry { name })?;
        }

        summary.files_seen = discovery.files.len();
        tracing::info!(files = summary.files_seen, "Discovered input files");

        for path in &discovery.files {
            self.process_file(path, &mut summary).await?;
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Give the store back, e.g. to close the connection
    pub fn into_store(self) -> S {
        self.store
    }

    async fn process_file(&mut self, path: &Path, summary: &mut LoadSummary) -> Result<()> {
        let name = file_name(path);

        match load_in_transaction(&mut self.store, path).await {
            Ok(report) => {
                writeln!(self.out, "Loaded file: {name}")?;
                log_file_loaded!(name, report.records);
                summary.add_loaded(report.records, &report.rows);

                for element in report.skipped_elements {
                    log_entry_skipped!(
                        format!("{name}[{}]", element.index),
                        format!("array element is a {}", element.kind)
                    );
                    self.record_skip(
                        summary,
                        SkippedInput::Element {
                            file: name.clone(),
                            index: element.index,
                            kind: element.kind,
                        },
                    )?;
                }
                Ok(())
            }
            Err(err) => {
                writeln!(self.out, "ERROR loading {name}: {err}")?;
                log_file_failed!(name, err);
                summary.add_failure(name, err.to_string());

                if err.is_fatal() {
                    return Err(err);
                }
                Ok(())
            }
        }
    }

    fn record_skip(&mut self, summary: &mut LoadSummary, skipped: SkippedInput) -> Result<()> {
        if self.options.verbose {
            writeln!(self.out, "{skipped}")?;
        }
        summary.skipped.push(skipped);
        Ok(())
    }
}

/// Run one file inside a fresh scope; commit on success, roll back otherwise
async fn load_in_transaction<S>(store: &mut S, path: &Path) -> Result<FileReport>
where
    S: TransactionalStore,
{
    let mut scope = store.begin().await?;

    match load_file(&mut scope, path).await {
        Ok(report) => {
            scope.commit().await?;
            Ok(report)
        }
        Err(err) => {
            if let Err(rollback_err) = scope.rollback().await {
                tracing::warn!(
                    file = %path.display(),
                    error = %rollback_err,
                    "Rollback failed"
                );
            }
            Err(err)
        }
    }
}

/// List `input_dir`, separating `.json` regular files from everything else
///
/// Symlinks are followed. Both lists are sorted by file name.
pub async fn discover_files(input_dir: &Path) -> Result<Discovery> {
    let mut entries = tokio::fs::read_dir(input_dir).await.map_err(|e| {
        LoaderError::Io(format!(
            "Failed to read input directory {}: {e}",
            input_dir.display()
        ))
    })?;

    let mut discovery = Discovery::default();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);

        if is_file && has_json_extension(&path) {
            discovery.files.push(path);
        } else {
            discovery.skipped.push(file_name(&path));
        }
    }

    discovery.files.sort_by_key(|p| p.file_name().map(|n| n.to_owned()));
    discovery.skipped.sort();
    Ok(discovery)
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

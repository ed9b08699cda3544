//! Logging and observability
//!
//! Structured logging through `tracing`, with an optional JSON file layer.
//!
//! # Example
//!
//! ```no_run
//! use patient_loader::logging::init_logging;
//! use patient_loader::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

// The macros pin their target so the default `patient_loader=<level>` filter
// keeps their events wherever they are expanded.

/// Log a committed input file
///
/// # Example
///
/// ```no_run
/// use patient_loader::log_file_loaded;
///
/// log_file_loaded!("patients.json", 3);
/// ```
#[macro_export]
macro_rules! log_file_loaded {
    ($file:expr, $records:expr) => {
        tracing::info!(target: "patient_loader::load", file = %$file, records = $records, "File loaded");
    };
}

/// Log an input file whose transaction was rolled back
///
/// # Example
///
/// ```no_run
/// use patient_loader::log_file_failed;
/// use patient_loader::domain::LoaderError;
///
/// let error = LoaderError::Other("boom".to_string());
/// log_file_failed!("broken.json", &error);
/// ```
#[macro_export]
macro_rules! log_file_failed {
    ($file:expr, $error:expr) => {
        tracing::error!(target: "patient_loader::load", file = %$file, error = %$error, "File rolled back");
    };
}

/// Log input that was silently ignored
///
/// # Example
///
/// ```no_run
/// use patient_loader::log_entry_skipped;
///
/// log_entry_skipped!("notes.txt", "not a .json file");
/// ```
#[macro_export]
macro_rules! log_entry_skipped {
    ($entry:expr, $reason:expr) => {
        tracing::debug!(target: "patient_loader::load", entry = %$entry, reason = %$reason, "Input skipped");
    };
}

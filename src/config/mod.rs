//! Configuration management.
//!
//! Settings come from three layers, each overriding the one before:
//!
//! 1. An optional TOML file (with `${VAR_NAME}` environment substitution)
//! 2. `PATIENT_LOADER_<SECTION>_<KEY>` environment variables
//! 3. Command-line flags of the `load` command
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [database]
//! dbname = "healthdb"
//! user = "etl_loader"
//! password = "${PATIENT_LOADER_DB_PASSWORD}"
//! host = "localhost"
//! port = 5432
//!
//! [load]
//! input_dir = "./data"
//! verbose = false
//! ```
//!
//! # Sections
//!
//! - [`ApplicationConfig`] - log level
//! - [`DatabaseConfig`] - PostgreSQL connection parameters
//! - [`LoadConfig`] - input directory, verbose and dry-run switches
//! - [`LoggingConfig`] - optional JSON file logging

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, read_config, read_config_or_default};
pub use schema::{
    ApplicationConfig, DatabaseConfig, LoadConfig, LoaderConfig, LoggingConfig, SslMode,
};
pub use secret::{secret_string, SecretString, SecretValue};

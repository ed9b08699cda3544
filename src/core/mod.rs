//! Core loading logic.
//!
//! # Modules
//!
//! - [`transform`] - Flattening one patient document into table rows
//! - [`load`] - File loading, the directory driver and the run summary
//!
//! # Load Workflow
//!
//! 1. **Discover**: List the input directory and sort the `.json` files
//! 2. **Begin**: Open one transaction per file
//! 3. **Flatten**: Write patient, visits, diagnoses, treatments and notes
//! 4. **Commit or roll back**: A file is loaded completely or not at all
//! 5. **Report**: Print per-file lines and the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use patient_loader::adapters::postgresql::PostgresStore;
//! use patient_loader::config::load_config;
//! use patient_loader::core::load::{DirectoryDriver, LoadOptions};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("patient-loader.toml")?;
//! let store = PostgresStore::connect(&config.database).await?;
//!
//! let mut driver = DirectoryDriver::new(store, LoadOptions::default(), std::io::stdout());
//! let summary = driver.run(Path::new("./data")).await?;
//! driver.into_store().close().await?;
//!
//! println!("Loaded: {}", summary.files_loaded);
//! println!("Failed: {}", summary.files_failed);
//! # Ok(())
//! # }
//! ```

pub mod load;
pub mod transform;

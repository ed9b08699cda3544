//! # Patient Loader - JSON patient records to PostgreSQL
//!
//! Reads every `.json` file in a directory, flattens the nested patient
//! documents it holds (patient → visits → diagnoses → treatments, plus one
//! provider note per visit) and writes them into five relational tables.
//!
//! ## Overview
//!
//! - Each file is loaded in its own transaction: it commits completely or
//!   leaves nothing behind.
//! - Patients and visits that already exist are kept as they are; diagnoses,
//!   treatments and notes are always inserted.
//! - A broken file is reported (`ERROR loading <file>: <reason>`) and the run
//!   continues with the next one.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Flattening, per-file loading and the directory driver
//! - [`adapters`] - PostgreSQL and in-memory stores behind common traits
//! - [`domain`] - Identifiers, dates and the error hierarchy
//! - [`config`] - TOML configuration with environment overrides
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use patient_loader::adapters::memory::MemoryStore;
//! use patient_loader::core::load::{DirectoryDriver, LoadOptions};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut driver = DirectoryDriver::new(
//!         MemoryStore::new(),
//!         LoadOptions::default(),
//!         std::io::stdout(),
//!     );
//!     let summary = driver.run(Path::new("./data")).await?;
//!
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type is
//! [`domain::LoaderError`]. Only [`domain::LoaderError::Connection`] stops a
//! run; every other error is confined to the file that raised it.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;

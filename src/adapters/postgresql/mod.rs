//! PostgreSQL integration
//!
//! Writes flattened patient records into the `patients`, `visits`,
//! `diagnoses`, `treatments` and `provider_notes` tables.

pub mod adapter;
pub mod client;

pub use adapter::PostgresScope;
pub use client::PostgresStore;

//! Storage integrations.
//!
//! - [`database`] - backend-neutral traits ([`RowWriter`](database::RowWriter),
//!   [`WriteScope`](database::WriteScope),
//!   [`TransactionalStore`](database::TransactionalStore))
//! - [`postgresql`] - the production PostgreSQL store
//! - [`memory`] - an in-memory store used for dry runs and tests
//!
//! # Example
//!
//! ```rust,no_run
//! use patient_loader::adapters::database::{RowWriter, TransactionalStore, WriteScope};
//! use patient_loader::adapters::postgresql::PostgresStore;
//! use patient_loader::config::DatabaseConfig;
//! use patient_loader::domain::PatientId;
//!
//! # async fn example(config: DatabaseConfig) -> patient_loader::domain::Result<()> {
//! let mut store = PostgresStore::connect(&config).await?;
//! let mut scope = store.begin().await?;
//! scope.write_patient(&PatientId::new("P1"), "Alice").await?;
//! scope.commit().await?;
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;

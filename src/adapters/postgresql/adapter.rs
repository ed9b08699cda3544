//! PostgreSQL adapter implementing the storage traits
//!
//! Each input file runs inside one [`PostgresScope`], a thin wrapper around a
//! tokio-postgres transaction. Every statement is parameterized.

use crate::adapters::database::{RowWriter, TransactionalStore, WriteScope};
use crate::adapters::postgresql::client::PostgresStore;
use crate::domain::ids::{DiagnosisId, PatientId, VisitId};
use crate::domain::{parse_visit_date, LoaderError, Result, StorageError};
use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use tokio_postgres::Transaction;

const INSERT_PATIENT: &str = r#"
    INSERT INTO patients (patient_id, name)
    VALUES ($1, $2)
    ON CONFLICT (patient_id) DO NOTHING
"#;

const INSERT_VISIT: &str = r#"
    INSERT INTO visits (visit_id, patient_id, visit_date)
    VALUES ($1, $2, $3)
    ON CONFLICT (visit_id) DO NOTHING
"#;

// Cast so the key decodes as i64 whether the column is SERIAL or BIGSERIAL.
const INSERT_DIAGNOSIS: &str = r#"
    INSERT INTO diagnoses (visit_id, code, description)
    VALUES ($1, $2, $3)
    RETURNING diagnosis_id::BIGINT
"#;

const INSERT_TREATMENT: &str = r#"
    INSERT INTO treatments (diagnosis_id, drug, dose)
    VALUES ($1::BIGINT, $2, $3)
"#;

const INSERT_PROVIDER_NOTE: &str = r#"
    INSERT INTO provider_notes (visit_id, text, author)
    VALUES ($1, $2, $3)
"#;

#[async_trait]
impl TransactionalStore for PostgresStore {
    type Scope<'a>
        = PostgresScope<'a>
    where
        Self: 'a;

    async fn begin<'a>(&'a mut self) -> Result<PostgresScope<'a>> {
        let tx = self
            .client_mut()
            .transaction()
            .await
            .map_err(|e| transaction_error("Failed to begin transaction", e))?;
        Ok(PostgresScope { tx })
    }
}

/// Open PostgreSQL transaction for one input file
///
/// Dropping the scope without committing rolls the transaction back.
pub struct PostgresScope<'a> {
    tx: Transaction<'a>,
}

#[async_trait]
impl RowWriter for PostgresScope<'_> {
    async fn write_patient(&mut self, id: &PatientId, name: &str) -> Result<bool> {
        let inserted = self
            .tx
            .execute(INSERT_PATIENT, &[&id.as_str(), &name])
            .await
            .map_err(map_pg_error)?;
        Ok(inserted > 0)
    }

    async fn write_visit(
        &mut self,
        id: &VisitId,
        patient_id: &PatientId,
        date: &str,
    ) -> Result<bool> {
        let visit_date = parse_visit_date(date)?;
        let inserted = self
            .tx
            .execute(
                INSERT_VISIT,
                &[&id.as_str(), &patient_id.as_str(), &visit_date],
            )
            .await
            .map_err(map_pg_error)?;
        Ok(inserted > 0)
    }

    async fn write_diagnosis(
        &mut self,
        visit_id: &VisitId,
        code: &str,
        description: Option<&str>,
    ) -> Result<DiagnosisId> {
        let row = self
            .tx
            .query_one(INSERT_DIAGNOSIS, &[&visit_id.as_str(), &code, &description])
            .await
            .map_err(map_pg_error)?;
        let id: i64 = row.try_get(0).map_err(|e| {
            StorageError::QueryFailed(format!("Failed to read generated diagnosis_id: {e}"))
        })?;
        Ok(DiagnosisId::new(id))
    }

    async fn write_treatment(
        &mut self,
        diagnosis_id: DiagnosisId,
        drug: &str,
        dose: Option<&str>,
    ) -> Result<()> {
        self.tx
            .execute(INSERT_TREATMENT, &[&diagnosis_id.get(), &drug, &dose])
            .await
            .map_err(map_pg_error)?;
        Ok(())
    }

    async fn write_provider_note(
        &mut self,
        visit_id: &VisitId,
        text: Option<&str>,
        author: Option<&str>,
    ) -> Result<()> {
        self.tx
            .execute(INSERT_PROVIDER_NOTE, &[&visit_id.as_str(), &text, &author])
            .await
            .map_err(map_pg_error)?;
        Ok(())
    }
}

#[async_trait]
impl WriteScope for PostgresScope<'_> {
    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| transaction_error("Commit failed", e))
    }

    async fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| transaction_error("Rollback failed", e))
    }
}

/// A closed socket or a server-side session kill ends the run
fn is_connection_lost(err: &tokio_postgres::Error) -> bool {
    err.is_closed() || err.code().is_some_and(|code| is_connection_failure(code.code()))
}

/// SQLSTATE class 08 plus the operator-intervention codes that end a session
fn is_connection_failure(sqlstate: &str) -> bool {
    sqlstate.starts_with("08")
        || sqlstate == SqlState::ADMIN_SHUTDOWN.code()
        || sqlstate == SqlState::CRASH_SHUTDOWN.code()
        || sqlstate == SqlState::CANNOT_CONNECT_NOW.code()
}

fn connection_lost(err: tokio_postgres::Error) -> LoaderError {
    LoaderError::Connection(format!("Lost connection to PostgreSQL: {err}"))
}

/// Begin, commit or rollback failure
fn transaction_error(context: &str, err: tokio_postgres::Error) -> LoaderError {
    if is_connection_lost(&err) {
        return connection_lost(err);
    }
    StorageError::Transaction(format!("{context}: {err}")).into()
}

/// Classify a statement failure by SQLSTATE
fn map_pg_error(err: tokio_postgres::Error) -> LoaderError {
    if is_connection_lost(&err) {
        return connection_lost(err);
    }

    let message = match err.as_db_error() {
        Some(db) => match db.detail() {
            Some(detail) => format!("{} ({})", db.message(), detail),
            None => db.message().to_string(),
        },
        None => err.to_string(),
    };

    match err.code() {
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
            StorageError::ForeignKey(message).into()
        }
        Some(code) if is_integrity_violation(code.code()) => {
            StorageError::Constraint(message).into()
        }
        _ => StorageError::QueryFailed(message).into(),
    }
}

/// SQLSTATE class 23 covers integrity constraint violations
fn is_integrity_violation(sqlstate: &str) -> bool {
    sqlstate.starts_with("23")
}

//! PostgreSQL connection
//!
//! One connection for the whole run; the tokio-postgres connection driver is
//! the only spawned task.

use crate::config::{DatabaseConfig, SslMode};
use crate::domain::{LoaderError, Result};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Config as PgConfig, NoTls};

/// Reported in `pg_stat_activity` unless the configuration names one
pub const APPLICATION_NAME: &str = "patient-loader";

/// PostgreSQL store holding the single connection of a run
pub struct PostgresStore {
    client: Client,
    connection: JoinHandle<()>,
}

impl PostgresStore {
    /// Connect using the `[database]` configuration section
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Connection`] when the server cannot be reached,
    /// rejects the credentials, or refuses the session settings.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        tracing::info!(
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            ssl_mode = %config.ssl_mode,
            "Connecting to PostgreSQL"
        );

        let store = Self::connect_with(pg_config(config), config.ssl_mode).await?;

        if config.statement_timeout_seconds > 0 {
            let timeout_query = statement_timeout_sql(config.statement_timeout_seconds);
            store.client.batch_execute(&timeout_query).await.map_err(|e| {
                LoaderError::Connection(format!("Failed to set statement timeout: {e}"))
            })?;
        }

        Ok(store)
    }

    /// Connect with an already-built tokio-postgres configuration
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Connection`] when the connection fails.
    pub async fn connect_with(mut pg_config: PgConfig, ssl_mode: SslMode) -> Result<Self> {
        if pg_config.get_application_name().is_none() {
            pg_config.application_name(APPLICATION_NAME);
        }

        let (client, connection) = match ssl_mode {
            SslMode::Disable => {
                let (client, connection) = pg_config
                    .connect(NoTls)
                    .await
                    .map_err(connection_error)?;
                let handle = tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::error!(error = %e, "PostgreSQL connection error");
                    }
                });
                (client, handle)
            }
            SslMode::Require => {
                let connector = TlsConnector::new().map_err(|e| {
                    LoaderError::Connection(format!("Failed to initialise TLS: {e}"))
                })?;
                let (client, connection) = pg_config
                    .connect(MakeTlsConnector::new(connector))
                    .await
                    .map_err(connection_error)?;
                let handle = tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::error!(error = %e, "PostgreSQL connection error");
                    }
                });
                (client, handle)
            }
        };

        tracing::info!("PostgreSQL connection established");
        Ok(Self { client, connection })
    }

    pub(super) fn client_mut(&mut self) -> &mut Client {
        &mut self.client
    }

    /// Release the connection and wait for the driver task to finish
    pub async fn close(self) -> Result<()> {
        drop(self.client);
        self.connection
            .await
            .map_err(|e| LoaderError::Other(format!("Connection task failed: {e}")))?;
        tracing::debug!("PostgreSQL connection closed");
        Ok(())
    }
}

fn connection_error(err: tokio_postgres::Error) -> LoaderError {
    LoaderError::Connection(format!("Failed to connect to PostgreSQL: {err}"))
}

/// `SET` statement for a timeout given in seconds; PostgreSQL takes milliseconds
fn statement_timeout_sql(seconds: u64) -> String {
    format!("SET statement_timeout = {}", seconds.saturating_mul(1000))
}

/// Translate the `[database]` section into a tokio-postgres configuration
fn pg_config(config: &DatabaseConfig) -> PgConfig {
    let mut pg = PgConfig::new();
    pg.dbname(&config.dbname)
        .user(&config.user)
        .host(&config.host)
        .port(config.port)
        .application_name(APPLICATION_NAME);

    if let Some(password) = &config.password {
        let password: &str = password.expose_secret().as_ref();
        pg.password(password);
    }
    if config.connect_timeout_seconds > 0 {
        pg.connect_timeout(Duration::from_secs(config.connect_timeout_seconds));
    }
    if config.ssl_mode == SslMode::Require {
        pg.ssl_mode(tokio_postgres::config::SslMode::Require);
    }
    pg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn database_config() -> DatabaseConfig {
        DatabaseConfig {
            dbname: "healthdb".to_string(),
            user: "etl_loader".to_string(),
            password: Some(secret_string("etl_pass".to_string())),
            host: "db.internal".to_string(),
            port: 6543,
            ssl_mode: SslMode::Disable,
            connect_timeout_seconds: 10,
            statement_timeout_seconds: 0,
        }
    }

    #[test]
    fn test_pg_config_carries_connection_parameters() {
        let pg = pg_config(&database_config());

        assert_eq!(pg.get_dbname(), Some("healthdb"));
        assert_eq!(pg.get_user(), Some("etl_loader"));
        assert_eq!(pg.get_password(), Some(&b"etl_pass"[..]));
        assert_eq!(pg.get_ports(), &[6543]);
        assert_eq!(pg.get_connect_timeout(), Some(&Duration::from_secs(10)));
        assert_eq!(pg.get_application_name(), Some(APPLICATION_NAME));
    }

    #[test]
    fn test_pg_config_without_timeout() {
        let mut config = database_config();
        config.connect_timeout_seconds = 0;
        assert!(pg_config(&config).get_connect_timeout().is_none());
    }

    #[test]
    fn test_statement_timeout_in_milliseconds() {
        assert_eq!(statement_timeout_sql(30), "SET statement_timeout = 30000");
        assert_eq!(
            statement_timeout_sql(u64::MAX),
            format!("SET statement_timeout = {}", u64::MAX)
        );
    }

    #[test]
    fn test_pg_config_requires_tls() {
        let mut config = database_config();
        config.ssl_mode = SslMode::Require;
        assert_eq!(
            pg_config(&config).get_ssl_mode(),
            tokio_postgres::config::SslMode::Require
        );
    }
}

//! Load command implementation
//!
//! This module implements the `load` command: merge configuration, open the
//! store, run the directory driver and turn the summary into an exit code.

use super::exit_code_for;
use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::PostgresStore;
use crate::config::{read_config_or_default, secret_string, LoaderConfig};
use crate::core::load::{DirectoryDriver, LoadOptions, LoadSummary};
use crate::domain::Result;
use clap::Args;
use std::io;
use std::path::{Path, PathBuf};

/// Arguments for the load command
///
/// Every option may instead come from the configuration file or a
/// `PATIENT_LOADER_*` environment variable; flags given here win.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Directory containing the .json input files
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Database name
    #[arg(long)]
    pub dbname: Option<String>,

    /// Database user
    #[arg(long)]
    pub dbuser: Option<String>,

    /// Database password
    #[arg(long)]
    pub dbpass: Option<String>,

    /// Database host [default: localhost]
    #[arg(long)]
    pub dbhost: Option<String>,

    /// Database port [default: 5432]
    #[arg(long)]
    pub dbport: Option<u16>,

    /// Print skipped directory entries and array elements
    #[arg(long)]
    pub verbose: bool,

    /// Parse, flatten and validate everything without touching the database
    #[arg(long)]
    pub dry_run: bool,
}

impl LoadArgs {
    /// Execute the load command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting load command");

        let mut config = match read_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read configuration");
                eprintln!("Failed to read configuration: {e}");
                return Ok(2);
            }
        };
        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let Some(input_dir) = config.load.input_dir.clone() else {
            eprintln!("Configuration validation failed: load.input_dir must be set");
            return Ok(2);
        };

        let options = LoadOptions {
            verbose: config.load.verbose,
            dry_run: config.load.dry_run,
        };

        let outcome = if config.load.dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            println!("DRY RUN - no database connection will be opened");
            run_dry(&input_dir, options).await
        } else {
            let store = match PostgresStore::connect(&config.database).await {
                Ok(store) => store,
                Err(e) => {
                    tracing::error!(
                        target_db = %config.database.display_target(),
                        error = %e,
                        "Failed to connect"
                    );
                    eprintln!("{e}");
                    return Ok(4);
                }
            };
            run_against(store, &input_dir, options).await
        };

        match outcome {
            Ok(summary) => {
                println!();
                println!("{summary}");
                Ok(exit_code(&summary))
            }
            Err(e) => {
                tracing::error!(error = %e, "Load aborted");
                eprintln!("Load aborted: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    /// Command-line flags take precedence over file and environment
    fn apply_overrides(&self, config: &mut LoaderConfig) {
        if let Some(dir) = &self.input_dir {
            config.load.input_dir = Some(dir.clone());
        }
        if let Some(dbname) = &self.dbname {
            config.database.dbname = dbname.clone();
        }
        if let Some(user) = &self.dbuser {
            config.database.user = user.clone();
        }
        if let Some(password) = &self.dbpass {
            config.database.password = Some(secret_string(password.clone()));
        }
        if let Some(host) = &self.dbhost {
            config.database.host = host.clone();
        }
        if let Some(port) = self.dbport {
            config.database.port = port;
        }
        if self.verbose {
            config.load.verbose = true;
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.load.dry_run = true;
        }
    }
}

async fn run_dry(input_dir: &Path, options: LoadOptions) -> Result<LoadSummary> {
    let mut driver = DirectoryDriver::new(MemoryStore::new(), options, io::stdout());
    let summary = driver.run(input_dir).await?;

    let store = driver.into_store();
    tracing::debug!(
        commits = store.commits(),
        rollbacks = store.rollbacks(),
        rows = store.tables().row_count(),
        "Dry run finished"
    );
    Ok(summary)
}

async fn run_against(
    store: PostgresStore,
    input_dir: &Path,
    options: LoadOptions,
) -> Result<LoadSummary> {
    let mut driver = DirectoryDriver::new(store, options, io::stdout());
    let result = driver.run(input_dir).await;

    if let Err(e) = driver.into_store().close().await {
        tracing::warn!(error = %e, "Failed to close database connection cleanly");
    }
    result
}

fn exit_code(summary: &LoadSummary) -> i32 {
    if summary.is_successful() {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::fs;
    use tempfile::TempDir;

    fn args() -> LoadArgs {
        LoadArgs {
            input_dir: None,
            dbname: None,
            dbuser: None,
            dbpass: None,
            dbhost: None,
            dbport: None,
            verbose: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_flags_override_configuration() {
        let mut config = LoaderConfig::default();
        config.database.dbname = "from_file".to_string();
        config.database.host = "file-host".to_string();

        let args = LoadArgs {
            input_dir: Some(PathBuf::from("./data")),
            dbname: Some("healthdb".to_string()),
            dbpass: Some("secret".to_string()),
            dbport: Some(6543),
            verbose: true,
            ..args()
        };
        args.apply_overrides(&mut config);

        assert_eq!(config.load.input_dir, Some(PathBuf::from("./data")));
        assert_eq!(config.database.dbname, "healthdb");
        assert_eq!(config.database.host, "file-host");
        assert_eq!(config.database.port, 6543);
        let password: &str = config
            .database
            .password
            .as_ref()
            .unwrap()
            .expose_secret()
            .as_ref();
        assert_eq!(password, "secret");
        assert!(config.load.verbose);
        assert!(!config.load.dry_run);
    }

    #[test]
    fn test_absent_flags_keep_configuration() {
        let mut config = LoaderConfig::default();
        config.load.verbose = true;

        args().apply_overrides(&mut config);

        assert!(config.load.verbose);
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
    }

    #[test]
    fn test_exit_code() {
        let mut summary = LoadSummary::new();
        assert_eq!(exit_code(&summary), 0);

        summary.add_failure("bad.json", "Invalid JSON");
        assert_eq!(exit_code(&summary), 1);
    }

    #[tokio::test]
    async fn test_missing_database_settings_is_config_error() {
        let dir = TempDir::new().unwrap();
        let args = LoadArgs {
            input_dir: Some(dir.path().to_path_buf()),
            ..args()
        };

        let code = args
            .execute("/nonexistent/patient-loader.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_dry_run_exit_codes() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ok.json"),
            r#"{"patient_id": "P1", "name": "A"}"#,
        )
        .unwrap();

        let args = LoadArgs {
            input_dir: Some(dir.path().to_path_buf()),
            dry_run: true,
            ..args()
        };
        let code = args
            .execute("/nonexistent/patient-loader.toml")
            .await
            .unwrap();
        assert_eq!(code, 0);

        fs::write(dir.path().join("broken.json"), "{").unwrap();
        let code = args
            .execute("/nonexistent/patient-loader.toml")
            .await
            .unwrap();
        assert_eq!(code, 1);
    }
}

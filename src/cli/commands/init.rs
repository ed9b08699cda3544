//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "patient-loader.toml")]
    pub output: String,

    /// Include explanatory comments for every option
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(()) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Export PATIENT_LOADER_DATABASE_PASSWORD (or put it in .env)");
                println!("  3. Create the tables: psql -d <dbname> -f sql/schema.sql");
                println!("  4. Validate configuration: patient-loader validate-config");
                println!("  5. Run a dry run: patient-loader load --dry-run");
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> &'static str {
        r#"# Patient Loader configuration

[application]
log_level = "info"

[database]
dbname = "healthdb"
user = "etl_loader"
# password = "${PATIENT_LOADER_DB_PASSWORD}"
host = "localhost"
port = 5432
ssl_mode = "disable"

[load]
input_dir = "./data"
verbose = false
dry_run = false

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
    }

    fn generate_config_with_examples() -> &'static str {
        r#"# Patient Loader configuration
#
# Values can be overridden with PATIENT_LOADER_<SECTION>_<KEY> environment
# variables (e.g. PATIENT_LOADER_DATABASE_HOST), and those in turn by
# command-line flags. ${VAR} references are substituted from the environment.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# PostgreSQL
# ============================================================================
[database]
dbname = "healthdb"
user = "etl_loader"

# Keep the password out of this file; either reference a variable:
# password = "${PATIENT_LOADER_DB_PASSWORD}"
# or set PATIENT_LOADER_DATABASE_PASSWORD, or pass --dbpass.

host = "localhost"
port = 5432

# TLS mode: disable | require
ssl_mode = "disable"

# Seconds to wait for the server (0 = no limit)
connect_timeout_seconds = 30

# Per-statement limit in seconds (0 = server default)
statement_timeout_seconds = 0

# ============================================================================
# Load Run
# ============================================================================
[load]
# Directory scanned for *.json files (not recursive)
input_dir = "./data"

# Print skipped directory entries and array elements
verbose = false

# Run everything in memory without connecting to PostgreSQL
dry_run = false

# ============================================================================
# Logging
# ============================================================================
[logging]
# Write JSON logs to files in addition to stderr
local_enabled = false

# Directory for log files
local_path = "./logs"

# Rotation: daily | hourly | never
local_rotation = "daily"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;
    use tempfile::TempDir;

    #[test]
    fn test_generated_configs_parse() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config: LoaderConfig = toml::from_str(content).unwrap();
            assert_eq!(config.database.dbname, "healthdb");
            assert!(config.database.password.is_none());
            assert!(config.load.input_dir.is_some());
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("patient-loader.toml");
        fs::write(&output, "# existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# existing");

        let args = InitArgs {
            force: true,
            ..args
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[database]"));
    }
}

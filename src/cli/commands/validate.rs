//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the loader configuration file.

use crate::config::{read_config, LoaderConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match read_config(config_path) {
            Ok(c) => {
                println!("Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match config.validate() {
            Ok(()) => {
                println!("Configuration is valid");
                println!();
                print!("{}", describe(&config));
                Ok(0)
            }
            Err(e) => {
                println!("Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}

/// Human-readable summary; never includes the password
fn describe(config: &LoaderConfig) -> String {
    let input_dir = config
        .load
        .input_dir
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string());

    let mut out = String::from("Configuration Summary:\n");
    out.push_str(&format!("  Log Level: {}\n", config.application.log_level));
    out.push_str(&format!("  Input Directory: {input_dir}\n"));
    out.push_str(&format!("  Verbose: {}\n", config.load.verbose));
    out.push_str(&format!("  Dry Run: {}\n", config.load.dry_run));
    if !config.load.dry_run {
        out.push_str(&format!(
            "  Database: {}\n",
            config.database.display_target()
        ));
        out.push_str(&format!("  Database User: {}\n", config.database.user));
        out.push_str(&format!("  SSL Mode: {}\n", config.database.ssl_mode));
    }
    if config.logging.local_enabled {
        out.push_str(&format!(
            "  File Logging: {} ({})\n",
            config.logging.local_path, config.logging.local_rotation
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_describe_hides_password() {
        let mut config = LoaderConfig::default();
        config.load.input_dir = Some(PathBuf::from("./data"));
        config.database.dbname = "healthdb".to_string();
        config.database.user = "etl".to_string();
        config.database.password = Some(secret_string("hunter2".to_string()));

        let text = describe(&config);
        assert!(text.contains("Database: localhost:5432/healthdb"));
        assert!(text.contains("Input Directory: ./data"));
        assert!(!text.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let code = ValidateArgs {}
            .execute("/nonexistent/patient-loader.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_dry_run_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[load]\ninput_dir = \"./data\"\ndry_run = true").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}

//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML file.
//! Every section has defaults so a run can be configured entirely from the
//! command line.

use crate::config::SecretString;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoaderConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// PostgreSQL connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Load run settings
    #[serde(default)]
    pub load: LoadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LoaderConfig {
    /// Validates the configuration
    ///
    /// The database section is only checked for real runs; a dry run never
    /// opens a connection.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value found.
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.load.validate()?;
        if !self.load.dry_run {
            self.database.validate()?;
        }
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// TLS mode for the database connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    /// Plain TCP
    #[default]
    Disable,
    /// TLS via the platform's native TLS library
    Require,
}

impl FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "require" => Ok(SslMode::Require),
            other => Err(format!(
                "Invalid ssl_mode '{other}'. Must be one of: disable, require"
            )),
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SslMode::Disable => write!(f, "disable"),
            SslMode::Require => write!(f, "require"),
        }
    }
}

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database name
    #[serde(default)]
    pub dbname: String,

    /// Login role
    #[serde(default)]
    pub user: String,

    /// Password, zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Server host
    #[serde(default = "default_db_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_db_port")]
    pub port: u16,

    /// TLS mode
    #[serde(default)]
    pub ssl_mode: SslMode,

    /// Connection timeout in seconds (0 disables the timeout)
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// Per-statement timeout in seconds (0 keeps the server default)
    #[serde(default)]
    pub statement_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dbname: String::new(),
            user: String::new(),
            password: None,
            host: default_db_host(),
            port: default_db_port(),
            ssl_mode: SslMode::default(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            statement_timeout_seconds: 0,
        }
    }
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.dbname.trim().is_empty() {
            return Err("database.dbname cannot be empty".to_string());
        }
        if self.user.trim().is_empty() {
            return Err("database.user cannot be empty".to_string());
        }
        match &self.password {
            Some(password) if !password.expose_secret().is_empty() => {}
            _ => return Err("database.password must be set".to_string()),
        }
        if self.host.trim().is_empty() {
            return Err("database.host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("database.port must be > 0".to_string());
        }
        Ok(())
    }

    /// Host, port and database name, safe to print
    pub fn display_target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.dbname)
    }
}

/// Load run configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadConfig {
    /// Directory holding the `.json` input files
    #[serde(default)]
    pub input_dir: Option<PathBuf>,

    /// Report skipped directory entries and array elements on stdout
    #[serde(default)]
    pub verbose: bool,

    /// Run against the in-memory store instead of PostgreSQL
    #[serde(default)]
    pub dry_run: bool,
}

impl LoadConfig {
    fn validate(&self) -> Result<(), String> {
        match &self.input_dir {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(()),
            _ => Err("load.input_dir must be set".to_string()),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_connect_timeout_seconds() -> u64 {
    30
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

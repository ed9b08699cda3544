//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::LoaderConfig;
use super::secret::secret_string;
use crate::domain::errors::LoaderError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix shared by every override variable
pub const ENV_PREFIX: &str = "PATIENT_LOADER_";

/// Loads and validates configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`LoaderConfig`]
/// 4. Applies environment variable overrides (`PATIENT_LOADER_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, a referenced
/// environment variable is unset, the TOML is malformed, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use patient_loader::config::load_config;
///
/// let config = load_config("patient-loader.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<LoaderConfig> {
    let config = read_config(path)?;

    config.validate().map_err(|e| {
        LoaderError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Reads a configuration file without validating it
///
/// Used when further overrides (command-line flags) still have to be applied
/// before the configuration is complete.
///
/// # Errors
///
/// Same as [`load_config`], minus validation.
pub fn read_config(path: impl AsRef<Path>) -> Result<LoaderConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LoaderError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        LoaderError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: LoaderConfig = toml::from_str(&contents)
        .map_err(|e| LoaderError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    Ok(config)
}

/// Reads the configuration file if it exists, otherwise starts from defaults
///
/// Environment overrides are applied in both cases. Nothing is validated.
///
/// # Errors
///
/// Returns an error only when an existing file cannot be read or parsed, or
/// an override variable holds an unparsable value.
pub fn read_config_or_default(path: impl AsRef<Path>) -> Result<LoaderConfig> {
    let path = path.as_ref();
    if path.exists() {
        return read_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    let mut config = LoaderConfig::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched. All missing variables are reported in
/// one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| LoaderError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(LoaderError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_override(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{section}_{key}")).ok()
}

fn parse_override<T: std::str::FromStr>(section: &str, key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        LoaderError::Configuration(format!(
            "Invalid value '{value}' for {ENV_PREFIX}{section}_{key}"
        ))
    })
}

/// Applies environment variable overrides using the `PATIENT_LOADER_` prefix
///
/// Variables follow the pattern `PATIENT_LOADER_<SECTION>_<KEY>`, for example
/// `PATIENT_LOADER_DATABASE_HOST` or `PATIENT_LOADER_LOAD_INPUT_DIR`.
fn apply_env_overrides(config: &mut LoaderConfig) -> Result<()> {
    if let Some(val) = env_override("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Database overrides
    if let Some(val) = env_override("DATABASE", "DBNAME") {
        config.database.dbname = val;
    }
    if let Some(val) = env_override("DATABASE", "USER") {
        config.database.user = val;
    }
    if let Some(val) = env_override("DATABASE", "PASSWORD") {
        config.database.password = Some(secret_string(val));
    }
    if let Some(val) = env_override("DATABASE", "HOST") {
        config.database.host = val;
    }
    if let Some(val) = env_override("DATABASE", "PORT") {
        config.database.port = parse_override("DATABASE", "PORT", &val)?;
    }
    if let Some(val) = env_override("DATABASE", "SSL_MODE") {
        config.database.ssl_mode = val.parse().map_err(LoaderError::Configuration)?;
    }

    // Load overrides
    if let Some(val) = env_override("LOAD", "INPUT_DIR") {
        config.load.input_dir = Some(PathBuf::from(val));
    }
    if let Some(val) = env_override("LOAD", "VERBOSE") {
        config.load.verbose = parse_override("LOAD", "VERBOSE", &val)?;
    }
    if let Some(val) = env_override("LOAD", "DRY_RUN") {
        config.load.dry_run = parse_override("LOAD", "DRY_RUN", &val)?;
    }

    // Logging overrides
    if let Some(val) = env_override("LOGGING", "LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("LOGGING", "LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = env_override("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

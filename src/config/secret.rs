//! Secure credential handling using the secrecy crate
//!
//! The database password is kept in a [`SecretString`]: memory is zeroed on
//! drop, `Debug` output is redacted, and reading it requires an explicit
//! `expose_secret()` call at the point where the connection is opened.
//!
//! # Example
//!
//! ```rust
//! use patient_loader::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_string("etl_pass".to_string());
//! let exposed: &str = password.expose_secret().as_ref();
//! assert_eq!(exposed, "etl_pass");
//! assert!(!format!("{password:?}").contains("etl_pass"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroize;

/// String payload that can live inside a [`Secret`]
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Secret string used for credentials
pub type SecretString = Secret<SecretValue>;

/// Wrap a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("sensitive-data"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_secret_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Section {
            password: SecretString,
        }

        let section: Section = toml::from_str("password = \"etl_pass\"").unwrap();
        let exposed: &str = section.password.expose_secret().as_ref();
        assert_eq!(exposed, "etl_pass");
        assert!(!section.password.expose_secret().is_empty());
    }
}

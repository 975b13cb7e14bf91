//! Secure credential handling for LLM providers.
//!
//! A centralized, type-safe way to handle API credentials:
//!
//! - **No accidental logging**: credentials cannot appear in Debug output
//! - **Memory safety**: credentials are zeroed on drop
//! - **Explicit exposure**: the raw value only leaves via `.expose()`
//!
//! ## Usage
//!
//! ```ignore
//! use crate::providers::secrets::{ApiCredential, CredentialSource};
//!
//! // Load from environment
//! let cred = ApiCredential::from_env("GEMINI_API_KEY", "Gemini API key")?;
//!
//! // Load from config with env fallback
//! let cred = ApiCredential::from_config_or_env(&config, "api_key", "GEMINI_API_KEY", "Gemini API key")?;
//!
//! // Use in an HTTP header (explicit exposure)
//! request.header("x-goog-api-key", cred.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from. Tracked for debugging without
/// exposing the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Passed directly in code
    Programmatic,

    /// Read from an environment variable
    Env,

    /// Read from a JSON configuration value
    Config,
}

/// An API credential that cannot be accidentally printed or logged.
pub struct ApiCredential {
    secret: SecretString,
    source: CredentialSource,
    label: &'static str,
}

impl ApiCredential {
    /// Wrap a credential value provided programmatically.
    pub fn new(
        value: impl Into<String>,
        source: CredentialSource,
        label: &'static str,
    ) -> Self {
        Self {
            secret: SecretString::from(value.into()),
            source,
            label,
        }
    }

    /// Load a credential from an environment variable.
    ///
    /// Returns `NotConfigured` if the variable is missing or empty.
    pub fn from_env(var: &str, label: &'static str) -> Result<Self, ProviderError> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => {
                Ok(Self::new(value, CredentialSource::Env, label))
            }
            _ => Err(ProviderError::NotConfigured(format!(
                "{} not found: set the {} environment variable",
                label, var
            ))),
        }
    }

    /// Load a credential from a config key, falling back to an
    /// environment variable.
    pub fn from_config_or_env(
        config: &JsonValue,
        key: &str,
        var: &str,
        label: &'static str,
    ) -> Result<Self, ProviderError> {
        if let Some(value) = config[key].as_str() {
            if !value.trim().is_empty() {
                return Ok(Self::new(value, CredentialSource::Config, label));
            }
        }
        Self::from_env(var, label)
    }

    /// Check credential availability without loading it.
    pub fn is_available(config: &JsonValue, key: &str, var: &str) -> bool {
        let in_config = config[key]
            .as_str()
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        let in_env = std::env::var(var)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        in_config || in_env
    }

    /// Expose the raw credential. Call only at the point of use.
    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }

    /// Whether the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.secret.expose_secret().is_empty()
    }

    /// Where this credential came from.
    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Masked form for safe logging: last four characters only.
    pub fn masked(&self) -> String {
        let value = self.secret.expose_secret();
        if value.len() < 8 {
            "NOT_SET".to_string()
        } else {
            format!("...{}", &value[value.len() - 4..])
        }
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("label", &self.label)
            .field("source", &self.source)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_never_contains_value() {
        let cred = ApiCredential::new(
            "super-secret-key-12345",
            CredentialSource::Programmatic,
            "test key",
        );
        let output = format!("{:?}", cred);
        assert!(!output.contains("super-secret-key-12345"));
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_returns_value() {
        let cred = ApiCredential::new("abc123", CredentialSource::Programmatic, "test key");
        assert_eq!(cred.expose(), "abc123");
        assert!(!cred.is_empty());
    }

    #[test]
    fn test_masked_shows_last_four() {
        let cred = ApiCredential::new(
            "super-secret-key-9876",
            CredentialSource::Programmatic,
            "test key",
        );
        assert_eq!(cred.masked(), "...9876");
    }

    #[test]
    fn test_masked_short_value() {
        let cred = ApiCredential::new("abc", CredentialSource::Programmatic, "test key");
        assert_eq!(cred.masked(), "NOT_SET");
    }

    #[test]
    fn test_from_config_or_env_prefers_config() {
        let config = serde_json::json!({ "api_key": "from-config" });
        let cred =
            ApiCredential::from_config_or_env(&config, "api_key", "AUTHORITY_TEST_UNSET", "key")
                .unwrap();
        assert_eq!(cred.expose(), "from-config");
        assert_eq!(cred.source(), CredentialSource::Config);
    }

    #[test]
    fn test_missing_everywhere_is_not_configured() {
        let config = serde_json::json!({});
        let result =
            ApiCredential::from_config_or_env(&config, "api_key", "AUTHORITY_TEST_UNSET", "key");
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[test]
    fn test_is_available() {
        let config = serde_json::json!({ "api_key": "x" });
        assert!(ApiCredential::is_available(
            &config,
            "api_key",
            "AUTHORITY_TEST_UNSET"
        ));

        let empty = serde_json::json!({});
        assert!(!ApiCredential::is_available(
            &empty,
            "api_key",
            "AUTHORITY_TEST_UNSET"
        ));
    }
}

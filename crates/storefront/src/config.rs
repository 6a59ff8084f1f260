//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BOOKHAVEN_IDENTITY_URL` - Base URL of the identity/profile service
//! - `BOOKHAVEN_IDENTITY_KEY` - Publishable API key for the identity service
//! - `BOOKHAVEN_CATALOG_URL` - Base URL of the catalog service
//! - `BOOKHAVEN_CATALOG_KEY` - Publishable API key for the catalog service
//!
//! ## Optional
//! - `BOOKHAVEN_DATA_DIR` - Directory for persisted store state (default: data)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Identity/profile service configuration.
    pub identity: IdentityConfig,
    /// Catalog service configuration.
    pub catalog: CatalogConfig,
    /// Directory holding the persisted store records.
    pub data_dir: PathBuf,
}

/// Identity service configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Base URL of the identity service.
    pub base_url: Url,
    /// Publishable API key sent with every request.
    pub api_key: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Catalog service configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog service.
    pub base_url: Url,
    /// Publishable API key sent with every request.
    pub api_key: SecretString,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            identity: IdentityConfig {
                base_url: get_url("BOOKHAVEN_IDENTITY_URL")?,
                api_key: get_required_secret("BOOKHAVEN_IDENTITY_KEY")?,
            },
            catalog: CatalogConfig {
                base_url: get_url("BOOKHAVEN_CATALOG_URL")?,
                api_key: get_required_secret("BOOKHAVEN_CATALOG_KEY")?,
            },
            data_dir: PathBuf::from(get_env_or_default("BOOKHAVEN_DATA_DIR", "data")),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get a required environment variable parsed as a URL.
fn get_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_config_debug_redacts_key() {
        let config = IdentityConfig {
            base_url: Url::parse("https://identity.example.com").unwrap(),
            api_key: SecretString::from("super_secret_key"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("identity.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key"));
    }

    #[test]
    fn test_catalog_config_debug_redacts_key() {
        let config = CatalogConfig {
            base_url: Url::parse("https://catalog.example.com").unwrap(),
            api_key: SecretString::from("another_secret"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("catalog.example.com"));
        assert!(!debug_output.contains("another_secret"));
    }
}

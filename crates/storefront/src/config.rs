//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BOUTIQUE_API_URL` - Base URL of the boutique gateway (e.g. `https://api.zarihouse.in/api`)
//! - `RAZORPAY_KEY_ID` - Razorpay public key for the payment widget (`rzp_live_...` / `rzp_test_...`)
//! - `WHATSAPP_NUMBER` - Contact number for international orders (digits, with country code)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: `http://127.0.0.1:3000`)
//! - `STORE_NAME` - Display name shown in the payment widget (default: Zari House)
//! - `GATEWAY_API_KEY` - Bearer credential for credentialed gateway calls
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Blocklist of common placeholder patterns (case-insensitive).
///
/// A key like `rzp_test_placeholder` would only surface as a widget failure
/// at the payment step; the service refuses to boot with one instead.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "placeholder",
    "your-",
    "your_",
    "changeme",
    "replace",
    "example",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure value in {0}: {1}")]
    InsecureValue(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Display name shown in the payment widget
    pub store_name: String,
    /// Razorpay public key for the payment widget
    pub razorpay_key_id: String,
    /// WhatsApp contact number for international orders (digits only)
    pub whatsapp_number: String,
    /// Boutique gateway configuration
    pub gateway: GatewayConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Boutique gateway configuration.
///
/// Implements `Debug` manually to redact the credential.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Gateway base URL, without a trailing slash
    pub base_url: String,
    /// Bearer credential for credentialed endpoints (orders, payment verify)
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
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
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the Razorpay key fails placeholder validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://127.0.0.1:3000");
        let store_name = get_env_or_default("STORE_NAME", "Zari House");

        let razorpay_key_id = get_required_env("RAZORPAY_KEY_ID")?;
        validate_razorpay_key(&razorpay_key_id, "RAZORPAY_KEY_ID")?;

        let whatsapp_number = get_required_env("WHATSAPP_NUMBER")?;
        validate_whatsapp_number(&whatsapp_number, "WHATSAPP_NUMBER")?;

        let gateway = GatewayConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            store_name,
            razorpay_key_id,
            whatsapp_number,
            gateway,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GatewayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("BOUTIQUE_API_URL")?;
        let base_url = normalize_base_url(&raw, "BOUTIQUE_API_URL")?;
        let api_key = get_optional_env("GATEWAY_API_KEY").map(SecretString::from);

        Ok(Self { base_url, api_key })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and normalize a gateway base URL, trimming any trailing slash.
fn normalize_base_url(raw: &str, var_name: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Validate that a Razorpay key looks real.
///
/// Key IDs are `rzp_test_...` or `rzp_live_...`; anything matching the
/// placeholder blocklist is rejected.
fn validate_razorpay_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    if !key.starts_with("rzp_") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must start with 'rzp_'".to_string(),
        ));
    }

    let lower = key.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureValue(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Validate a WhatsApp contact number: digits only, country code included.
fn validate_whatsapp_number(number: &str, var_name: &str) -> Result<(), ConfigError> {
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must contain only digits (country code included, no '+')".to_string(),
        ));
    }
    if number.len() < 10 || number.len() > 15 {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("must be 10-15 digits (got {})", number.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_razorpay_key_placeholder() {
        let result = validate_razorpay_key("rzp_test_placeholder", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureValue(_, _))));
    }

    #[test]
    fn test_validate_razorpay_key_wrong_prefix() {
        let result = validate_razorpay_key("pk_live_a1B2c3D4e5F6g7", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_validate_razorpay_key_valid() {
        assert!(validate_razorpay_key("rzp_live_a1B2c3D4e5F6g7", "TEST_VAR").is_ok());
        assert!(validate_razorpay_key("rzp_test_k9J8h7G6f5D4s3", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_whatsapp_number() {
        assert!(validate_whatsapp_number("919876543210", "TEST_VAR").is_ok());
        assert!(validate_whatsapp_number("+919876543210", "TEST_VAR").is_err());
        assert!(validate_whatsapp_number("98765", "TEST_VAR").is_err());
        assert!(validate_whatsapp_number("", "TEST_VAR").is_err());
    }

    #[test]
    fn test_normalize_base_url_trims_trailing_slash() {
        let url = normalize_base_url("https://api.zarihouse.in/api/", "TEST_VAR").unwrap();
        assert_eq!(url, "https://api.zarihouse.in/api");
    }

    #[test]
    fn test_normalize_base_url_rejects_garbage() {
        assert!(normalize_base_url("not a url", "TEST_VAR").is_err());
        assert!(normalize_base_url("ftp://api.example.com", "TEST_VAR").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://127.0.0.1:3000".to_string(),
            store_name: "Zari House".to_string(),
            razorpay_key_id: "rzp_test_k9J8h7G6f5D4s3".to_string(),
            whatsapp_number: "919876543210".to_string(),
            gateway: GatewayConfig {
                base_url: "https://api.zarihouse.in/api".to_string(),
                api_key: None,
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_gateway_config_debug_redacts_key() {
        let config = GatewayConfig {
            base_url: "https://api.zarihouse.in/api".to_string(),
            api_key: Some(SecretString::from("super_secret_gateway_key")),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("api.zarihouse.in"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_gateway_key"));
    }
}

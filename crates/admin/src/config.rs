//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CUZTORY_API_URL` - Backend base URL (default: `http://localhost:5000/api`)
//! - `CUZTORY_ADMIN_TOKEN` - Admin bearer token (overrides the token file)
//! - `CUZTORY_TOKEN_FILE` - Where `cz-admin login` keeps the token
//!   (default: `.cuztory/admin-token`)
//! - `CUZTORY_STORE_NAME` - Store name on invoices and messages (default: Cuztory)
//! - `CUZTORY_TRACKING_URL` - Base of the customer tracking page
//!   (default: `https://cuztory.in/track-order`)
//! - `CUZTORY_CURRENCY` - Display currency code (default: INR)
//! - `INVOICE_OUTPUT_DIR` - Directory for generated invoices (default: `.`)
//! - `INVOICE_FONT_PATH` - TrueType font embedded in invoices
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate, 0.0 to 1.0 (default: 1.0)

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use cuztory_core::CurrencyCode;

use crate::console::ConsoleSettings;
use crate::invoice::{DEFAULT_STORE_NAME, FontSource, InvoiceBuilder, InvoiceError, InvoiceSettings};
use crate::messaging::{DEFAULT_TRACKING_URL, MessageComposer};
use crate::session::{ProviderChain, StaticToken, TokenFile};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TOKEN_FILE: &str = ".cuztory/admin-token";

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin console configuration.
///
/// Implements `Debug` manually to redact the admin token.
#[derive(Clone)]
pub struct AdminConfig {
    /// Backend REST base URL, e.g. `http://localhost:5000/api`
    pub api_url: Url,
    /// Token from `CUZTORY_ADMIN_TOKEN`
    pub admin_token: Option<SecretString>,
    /// Token persisted by `cz-admin login`
    pub token_file: PathBuf,
    pub store_name: String,
    /// Base of the customer tracking page
    pub tracking_url: String,
    pub currency: CurrencyCode,
    pub invoice_output_dir: PathBuf,
    pub invoice_font_path: Option<PathBuf>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("api_url", &self.api_url.as_str())
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_file", &self.token_file)
            .field("store_name", &self.store_name)
            .field("tracking_url", &self.tracking_url)
            .field("currency", &self.currency)
            .field("invoice_output_dir", &self.invoice_output_dir)
            .field("invoice_font_path", &self.invoice_font_path)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .field("sentry_sample_rate", &self.sentry_sample_rate)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api_url = parse_api_url(&env.get_or_default("CUZTORY_API_URL", DEFAULT_API_URL))?;
        let tracking_url = env.get_or_default("CUZTORY_TRACKING_URL", DEFAULT_TRACKING_URL);
        Url::parse(&tracking_url).map_err(|e| {
            ConfigError::InvalidEnvVar("CUZTORY_TRACKING_URL".to_string(), e.to_string())
        })?;
        let currency = env
            .get_or_default("CUZTORY_CURRENCY", "INR")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("CUZTORY_CURRENCY".to_string(), e))?;

        let admin_token = env.get_optional("CUZTORY_ADMIN_TOKEN").map(|token| {
            if let Err(e) = validate_secret_strength(&token, "CUZTORY_ADMIN_TOKEN") {
                tracing::warn!("CUZTORY_ADMIN_TOKEN validation warning: {e}");
            }
            SecretString::from(token)
        });

        let sentry_sample_rate = match env.get_optional("SENTRY_SAMPLE_RATE") {
            Some(raw) => parse_sample_rate(&raw)?,
            None => 1.0,
        };

        Ok(Self {
            api_url,
            admin_token,
            token_file: PathBuf::from(env.get_or_default("CUZTORY_TOKEN_FILE", DEFAULT_TOKEN_FILE)),
            store_name: env.get_or_default("CUZTORY_STORE_NAME", DEFAULT_STORE_NAME),
            tracking_url,
            currency,
            invoice_output_dir: PathBuf::from(env.get_or_default("INVOICE_OUTPUT_DIR", ".")),
            invoice_font_path: env.get_optional("INVOICE_FONT_PATH").map(PathBuf::from),
            sentry_dsn: env.get_optional("SENTRY_DSN"),
            sentry_environment: env.get_optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
        })
    }

    /// Environment token first, then the token file.
    #[must_use]
    pub fn credential_provider(&self) -> ProviderChain {
        let chain = ProviderChain::new();
        let chain = match &self.admin_token {
            Some(token) => chain.with(StaticToken::new(token.clone())),
            None => chain,
        };
        chain.with(self.token_store())
    }

    #[must_use]
    pub fn token_store(&self) -> TokenFile {
        TokenFile::new(&self.token_file)
    }

    #[must_use]
    pub fn invoice_settings(&self) -> InvoiceSettings {
        InvoiceSettings {
            store_name: self.store_name.clone(),
            currency: self.currency,
        }
    }

    #[must_use]
    pub fn message_composer(&self) -> MessageComposer {
        MessageComposer::new(self.store_name.clone(), self.tracking_url.clone())
    }

    /// Presentation settings for the order console.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Font` if `INVOICE_FONT_PATH` cannot be read.
    pub fn console_settings(&self) -> Result<ConsoleSettings, InvoiceError> {
        Ok(ConsoleSettings {
            invoices: InvoiceBuilder::new(self.invoice_settings()),
            fonts: FontSource::from_config(self.invoice_font_path.as_deref())?,
            messages: self.message_composer(),
            currency: self.currency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with empty values treated as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional environment variable.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get an environment variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }
}

/// Parse the backend base URL. Only http(s) is accepted.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("CUZTORY_API_URL".to_string(), reason);
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

fn parse_sample_rate(raw: &str) -> Result<f32, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("SENTRY_SAMPLE_RATE".to_string(), reason)
    };
    let rate = raw.parse::<f32>().map_err(|e| invalid(e.to_string()))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(invalid(format!("must be between 0.0 and 1.0 (got {rate})")))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::session::CredentialProvider;

    fn load(vars: &[(&str, &str)]) -> Result<AdminConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AdminConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.store_name, "Cuztory");
        assert_eq!(config.tracking_url, "https://cuztory.in/track-order");
        assert_eq!(config.currency, CurrencyCode::INR);
        assert_eq!(config.token_file, PathBuf::from(".cuztory/admin-token"));
        assert_eq!(config.invoice_output_dir, PathBuf::from("."));
        assert!(config.admin_token.is_none());
        assert!(config.invoice_font_path.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CUZTORY_API_URL", "https://api.cuztory.in/api"),
            ("CUZTORY_STORE_NAME", "Gift Studio"),
            ("CUZTORY_CURRENCY", "usd"),
            ("INVOICE_FONT_PATH", "/fonts/NotoSans.ttf"),
            ("SENTRY_SAMPLE_RATE", "0.25"),
        ])
        .unwrap();
        assert_eq!(config.api_url.host_str(), Some("api.cuztory.in"));
        assert_eq!(config.store_name, "Gift Studio");
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(
            config.invoice_font_path,
            Some(PathBuf::from("/fonts/NotoSans.ttf"))
        );
        assert!((config.sentry_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blank_value_uses_default() {
        let config = load(&[("CUZTORY_STORE_NAME", "   ")]).unwrap();
        assert_eq!(config.store_name, "Cuztory");
    }

    #[test]
    fn test_invalid_api_url() {
        let err = load(&[("CUZTORY_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(var, _) if var == "CUZTORY_API_URL"));

        let err = load(&[("CUZTORY_API_URL", "ftp://files.cuztory.in")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_sample_rate() {
        assert!(load(&[("SENTRY_SAMPLE_RATE", "1.5")]).is_err());
        assert!(load(&[("SENTRY_SAMPLE_RATE", "often")]).is_err());
    }

    #[test]
    fn test_unknown_currency() {
        assert!(load(&[("CUZTORY_CURRENCY", "XYZ")]).is_err());
    }

    #[test]
    fn test_weak_token_still_loads() {
        let config = load(&[("CUZTORY_ADMIN_TOKEN", "changeme")]).unwrap();
        assert_eq!(
            config.admin_token.unwrap().expose_secret(),
            "changeme"
        );
    }

    #[test]
    fn test_env_token_wins_over_token_file() {
        let config = load(&[
            ("CUZTORY_ADMIN_TOKEN", "eyJhbGciOiJIUzI1NiJ9.k3Xq"),
            ("CUZTORY_TOKEN_FILE", "/nonexistent/cuztory/token"),
        ])
        .unwrap();
        let token = config.credential_provider().bearer_token().unwrap();
        assert_eq!(token.expose_secret(), "eyJhbGciOiJIUzI1NiJ9.k3Xq");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[("CUZTORY_ADMIN_TOKEN", "eyJhbGciOiJIUzI1NiJ9.super")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("eyJhbGciOiJIUzI1NiJ9.super"));
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-admin-token", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }
}

//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SOL_CITY_SUPABASE_URL` - Project URL (e.g., <https://abc.supabase.co>)
//! - `SOL_CITY_SUPABASE_ANON_KEY` - Public anon key; row-level security does the rest
//!
//! ## Optional
//! - `SOL_CITY_ACCESS_TOKEN` - Access token from a completed OAuth sign-in
//! - `SOL_CITY_STORAGE_PATH` - Durable client storage file (default: .sol-city/storage.json)
//! - `SOL_CITY_SESSION_TIMEOUT_SECS` - Give up waiting for the first session snapshot (default: 10, 0 disables)
//! - `SOL_CITY_OAUTH_PROVIDER` - OAuth provider for sign-in (default: discord)
//! - `SOL_CITY_REDIRECT_URL` - Where the provider sends the user back (default: <http://localhost:8080/>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_PATH: &str = ".sol-city/storage.json";
const DEFAULT_SESSION_TIMEOUT_SECS: &str = "10";
const DEFAULT_OAUTH_PROVIDER: &str = "discord";
const DEFAULT_REDIRECT_URL: &str = "http://localhost:8080/";

/// Leading text of template values left in `.env` files (case-insensitive)
const PLACEHOLDER_PREFIXES: &[&str] = &["your-", "your_", "changeme", "replace-me", "put-your", "<"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Placeholder value in {0}: {1}")]
    Placeholder(String, String),
}

/// Portal configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Hosted backend connection
    pub supabase: SupabaseConfig,
    /// File backing durable client storage
    pub storage_path: PathBuf,
    /// How long to wait for the first session snapshot; `None` waits forever
    pub session_timeout: Option<Duration>,
    /// OAuth provider used by "Login with ..."
    pub oauth_provider: String,
    /// Redirect target after OAuth sign-in
    pub redirect_url: Url,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Supabase project configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project base URL
    pub url: Url,
    /// Public anon key sent as `apikey`
    pub anon_key: SecretString,
    /// User access token from a completed sign-in
    pub access_token: Option<SecretString>,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl PortalConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the anon key is still a template placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`PortalConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let supabase = SupabaseConfig {
            url: env.url("SOL_CITY_SUPABASE_URL")?,
            anon_key: env.key("SOL_CITY_SUPABASE_ANON_KEY")?,
            access_token: env.optional("SOL_CITY_ACCESS_TOKEN").map(SecretString::from),
        };

        let storage_path =
            PathBuf::from(env.or_default("SOL_CITY_STORAGE_PATH", DEFAULT_STORAGE_PATH));

        let timeout_secs = env
            .or_default("SOL_CITY_SESSION_TIMEOUT_SECS", DEFAULT_SESSION_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SOL_CITY_SESSION_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let session_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let redirect_url = Url::parse(&env.or_default("SOL_CITY_REDIRECT_URL", DEFAULT_REDIRECT_URL))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SOL_CITY_REDIRECT_URL".to_string(), e.to_string())
            })?;

        Ok(Self {
            supabase,
            storage_path,
            session_timeout,
            oauth_provider: env.or_default("SOL_CITY_OAUTH_PROVIDER", DEFAULT_OAUTH_PROVIDER),
            redirect_url,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source; empty values count as unset.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional environment variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required environment variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an environment variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a required http(s) URL.
    fn url(&self, key: &str) -> Result<Url, ConfigError> {
        let raw = self.required(key)?;
        let url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }

    /// Load a key, refusing template placeholders.
    fn key(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = SecretString::from(self.required(key)?);
        reject_placeholder(value.expose_secret(), key)?;
        Ok(value)
    }
}

fn reject_placeholder(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = value.trim().to_lowercase();

    match PLACEHOLDER_PREFIXES.iter().find(|p| lower.starts_with(**p)) {
        Some(prefix) => Err(ConfigError::Placeholder(
            var_name.to_string(),
            format!("starts with '{prefix}'"),
        )),
        None => Ok(()),
    }
}

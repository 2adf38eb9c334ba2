//! Console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `U1R_API_BASE` - Catalog Store base URL (default: <https://api.u1rfoods.com>)
//! - `U1R_MODE` - Catalog mode, `wholesale` or `retail` (default: wholesale)
//! - `U1R_ADMIN_TOKEN` - Bearer token; overrides the stored session
//! - `U1R_SESSION_FILE` - Where `login` stores the token (default: .u1r-session)
//! - `U1R_HTTP_TIMEOUT_SECS` - Per-request timeout (default: none)
//! - `U1R_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use u1r_core::Mode;
use url::Url;

/// Production Catalog Store.
pub const DEFAULT_API_BASE: &str = "https://api.u1rfoods.com";

/// Default token file, relative to the working directory.
pub const DEFAULT_SESSION_FILE: &str = ".u1r-session";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Console configuration.
///
/// Implements `Debug` manually to redact the admin token.
#[derive(Clone)]
pub struct AdminConfig {
    /// Catalog Store base URL, always ending in `/`
    pub api_base: Url,
    /// Catalog mode used for every query
    pub mode: Mode,
    /// Token supplied through the environment (takes precedence over the file)
    pub token: Option<SecretString>,
    /// Token file written by `login`
    pub session_file: PathBuf,
    /// Optional per-request timeout
    pub http_timeout: Option<Duration>,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("api_base", &self.api_base.as_str())
            .field("mode", &self.mode)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("session_file", &self.session_file)
            .field("http_timeout", &self.http_timeout)
            .field("log_json", &self.log_json)
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
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base = parse_base_url(
            get("U1R_API_BASE").as_deref().unwrap_or(DEFAULT_API_BASE),
        )?;
        let mode = match get("U1R_MODE") {
            Some(raw) => raw
                .parse::<Mode>()
                .map_err(|e| ConfigError::InvalidEnvVar("U1R_MODE".to_string(), e.to_string()))?,
            None => Mode::default(),
        };
        let http_timeout = get("U1R_HTTP_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidEnvVar("U1R_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?;
        let sentry_sample_rate = get("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            api_base,
            mode,
            token: get("U1R_ADMIN_TOKEN").map(SecretString::from),
            session_file: get("U1R_SESSION_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from),
            http_timeout,
            log_json: get("U1R_LOG_JSON").is_some(),
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
        })
    }

    /// Configuration pointing at `api_base` with every other value defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base` is not an absolute URL.
    pub fn for_base(api_base: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| (key == "U1R_API_BASE").then(|| api_base.to_string()))
    }

    /// Replace the API base, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base` is not an absolute URL.
    pub fn set_api_base(&mut self, api_base: &str) -> Result<(), ConfigError> {
        self.api_base = parse_base_url(api_base)?;
        Ok(())
    }
}

/// Parse the API base, forcing a trailing slash so relative joins append.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::InvalidEnvVar("U1R_API_BASE".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "U1R_API_BASE".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

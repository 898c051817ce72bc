//! Configuration (Figment-based)
//!
//! Environment-driven settings with built-in defaults, merged via Figment:
//! defaults, then `EXPLAINER_*` environment variables. Validation runs at
//! load time and any violation stops startup.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::types::{ExplainError, Result};

/// Placeholder value shipped in sample environment files. Treated the same
/// as a missing key.
const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

/// Environment variable prefix, e.g. `EXPLAINER_API_KEY`, `EXPLAINER_PORT`.
const ENV_PREFIX: &str = "EXPLAINER_";

/// Application settings.
///
/// Read-only after startup: the validated instance is wrapped in an `Arc`
/// and shared across request handlers, never mutated.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Provider selection: "gemini" or "openai".
    pub provider: String,

    /// Provider API key. Required; never serialized or logged.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Model identifier passed on every generation request.
    pub model: String,

    /// Maximum tokens per completion, valid range [100, 8000].
    pub max_tokens: u32,

    /// Sampling temperature, valid range [0.0, 2.0].
    pub temperature: f32,

    /// Per-call request timeout in seconds.
    pub timeout_secs: u64,

    /// Bind host for the HTTP server.
    pub host: String,

    /// Bind port for the HTTP server.
    pub port: u16,

    /// Default log level when RUST_LOG is unset.
    pub log_level: String,

    /// Comma-separated allowed CORS origins; "*" allows any origin.
    pub allowed_origins: String,

    /// Maximum number of topics accepted in one batch request.
    pub max_batch_size: usize,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("allowed_origins", &self.allowed_origins)
            .field("max_batch_size", &self.max_batch_size)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: String::new(),
            model: "gemini-2.0-flash-exp".to_string(),
            max_tokens: 1500,
            temperature: 0.7,
            timeout_secs: 60,
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            allowed_origins: "*".to_string(),
            max_batch_size: 10,
        }
    }
}

impl Settings {
    /// Load settings from defaults merged with `EXPLAINER_*` environment
    /// variables, then validate.
    pub fn load() -> Result<Self> {
        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ExplainError::Config(format!("configuration error: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate credential and generation parameter ranges.
    /// Any violation is fatal at startup.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() || self.api_key == PLACEHOLDER_API_KEY {
            return Err(ExplainError::Config(format!(
                "{}API_KEY must be set to a real provider API key",
                ENV_PREFIX
            )));
        }

        if !(100..=8000).contains(&self.max_tokens) {
            return Err(ExplainError::Config(format!(
                "max_tokens must be between 100 and 8000, got {}",
                self.max_tokens
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ExplainError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ExplainError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.max_batch_size == 0 {
            return Err(ExplainError::Config(
                "max_batch_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Allowed CORS origins as a list.
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.origins().iter().any(|o| o == "*")
    }
}

// =============================================================================
// Tests
// =============================================================================

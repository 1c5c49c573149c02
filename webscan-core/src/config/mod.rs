//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration (serializable version)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfigSerializable {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Base unit of the quadratic backoff (in milliseconds)
    pub base_delay_ms: u64,
    /// Scale of the random jitter added to each backoff
    pub jitter_multiplier: f64,
}

impl Default for RetryConfigSerializable {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 1000,
            jitter_multiplier: 2.0,
        }
    }
}

impl RetryConfigSerializable {
    /// Convert to the runtime RetryConfig
    pub fn to_retry_config(&self) -> crate::infrastructure::resilience::RetryConfig {
        crate::infrastructure::resilience::RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            jitter_multiplier: self.jitter_multiplier,
        }
    }
}

/// Scanner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub osv: OsvConfig,
    pub github: GitHubConfig,
    pub logging: LoggingConfig,
}

/// OSV vulnerability database client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OsvConfig {
    /// Batch query endpoint
    pub query_url: String,
    /// Endpoint prefix for full records, the id is appended as a path segment
    pub vulns_url: String,
    /// Upper bound on queries per batch request, enforced by the API
    pub max_queries_per_request: usize,
    /// Upper bound on concurrent hydration requests
    pub max_concurrent_requests: usize,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub retry: RetryConfigSerializable,
}

impl Default for OsvConfig {
    fn default() -> Self {
        Self {
            query_url: "https://api.osv.dev/v1/querybatch".to_string(),
            vulns_url: "https://api.osv.dev/v1/vulns".to_string(),
            max_queries_per_request: 1000,
            max_concurrent_requests: 25,
            timeout_seconds: 30,
            user_agent: "web-scan".to_string(),
            retry: RetryConfigSerializable::default(),
        }
    }
}

/// GitHub contents API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            timeout_seconds: 30,
            user_agent: "web-scan".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// One of `json`, `pretty` or `compact`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.osv.validate()?;
        self.github.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Local overrides and environment variables win over everything else
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("WEBSCAN").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}

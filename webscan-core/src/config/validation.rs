//! Configuration validation module

use crate::config::{GitHubConfig, LoggingConfig, OsvConfig, RetryConfigSerializable};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("API configuration error: {message}")]
    Api { message: String },

    #[error("Logging configuration error: {message}")]
    Logging { message: String },
}

impl ValidationError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}

fn validate_http_url(name: &str, url: &str) -> Result<(), ValidationError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::api(format!(
            "{} must start with http:// or https://, got: {}",
            name, url
        )));
    }
    Ok(())
}

impl Validate for RetryConfigSerializable {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::api(
                "retry max_attempts must be greater than 0",
            ));
        }

        if !self.jitter_multiplier.is_finite() || self.jitter_multiplier < 0.0 {
            return Err(ValidationError::api(format!(
                "retry jitter_multiplier must be a non-negative number, got: {}",
                self.jitter_multiplier
            )));
        }

        Ok(())
    }
}

impl Validate for OsvConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_http_url("OSV query_url", &self.query_url)?;
        validate_http_url("OSV vulns_url", &self.vulns_url)?;

        if self.max_queries_per_request == 0 {
            return Err(ValidationError::api(
                "OSV max_queries_per_request must be greater than 0",
            ));
        }

        if self.max_concurrent_requests == 0 {
            return Err(ValidationError::api(
                "OSV max_concurrent_requests must be greater than 0",
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(ValidationError::api(
                "OSV timeout must be greater than 0 seconds",
            ));
        }

        self.retry.validate()
    }
}

impl Validate for GitHubConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_http_url("GitHub base_url", &self.base_url)?;

        if self.timeout_seconds == 0 {
            return Err(ValidationError::api(
                "GitHub timeout must be greater than 0 seconds",
            ));
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.level.trim().is_empty() {
            return Err(ValidationError::logging("log level cannot be empty"));
        }

        match self.format.as_str() {
            "json" | "pretty" | "compact" => Ok(()),
            other => Err(ValidationError::logging(format!(
                "log format must be one of json, pretty, compact; got: {}",
                other
            ))),
        }
    }
}

//! Error types shared by every layer of the scanner

use thiserror::Error;

/// Manifest content does not match the schema its parser expects
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid {manifest} content in {path}: {message}")]
    Format {
        manifest: String,
        path: String,
        message: String,
    },
}

impl ParseError {
    pub fn format(
        manifest: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Format {
            manifest: manifest.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors reported by the remote vulnerability database
#[derive(Debug, Error)]
pub enum ApiError {
    /// Terminal non-200 response; `message` holds the response body
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("undecodable response: {message}")]
    Decode { message: String },
}

/// Failures of the vulnerability query pipeline
#[derive(Debug, Error)]
pub enum VulnerabilityError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("package {package} does not have a commit, PURL or ecosystem/name/version identifier")]
    Identity { package: String },

    #[error("hydration task failed: {message}")]
    TaskFailed { message: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl VulnerabilityError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Api(ApiError::Http {
            status,
            message: message.into(),
        })
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Api(ApiError::Decode {
            message: message.into(),
        })
    }
}

/// Failures while listing or downloading repository content
#[derive(Debug, Error)]
pub enum RepositorySourceError {
    #[error("path not found: {path}")]
    NotFound { path: String },

    #[error("repository host returned HTTP {status} for {path}: {message}")]
    Http {
        path: String,
        status: u16,
        message: String,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not decode content of {path}: {message}")]
    Decode { path: String, message: String },

    #[error("invalid repository locator: {message}")]
    InvalidLocator { message: String },
}

pub type RepositorySourceResult<T> = Result<T, RepositorySourceError>;

/// Terminal error of a scan; the caller receives either a full report or one of these
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("manifest parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("no parser registered for manifest {filename}")]
    UnsupportedManifest { filename: String },

    #[error("repository traversal failed: {0}")]
    Traversal(#[from] RepositorySourceError),

    #[error("package {package} has no queryable identity")]
    Identity { package: String },

    #[error("API query failed: {0}")]
    Api(VulnerabilityError),

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl From<VulnerabilityError> for ApplicationError {
    fn from(err: VulnerabilityError) -> Self {
        match err {
            VulnerabilityError::Identity { package } => Self::Identity { package },
            other => Self::Api(other),
        }
    }
}

impl ApplicationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the error came from the remote vulnerability database
    pub fn is_api_failure(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

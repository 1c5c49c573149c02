//! Vulnerability domain value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Package-naming authority a package belongs to, as the OSV schema spells it
///
/// Ecosystems are open-ended strings and may be colon-qualified
/// (`Debian:11`, `Alpine:v3.18`); [`Ecosystem::base`] strips the qualifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ecosystem(String);

impl Ecosystem {
    pub const NPM: &'static str = "npm";
    pub const PYPI: &'static str = "PyPI";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn npm() -> Self {
        Self::new(Self::NPM)
    }

    pub fn pypi() -> Self {
        Self::new(Self::PYPI)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_qualified(&self) -> bool {
        self.0.contains(':')
    }

    /// The ecosystem without its `:release` qualifier
    pub fn base(&self) -> Ecosystem {
        match self.0.split_once(':') {
            Some((base, _)) => Self::new(base),
            None => self.clone(),
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ecosystem {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Ordinal severity bucket reported to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityCategory {
    Low,
    Moderate,
    High,
}

impl SeverityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl fmt::Display for SeverityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of score carried by an OSV `severity` entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityType {
    #[serde(rename = "CVSS_V2")]
    CvssV2,
    #[serde(rename = "CVSS_V3")]
    CvssV3,
    #[serde(rename = "CVSS_V4")]
    CvssV4,
    #[serde(other)]
    Unknown,
}

/// Kind of version range in an OSV `affected` entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RangeType {
    Semver,
    Ecosystem,
    Git,
    #[serde(other)]
    Unknown,
}

/// Dependency group tags assigned by the npm lockfile parser
pub mod dep_groups {
    pub const DEV: &str = "dev";
    pub const OPTIONAL: &str = "optional";
}

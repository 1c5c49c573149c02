//! Per-source scan results before they are turned into a report

use serde::{Deserialize, Serialize};
use std::fmt;

use webscan_core::domain::vulnerability::{
    entities::{GroupInfo, PackageDetails, Vulnerability},
    value_objects::Ecosystem,
};

/// Source type of a manifest that went through a parser
pub const LOCKFILE_SOURCE: &str = "lockfile";
/// Source type of a discovered file that is reported without findings
pub const FILE_SOURCE: &str = "file";

/// Where a set of packages came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceInfo {
    pub path: String,
    #[serde(rename = "type")]
    pub source_type: String,
}

impl SourceInfo {
    pub fn new(path: impl Into<String>, source_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source_type: source_type.into(),
        }
    }

    pub fn lockfile(path: impl Into<String>) -> Self {
        Self::new(path, LOCKFILE_SOURCE)
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_type, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub ecosystem: Ecosystem,
}

impl From<&PackageDetails> for PackageInfo {
    fn from(package: &PackageDetails) -> Self {
        Self {
            name: package.name.clone(),
            version: package.version.clone(),
            ecosystem: package.ecosystem.clone(),
        }
    }
}

/// A package together with every vulnerability affecting it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageVulns {
    pub package: PackageInfo,
    #[serde(default)]
    pub dep_groups: Vec<String>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    /// Alias groups covering `vulnerabilities`
    #[serde(default)]
    pub groups: Vec<GroupInfo>,
}

impl PackageVulns {
    /// Group covering the given vulnerability id
    pub fn group_for(&self, id: &str) -> Option<&GroupInfo> {
        self.groups.iter().find(|group| group.ids.iter().any(|member| member == id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSource {
    pub source: SourceInfo,
    #[serde(default)]
    pub packages: Vec<PackageVulns>,
}

/// Results of a scan, one entry per manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityResults {
    pub results: Vec<PackageSource>,
}

/// One (source, package, vulnerability) row
#[derive(Debug, Clone, PartialEq)]
pub struct VulnerabilityFlattened {
    pub source: SourceInfo,
    pub package: PackageInfo,
    pub dep_groups: Vec<String>,
    pub vulnerability: Vulnerability,
    pub group_info: Option<GroupInfo>,
}

impl VulnerabilityResults {
    pub fn flatten(&self) -> Vec<VulnerabilityFlattened> {
        let mut rows = Vec::new();
        for source in &self.results {
            for package in &source.packages {
                for vulnerability in &package.vulnerabilities {
                    rows.push(VulnerabilityFlattened {
                        source: source.source.clone(),
                        package: package.package.clone(),
                        dep_groups: package.dep_groups.clone(),
                        vulnerability: vulnerability.clone(),
                        group_info: package.group_for(&vulnerability.id).cloned(),
                    });
                }
            }
        }
        rows
    }

    pub fn contains_source(&self, path: &str) -> bool {
        self.results.iter().any(|result| result.source.path == path)
    }
}

//! Scan report handed to the persistence layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use webscan_core::domain::vulnerability::{
    entities::{Reference, Vulnerability},
    value_objects::{Ecosystem, SeverityCategory},
};

use super::results::{PackageInfo, SourceInfo};

/// Outcome of scanning one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub repo_id: i64,
    /// Paths of every discovered manifest, in walk order
    pub files: Vec<String>,
    pub sources: Vec<SourceReport>,
    pub counts: SeverityCounts,
}

impl ScanReport {
    pub fn source(&self, path: &str) -> Option<&SourceReport> {
        self.sources.iter().find(|source| source.path == path)
    }

    pub fn vulnerability_count(&self) -> usize {
        self.sources
            .iter()
            .flat_map(|source| &source.packages)
            .map(|package| package.vulnerabilities.len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub path: String,
    #[serde(rename = "type")]
    pub source_type: String,
    /// Empty when the manifest was scanned and nothing was found
    pub packages: Vec<ReportedPackage>,
}

impl From<&SourceInfo> for SourceReport {
    fn from(source: &SourceInfo) -> Self {
        Self {
            path: source.path.clone(),
            source_type: source.source_type.clone(),
            packages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedPackage {
    pub name: String,
    pub version: String,
    pub ecosystem: Ecosystem,
    #[serde(default)]
    pub dependency_groups: Vec<String>,
    pub vulnerabilities: Vec<ReportedVulnerability>,
}

impl ReportedPackage {
    pub fn new(package: &PackageInfo, dependency_groups: Vec<String>) -> Self {
        Self {
            name: package.name.clone(),
            version: package.version.clone(),
            ecosystem: package.ecosystem.clone(),
            dependency_groups,
            vulnerabilities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedVulnerability {
    pub id: String,
    pub modified: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
    pub summary: String,
    pub details: String,
    pub severity: SeverityCategory,
    pub references: Vec<Reference>,
    pub aliases: Vec<String>,
}

impl ReportedVulnerability {
    pub fn new(vulnerability: &Vulnerability, severity: SeverityCategory) -> Self {
        Self {
            id: vulnerability.id.clone(),
            modified: vulnerability.modified,
            published: vulnerability.published,
            summary: vulnerability.summary.clone(),
            details: vulnerability.details.clone(),
            severity,
            references: vulnerability.references.clone(),
            aliases: vulnerability.aliases.clone(),
        }
    }
}

/// Number of reported findings per severity bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub low: u64,
    pub moderate: u64,
    pub high: u64,
}

impl SeverityCounts {
    pub fn record(&mut self, category: SeverityCategory) {
        match category {
            SeverityCategory::Low => self.low += 1,
            SeverityCategory::Moderate => self.moderate += 1,
            SeverityCategory::High => self.high += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.low + self.moderate + self.high
    }
}

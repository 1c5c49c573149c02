//! Vulnerability domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::query::QueryIdentity;
use super::value_objects::{Ecosystem, RangeType, SeverityType};

/// A single resolved dependency read from a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDetails {
    /// Package name as the ecosystem spells it (PyPI names are PEP-503 normalized)
    pub name: String,
    /// Resolved version; empty when the manifest pins a commit or a local path
    pub version: String,
    /// Naming authority the package belongs to
    pub ecosystem: Ecosystem,
    /// Ecosystem used for comparisons when `ecosystem` is colon-qualified
    pub compare_as: Ecosystem,
    /// VCS commit the dependency is pinned to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Package URL identity, if the manifest provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
    /// Dependency group tags (dev, optional, requirements file stem)
    #[serde(default)]
    pub dep_groups: Vec<String>,
}

impl PackageDetails {
    pub fn new(name: impl Into<String>, version: impl Into<String>, ecosystem: Ecosystem) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            compare_as: ecosystem.base(),
            ecosystem,
            commit: None,
            purl: None,
            dep_groups: Vec::new(),
        }
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn with_purl(mut self, purl: impl Into<String>) -> Self {
        self.purl = Some(purl.into());
        self
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for group in groups {
            self.add_group(group);
        }
        self
    }

    /// Adds a dependency group tag unless it is already present
    pub fn add_group(&mut self, group: impl Into<String>) {
        let group = group.into();
        if !self.dep_groups.contains(&group) {
            self.dep_groups.push(group);
        }
    }

    /// Key under which duplicates collapse: `name@commit` when pinned to a commit, else `name@version`
    pub fn dedup_key(&self) -> String {
        match &self.commit {
            Some(commit) => format!("{}@{}", self.name, commit),
            None => format!("{}@{}", self.name, self.version),
        }
    }

    /// Whether the package can be expressed as any vulnerability-database query identity
    pub fn has_queryable_identity(&self) -> bool {
        QueryIdentity::for_package(self).is_some()
    }
}

/// Packages extracted from one manifest file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockfile {
    pub file_path: String,
    /// Registry key of the parser that produced the packages
    pub parsed_as: String,
    /// Sorted by name, then version, deduplicated by [`PackageDetails::dedup_key`]
    pub packages: Vec<PackageDetails>,
}

/// A manifest discovered in a repository, with its full content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    /// File name, e.g. `package-lock.json`
    pub name: String,
    /// Path relative to the repository root
    pub path: String,
    pub content: String,
}

impl ManifestFile {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: content.into(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Full vulnerability record in the OSV schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawn: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub related: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub affected: Vec<Affected>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub references: Vec<Reference>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity: Vec<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_specific: Option<serde_json::Value>,
}

impl Vulnerability {
    /// Fixed versions per affected package
    ///
    /// Packages in a colon-qualified ecosystem are recorded under the
    /// qualified ecosystem and again under its base ecosystem.
    pub fn fixed_versions(&self) -> HashMap<AffectedPackage, Vec<String>> {
        let mut fixed: HashMap<AffectedPackage, Vec<String>> = HashMap::new();

        for affected in &self.affected {
            let versions: Vec<String> = affected
                .ranges
                .iter()
                .flat_map(|range| range.events.iter())
                .filter_map(|event| event.fixed.clone())
                .collect();

            let mut package = affected.package.clone();
            package.purl = None;

            if package.ecosystem.is_qualified() {
                let base = AffectedPackage {
                    ecosystem: package.ecosystem.base(),
                    ..package.clone()
                };
                fixed.entry(base).or_default().extend(versions.iter().cloned());
            }
            fixed.entry(package).or_default().extend(versions);
        }

        fixed
    }

    /// The record's own id followed by its aliases
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Package named by an `affected` entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffectedPackage {
    pub ecosystem: Ecosystem,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affected {
    pub package: AffectedPackage,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ranges: Vec<Range>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub versions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_specific: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    #[serde(rename = "type")]
    pub range_type: RangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
}

/// One point of a version range; exactly one field is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_affected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type")]
    pub reference_type: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Severity {
    #[serde(rename = "type")]
    pub severity_type: SeverityType,
    pub score: String,
}

/// A set of vulnerability records that describe the same real-world issue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Sorted ids of the member records
    pub ids: Vec<String>,
    /// Sorted, deduplicated union of member aliases and member ids
    pub aliases: Vec<String>,
    /// Highest numeric severity score among the members
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_severity: Option<f64>,
}

impl GroupInfo {
    /// Whether `id` names this group, either as a member id or an alias
    pub fn is_called(&self, id: &str) -> bool {
        self.ids.iter().any(|member| member == id) || self.aliases.iter().any(|alias| alias == id)
    }

    /// Index string used as a stable key for the group
    pub fn index_string(&self) -> String {
        self.ids.join(",")
    }
}

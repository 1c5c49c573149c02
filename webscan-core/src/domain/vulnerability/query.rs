//! Vulnerability database query model
//!
//! A query identifies a package in exactly one of three ways. The
//! serialized forms match the OSV batch protocol:
//!
//! ```text
//! {"package": {"name": "lodash", "ecosystem": "npm"}, "version": "4.17.20"}
//! {"commit": "9a6c3b1..."}
//! {"package": {"purl": "pkg:npm/lodash@4.17.20"}}
//! ```

use serde::{Deserialize, Serialize};

use super::entities::PackageDetails;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageCoordinates {
    pub name: String,
    pub ecosystem: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageUrl {
    pub purl: String,
}

/// The identity part of a query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryIdentity {
    Commit {
        commit: String,
    },
    Package {
        package: PackageCoordinates,
        version: String,
    },
    Purl {
        package: PackageUrl,
    },
}

impl QueryIdentity {
    /// Picks the identity for a package: coordinates, then commit, then package URL
    pub fn for_package(package: &PackageDetails) -> Option<Self> {
        if !package.ecosystem.is_empty() && !package.name.is_empty() && !package.version.is_empty()
        {
            return Some(Self::Package {
                package: PackageCoordinates {
                    name: package.name.clone(),
                    ecosystem: package.ecosystem.to_string(),
                },
                version: package.version.clone(),
            });
        }
        if let Some(commit) = package.commit.as_ref().filter(|c| !c.is_empty()) {
            return Some(Self::Commit {
                commit: commit.clone(),
            });
        }
        package
            .purl
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(|purl| Self::Purl {
                package: PackageUrl { purl: purl.clone() },
            })
    }
}

/// One query of a batch; `source` and `dep_groups` travel with it but never reach the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    #[serde(flatten)]
    pub identity: QueryIdentity,
    #[serde(skip)]
    pub source: Option<String>,
    #[serde(skip)]
    pub dep_groups: Vec<String>,
}

impl Query {
    pub fn new(identity: QueryIdentity) -> Self {
        Self {
            identity,
            source: None,
            dep_groups: Vec::new(),
        }
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Query {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchedQuery {
    pub queries: Vec<Query>,
}

/// Vulnerability reference as returned by the batch endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalVulnerability {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalResponse {
    #[serde(default)]
    pub vulns: Vec<MinimalVulnerability>,
}

/// Batch response; `results[i]` answers `queries[i]` of the request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchedResponse {
    #[serde(default)]
    pub results: Vec<MinimalResponse>,
}

//! Test data fixtures for webscan-deps

use serde_json::json;
use webscan_core::domain::vulnerability::{
    entities::{PackageDetails, Vulnerability},
    value_objects::Ecosystem,
};
use webscan_core::infrastructure::repository_source::RepositoryLocator;

pub fn test_locator() -> RepositoryLocator {
    RepositoryLocator::new("octo", "webapp", "test-token", 42)
}

pub fn npm_package(name: &str, version: &str) -> PackageDetails {
    PackageDetails::new(name, version, Ecosystem::npm())
}

/// Minimal vulnerability record with the given aliases
pub fn vulnerability(id: &str, aliases: &[&str]) -> Vulnerability {
    serde_json::from_value(json!({
        "id": id,
        "aliases": aliases,
        "summary": format!("Summary of {}", id),
    }))
    .expect("valid vulnerability fixture")
}

/// Vulnerability record carrying a numeric CVSS v3 score
pub fn scored_vulnerability(id: &str, aliases: &[&str], score: &str) -> Vulnerability {
    serde_json::from_value(json!({
        "id": id,
        "aliases": aliases,
        "modified": "2024-01-10T08:00:00Z",
        "published": "2023-12-01T12:30:00Z",
        "summary": format!("Summary of {}", id),
        "details": "Details",
        "severity": [{ "type": "CVSS_V3", "score": score }],
        "references": [{ "type": "ADVISORY", "url": format!("https://osv.dev/vulnerability/{}", id) }],
    }))
    .expect("valid vulnerability fixture")
}

pub fn lodash_lock_v1() -> &'static str {
    r#"{"lockfileVersion":1,"dependencies":{"lodash":{"version":"4.17.20"}}}"#
}

/// v3 lockfile with one local `file:` dependency that cannot be queried
pub fn package_lock_v3() -> &'static str {
    r#"{
  "name": "storefront",
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "storefront", "version": "1.0.0" },
    "node_modules/express": { "version": "4.18.2" },
    "node_modules/minimist": { "version": "1.2.5", "dev": true },
    "node_modules/shared-ui": { "version": "", "resolved": "file:../shared-ui" }
  }
}"#
}

pub fn requirements_txt() -> &'static str {
    "Flask==2.0.1  # pinned\npytest>=7.0\n"
}

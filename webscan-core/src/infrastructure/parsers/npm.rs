//! Parser for npm `package-lock.json` files

use serde::Deserialize;
use std::collections::HashMap;

use super::commit::try_extract_commit;
use super::traits::ManifestParser;
use crate::application::errors::ParseError;
use crate::domain::vulnerability::{
    entities::{ManifestFile, PackageDetails},
    value_objects::{Ecosystem, dep_groups},
};

/// Entry of the nested `dependencies` tree (lockfileVersion 1)
#[derive(Debug, Deserialize)]
struct NpmLockDependency {
    #[serde(default)]
    version: String,
    #[serde(default)]
    dependencies: Option<HashMap<String, NpmLockDependency>>,
    #[serde(default)]
    dev: bool,
    #[serde(default)]
    optional: bool,
}

impl NpmLockDependency {
    fn dep_groups(&self) -> Vec<&'static str> {
        match (self.dev, self.optional) {
            (true, true) => vec![dep_groups::DEV, dep_groups::OPTIONAL],
            (true, false) => vec![dep_groups::DEV],
            (false, true) => vec![dep_groups::OPTIONAL],
            (false, false) => Vec::new(),
        }
    }
}

/// Entry of the flat `packages` map (lockfileVersion 2 and later)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NpmLockPackage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    resolved: Option<String>,
    #[serde(default)]
    dev: bool,
    #[serde(default)]
    dev_optional: bool,
    #[serde(default)]
    optional: bool,
}

impl NpmLockPackage {
    fn dep_groups(&self) -> Vec<&'static str> {
        if self.dev {
            vec![dep_groups::DEV]
        } else if self.optional {
            vec![dep_groups::OPTIONAL]
        } else if self.dev_optional {
            vec![dep_groups::DEV, dep_groups::OPTIONAL]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NpmLockfile {
    #[serde(default)]
    lockfile_version: Option<u32>,
    #[serde(default)]
    dependencies: Option<HashMap<String, NpmLockDependency>>,
    #[serde(default)]
    packages: Option<HashMap<String, NpmLockPackage>>,
}

/// Parser for package-lock.json files
pub struct PackageLockParser;

impl Default for PackageLockParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageLockParser {
    pub fn new() -> Self {
        Self
    }

    /// Walk the v1 dependency tree, nested entries first
    fn parse_dependencies(
        dependencies: &HashMap<String, NpmLockDependency>,
        out: &mut Vec<PackageDetails>,
    ) {
        for (key, detail) in dependencies {
            if let Some(nested) = &detail.dependencies {
                Self::parse_dependencies(nested, out);
            }

            let mut name = key.as_str();
            let mut version = detail.version.as_str();

            // npm:<name>@<version> aliases the real package
            if let Some(alias) = detail.version.strip_prefix("npm:") {
                if let Some((aliased_name, aliased_version)) = alias.rsplit_once('@') {
                    name = aliased_name;
                    version = aliased_version;
                }
            }

            let package = if detail.version.starts_with("file:") {
                PackageDetails::new(name, "", Ecosystem::npm())
            } else {
                match try_extract_commit(&detail.version) {
                    Some(commit) => PackageDetails::new(name, "", Ecosystem::npm()).with_commit(commit),
                    None => PackageDetails::new(name, version, Ecosystem::npm()),
                }
            };

            out.push(package.with_groups(detail.dep_groups()));
        }
    }

    /// Read the flat v2+ package map; the root entry (empty key) is skipped
    fn parse_packages(packages: &HashMap<String, NpmLockPackage>, out: &mut Vec<PackageDetails>) {
        for (path, detail) in packages {
            if path.is_empty() {
                continue;
            }

            let name = match detail.name.as_deref().filter(|n| !n.is_empty()) {
                Some(name) => name.to_string(),
                None => package_name_from_path(path),
            };
            let version = detail.version.clone().unwrap_or_default();

            let mut package = PackageDetails::new(name, version, Ecosystem::npm());
            if let Some(commit) = detail.resolved.as_deref().and_then(try_extract_commit) {
                package = package.with_commit(commit);
            }

            out.push(package.with_groups(detail.dep_groups()));
        }
    }
}

/// Package name from a `node_modules/...` path, keeping an `@scope/` prefix
fn package_name_from_path(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let name = segments.next().unwrap_or(path);
    match segments.next() {
        Some(scope) if scope.starts_with('@') => format!("{}/{}", scope, name),
        _ => name.to_string(),
    }
}

impl ManifestParser for PackageLockParser {
    fn parse_file(&self, file: &ManifestFile) -> Result<Vec<PackageDetails>, ParseError> {
        let lockfile: NpmLockfile = serde_json::from_str(&file.content)
            .map_err(|e| ParseError::format("package-lock.json", &file.path, e.to_string()))?;

        let mut packages = Vec::new();
        match (&lockfile.packages, &lockfile.dependencies) {
            (Some(pkgs), _) => Self::parse_packages(pkgs, &mut packages),
            (None, Some(deps)) => Self::parse_dependencies(deps, &mut packages),
            (None, None) => {}
        }

        tracing::debug!(
            path = %file.path,
            count = packages.len(),
            lockfile_version = ?lockfile.lockfile_version,
            "Parsed npm lockfile entries"
        );

        Ok(packages)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::npm()
    }
}

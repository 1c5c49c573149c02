//! Manifest parsers
//!
//! Parsers turn raw manifest text into [`PackageDetails`]. The
//! [`ParserRegistry`] maps exact file names to a [`ManifestKind`], and
//! [`extract_lockfile`] runs the matching parser and normalizes its output.

pub mod commit;
pub mod npm;
pub mod python;
pub mod traits;

pub use commit::try_extract_commit;
pub use npm::PackageLockParser;
pub use python::{RequirementsTxtParser, parse_requirements_files};
pub use traits::{ManifestKind, ManifestParser, ParserRegistry};

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::application::errors::ApplicationError;
use crate::domain::vulnerability::entities::{Lockfile, ManifestFile, PackageDetails};

fn compare_packages(a: &PackageDetails, b: &PackageDetails) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| a.version.cmp(&b.version))
        .then_with(|| a.commit.cmp(&b.commit))
}

/// Deduplicate by [`PackageDetails::dedup_key`] and sort by name, then version
///
/// Duplicates are merged into the first occurrence, which gains their
/// dependency groups.
pub fn normalize_packages(packages: Vec<PackageDetails>) -> Vec<PackageDetails> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(packages.len());
    let mut unique: Vec<PackageDetails> = Vec::with_capacity(packages.len());

    for package in packages {
        match positions.get(&package.dedup_key()) {
            Some(&idx) => {
                for group in package.dep_groups {
                    unique[idx].add_group(group);
                }
            }
            None => {
                positions.insert(package.dedup_key(), unique.len());
                unique.push(package);
            }
        }
    }

    unique.sort_by(compare_packages);
    unique
}

/// Parse a manifest with the parser registered for its file name
pub fn extract_lockfile(
    registry: &ParserRegistry,
    file: &ManifestFile,
) -> Result<Lockfile, ApplicationError> {
    let kind = registry
        .kind_for(&file.name)
        .ok_or_else(|| ApplicationError::UnsupportedManifest {
            filename: file.name.clone(),
        })?;

    let packages = kind.parse(file)?;

    tracing::info!(
        path = %file.path,
        parsed_as = kind.filename(),
        count = packages.len(),
        "Extracted packages from manifest"
    );

    Ok(Lockfile {
        file_path: file.path.clone(),
        parsed_as: kind.filename().to_string(),
        packages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vulnerability::value_objects::Ecosystem;

    #[test]
    fn test_normalize_sorts_and_merges_groups() {
        let packages = vec![
            PackageDetails::new("zod", "3.0.0", Ecosystem::npm()),
            PackageDetails::new("axios", "1.0.0", Ecosystem::npm()).with_groups(["dev"]),
            PackageDetails::new("axios", "0.27.0", Ecosystem::npm()),
            PackageDetails::new("axios", "1.0.0", Ecosystem::npm()).with_groups(["optional"]),
        ];

        let normalized = normalize_packages(packages);
        let keys: Vec<String> = normalized.iter().map(|p| p.dedup_key()).collect();
        assert_eq!(keys, vec!["axios@0.27.0", "axios@1.0.0", "zod@3.0.0"]);
        assert_eq!(normalized[1].dep_groups, vec!["dev", "optional"]);
    }

    #[test]
    fn test_commit_pinned_packages_are_distinct_from_versions() {
        let packages = vec![
            PackageDetails::new("dep", "1.0.0", Ecosystem::npm()).with_commit("abc"),
            PackageDetails::new("dep", "1.0.0", Ecosystem::npm()),
            PackageDetails::new("dep", "2.0.0", Ecosystem::npm()).with_commit("abc"),
        ];
        let normalized = normalize_packages(packages);
        assert_eq!(normalized.len(), 2);
    }

    #[test]
    fn test_extract_lockfile_dispatches_by_name() {
        let registry = ParserRegistry::new();
        let file = ManifestFile::new(
            "package-lock.json",
            "web/package-lock.json",
            r#"{"lockfileVersion":1,"dependencies":{"lodash":{"version":"4.17.20"}}}"#,
        );

        let lockfile = extract_lockfile(&registry, &file).unwrap();
        assert_eq!(lockfile.file_path, "web/package-lock.json");
        assert_eq!(lockfile.parsed_as, "package-lock.json");
        assert_eq!(lockfile.packages.len(), 1);
    }

    #[test]
    fn test_extract_lockfile_rejects_unknown_manifest() {
        let registry = ParserRegistry::new();
        let file = ManifestFile::new("Cargo.lock", "Cargo.lock", "");
        let err = extract_lockfile(&registry, &file).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::UnsupportedManifest { ref filename } if filename == "Cargo.lock"
        ));
    }

    #[test]
    fn test_extract_lockfile_surfaces_format_errors() {
        let registry = ParserRegistry::new();
        let file = ManifestFile::new("package-lock.json", "package-lock.json", "{");
        let err = extract_lockfile(&registry, &file).unwrap_err();
        assert!(matches!(err, ApplicationError::Parse(_)));
    }
}

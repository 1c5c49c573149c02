//! Traits for manifest parsers and the registry that selects them

use std::collections::HashMap;

use crate::application::errors::ParseError;
use crate::domain::vulnerability::{
    entities::{ManifestFile, PackageDetails},
    value_objects::Ecosystem,
};

use super::normalize_packages;
use super::npm::PackageLockParser;
use super::python::RequirementsTxtParser;

/// Trait for parsing dependency manifests
pub trait ManifestParser: Send + Sync {
    /// Parse the manifest into packages, duplicates included
    fn parse_file(&self, file: &ManifestFile) -> Result<Vec<PackageDetails>, ParseError>;

    /// Get the ecosystem this parser handles
    fn ecosystem(&self) -> Ecosystem;
}

/// Supported manifest kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    NpmLock,
    RequirementsTxt,
}

impl ManifestKind {
    pub const ALL: [ManifestKind; 2] = [ManifestKind::NpmLock, ManifestKind::RequirementsTxt];

    /// File name this kind is registered under; also recorded as `Lockfile::parsed_as`
    pub fn filename(&self) -> &'static str {
        match self {
            Self::NpmLock => "package-lock.json",
            Self::RequirementsTxt => "requirements.txt",
        }
    }

    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            Self::NpmLock => PackageLockParser.ecosystem(),
            Self::RequirementsTxt => RequirementsTxtParser.ecosystem(),
        }
    }

    /// Parse a manifest of this kind into a sorted, deduplicated package list
    pub fn parse(&self, file: &ManifestFile) -> Result<Vec<PackageDetails>, ParseError> {
        let packages = match self {
            Self::NpmLock => PackageLockParser.parse_file(file)?,
            Self::RequirementsTxt => RequirementsTxtParser.parse_file(file)?,
        };
        Ok(normalize_packages(packages))
    }
}

/// Exact-filename index of the manifest kinds a scan understands
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    index: HashMap<String, ManifestKind>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserRegistry {
    /// Registry with every supported manifest kind
    pub fn new() -> Self {
        Self::with_kinds(ManifestKind::ALL)
    }

    pub fn with_kinds(kinds: impl IntoIterator<Item = ManifestKind>) -> Self {
        let index = kinds
            .into_iter()
            .map(|kind| (kind.filename().to_string(), kind))
            .collect();
        Self { index }
    }

    pub fn kind_for(&self, filename: &str) -> Option<ManifestKind> {
        self.index.get(filename).copied()
    }

    pub fn is_supported(&self, filename: &str) -> bool {
        self.index.contains_key(filename)
    }

    /// Registered file names, sorted
    pub fn filenames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_matches_exact_filenames() {
        let registry = ParserRegistry::new();
        assert_eq!(
            registry.kind_for("package-lock.json"),
            Some(ManifestKind::NpmLock)
        );
        assert_eq!(
            registry.kind_for("requirements.txt"),
            Some(ManifestKind::RequirementsTxt)
        );
        assert!(!registry.is_supported("requirements-dev.txt"));
        assert!(!registry.is_supported("frontend/package-lock.json"));
        assert_eq!(
            registry.filenames(),
            vec!["package-lock.json", "requirements.txt"]
        );
    }

    #[test]
    fn test_registry_can_be_restricted() {
        let registry = ParserRegistry::with_kinds([ManifestKind::RequirementsTxt]);
        assert!(registry.is_supported("requirements.txt"));
        assert!(!registry.is_supported("package-lock.json"));
    }

    #[test]
    fn test_kind_ecosystems() {
        assert_eq!(ManifestKind::NpmLock.ecosystem(), Ecosystem::npm());
        assert_eq!(ManifestKind::RequirementsTxt.ecosystem(), Ecosystem::pypi());
    }
}

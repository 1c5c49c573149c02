//! Property-based tests for parsers

use proptest::prelude::*;
use webscan_core::domain::vulnerability::entities::ManifestFile;
use webscan_core::infrastructure::parsers::{ManifestKind, normalize_packages};
use webscan_core::infrastructure::parsers::python::normalize_requirement_name;

proptest! {
    #[test]
    fn test_package_lock_parsing_doesnt_crash(content in ".*") {
        let file = ManifestFile::new("package-lock.json", "package-lock.json", content);
        let _ = ManifestKind::NpmLock.parse(&file);
    }

    #[test]
    fn test_requirements_parsing_never_fails(content in ".*") {
        let file = ManifestFile::new("requirements.txt", "requirements.txt", content);
        prop_assert!(ManifestKind::RequirementsTxt.parse(&file).is_ok());
    }

    #[test]
    fn test_v1_lockfile_parsing_is_sorted_and_unique(
        deps in proptest::collection::btree_map("[a-z][a-z0-9-]{0,12}", r"[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{1,2}", 0..20)
    ) {
        let entries: Vec<String> = deps
            .iter()
            .map(|(name, version)| format!(r#""{}": {{"version": "{}"}}"#, name, version))
            .collect();
        let content = format!(r#"{{"lockfileVersion": 1, "dependencies": {{{}}}}}"#, entries.join(","));
        let file = ManifestFile::new("package-lock.json", "package-lock.json", content);

        let packages = ManifestKind::NpmLock.parse(&file).unwrap();
        prop_assert_eq!(packages.len(), deps.len());
        prop_assert!(packages.windows(2).all(|w| w[0].name <= w[1].name));

        let reparsed = normalize_packages(packages.clone());
        prop_assert_eq!(reparsed, packages);
    }

    #[test]
    fn test_requirement_names_are_normalized(name in "[A-Za-z0-9][A-Za-z0-9._-]{0,20}") {
        let normalized = normalize_requirement_name(&name);
        prop_assert_eq!(normalized.clone(), normalized.to_lowercase());
        prop_assert!(!normalized.contains('_'));
        prop_assert!(!normalized.contains('.'));
        prop_assert!(!normalized.contains("--"));
        prop_assert_eq!(normalize_requirement_name(&normalized), normalized);
    }
}

//! Assembly of per-source results and the final scan report

use std::collections::HashSet;
use tracing::debug;

use webscan_core::domain::vulnerability::entities::{ManifestFile, PackageDetails, Vulnerability};

use crate::domain::{
    FILE_SOURCE, PackageInfo, PackageSource, PackageVulns, ReportedPackage, ReportedVulnerability,
    ScanReport, SeverityCounts, SourceInfo, SourceReport, VulnerabilityResults,
};
use crate::services::{grouper, severity};

/// A package together with the manifest it was parsed from
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedPackage {
    pub package: PackageDetails,
    pub source: SourceInfo,
}

/// Join packages with their hydrated vulnerabilities
///
/// `hits[i]` holds the vulnerabilities of `packages[i]`. Only packages with at
/// least one vulnerability are kept; sources appear in the order their first
/// package does.
pub fn build_vulnerability_results(
    packages: &[ScannedPackage],
    hits: &[Vec<Vulnerability>],
) -> VulnerabilityResults {
    let mut results = VulnerabilityResults::default();

    for (scanned, vulnerabilities) in packages.iter().zip(hits) {
        if vulnerabilities.is_empty() {
            continue;
        }

        let entry = PackageVulns {
            package: PackageInfo::from(&scanned.package),
            dep_groups: scanned.package.dep_groups.clone(),
            vulnerabilities: vulnerabilities.clone(),
            groups: grouper::group_with_severity(vulnerabilities),
        };

        match results
            .results
            .iter_mut()
            .find(|result| result.source == scanned.source)
        {
            Some(result) => result.packages.push(entry),
            None => results.results.push(PackageSource {
                source: scanned.source.clone(),
                packages: vec![entry],
            }),
        }
    }

    results
}

/// Add an empty entry for every manifest that produced no vulnerable package
pub fn add_clean_sources(results: &mut VulnerabilityResults, manifests: &[ManifestFile]) {
    for manifest in manifests {
        if !results.contains_source(&manifest.path) {
            results.results.push(PackageSource {
                source: SourceInfo::new(&manifest.path, FILE_SOURCE),
                packages: Vec::new(),
            });
        }
    }
}

/// Turn results into the report, classifying and counting each finding once
///
/// Within a source, a (package, vulnerability id) pair is reported only the
/// first time it is seen.
pub fn build_report(repo_id: i64, manifests: &[ManifestFile], results: &VulnerabilityResults) -> ScanReport {
    let mut counts = SeverityCounts::default();
    let mut sources = Vec::with_capacity(results.results.len());

    for result in &results.results {
        let mut report = SourceReport::from(&result.source);
        let mut seen: HashSet<(&PackageInfo, &str)> = HashSet::new();

        for package in &result.packages {
            let mut reported = ReportedPackage::new(&package.package, package.dep_groups.clone());

            for vulnerability in &package.vulnerabilities {
                if !seen.insert((&package.package, vulnerability.id.as_str())) {
                    debug!(
                        source = %result.source,
                        package = %package.package.name,
                        id = %vulnerability.id,
                        "Skipping duplicate finding"
                    );
                    continue;
                }

                let category = severity::classify_group(package.group_for(&vulnerability.id));
                counts.record(category);
                reported
                    .vulnerabilities
                    .push(ReportedVulnerability::new(vulnerability, category));
            }

            if !reported.vulnerabilities.is_empty() {
                report.packages.push(reported);
            }
        }

        sources.push(report);
    }

    ScanReport {
        repo_id,
        files: manifests.iter().map(|manifest| manifest.path.clone()).collect(),
        sources,
        counts,
    }
}

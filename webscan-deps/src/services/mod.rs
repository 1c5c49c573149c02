//! Scan services
//!
//! Each stage of a repository scan lives in its own module: discovery,
//! vulnerability lookup, alias grouping, severity scoring and report assembly.

pub mod grouper;
pub mod repository_walker;
pub mod result_assembler;
pub mod severity;
pub mod vulnerability_query;

pub use grouper::{IdAliases, group, group_with_severity};
pub use repository_walker::RepositoryWalker;
pub use result_assembler::{ScannedPackage, add_clean_sources, build_report, build_vulnerability_results};
pub use severity::{classify, cvss_v3_base_score, vulnerability_score};
pub use vulnerability_query::{HydratedResults, VulnerabilityQueryService};

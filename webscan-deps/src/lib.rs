//! webscan Dependency Scanner - Repository vulnerability scanning
//!
//! This crate walks a source repository, parses the dependency manifests it
//! finds and looks every resolved package up in the OSV vulnerability
//! database.
//!
//! # Supported Manifests
//!
//! | Ecosystem | Files |
//! |-----------|-------|
//! | npm | `package-lock.json` (lockfile v1, v2 and v3) |
//! | PyPI | `requirements.txt` |
//!
//! # Features
//!
//! - **Batched Lookup** - Queries chunked to the OSV per-request limit
//! - **Bounded Hydration** - Concurrent record fetches with cancellation on first error
//! - **Alias Grouping** - Records describing the same issue are grouped across databases
//! - **Severity Buckets** - Low / Moderate / High from CVSS scores
//!
//! # Usage
//!
//! ```rust,ignore
//! use webscan_deps::ScanRepositoryUseCase;
//!
//! let use_case = ScanRepositoryUseCase::new(source, osv_client, registry, &config.osv);
//! let report = use_case.execute(&locator).await?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! webscan-deps/
//! ├── domain/         # Scan results and report structures
//! ├── services/       # Walker, query, grouping, severity, assembly
//! └── use_cases.rs    # ScanRepositoryUseCase
//! ```

pub mod domain;
pub mod services;
pub mod use_cases;

pub use domain::*;
pub use services::*;
pub use use_cases::*;

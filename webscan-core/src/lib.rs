//! Webscan Core - Foundation crate for the dependency vulnerability scanner
//!
//! This crate provides the pieces every scan is built from:
//!
//! # Modules
//!
//! - [`config`] - Strongly-typed configuration with file and environment variable support
//! - [`domain`] - Packages, lockfiles, vulnerability records and query identities
//! - [`application`] - Shared error types
//! - [`infrastructure`] - Manifest parsers, the OSV client, retry policy and repository sources
//! - [`logging`] - Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! webscan-core/
//! ├── domain/               # Pure data, no I/O
//! │   └── vulnerability/    # PackageDetails, Vulnerability, GroupInfo, Query
//! ├── application/          # Error taxonomy
//! ├── infrastructure/
//! │   ├── parsers/          # package-lock.json, requirements.txt
//! │   ├── api_clients/      # OSV batch + detail endpoints
//! │   ├── repository_source/# list/download capability, GitHub implementation
//! │   └── resilience.rs     # Retry with quadratic backoff and jitter
//! └── config/               # Configuration management
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use webscan_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `WEBSCAN__` prefix with double underscore separators:
//!
//! ```bash
//! WEBSCAN__OSV__MAX_CONCURRENT_REQUESTS=10
//! WEBSCAN__LOGGING__FORMAT=pretty
//! ```
//!
//! # Logging
//!
//! ```rust,ignore
//! use webscan_core::init_tracing;
//!
//! init_tracing(&config.logging)?;
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;

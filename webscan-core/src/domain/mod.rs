//! Domain Layer - Core entities and value objects
//!
//! Everything here is created fresh per scan and discarded once the report
//! has been assembled.

pub mod vulnerability;

pub use vulnerability::*;

//! Domain models for scan results and reports

pub mod report;
pub mod results;

pub use report::*;
pub use results::*;

//! API clients for the external vulnerability database

pub mod osv;
pub mod traits;

pub use osv::OsvClient;
pub use traits::VulnerabilityApiClient;

//! Packages, vulnerabilities and the queries that connect them

pub mod entities;
pub mod query;
pub mod value_objects;

pub use entities::*;
pub use query::*;
pub use value_objects::*;

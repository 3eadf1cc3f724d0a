//! Command implementations

pub mod config;
pub mod instances;
pub mod provision;
pub mod routes;
pub mod version;

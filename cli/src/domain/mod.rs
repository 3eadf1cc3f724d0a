//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod credential;
pub mod error;
pub mod hosts;
pub mod naming;
pub mod provision;
pub mod proxy;
pub mod workspace;

pub use config::{IplessConfig, validate_config};
pub use credential::Secret;
pub use error::{ConfigError, ErrorKind, ProvisionError, StatusClass};
pub use naming::Domain;
pub use provision::{InstanceRecord, ProvisionRequest, ProvisionResult};
pub use proxy::ProxyRoute;
pub use workspace::Workspace;

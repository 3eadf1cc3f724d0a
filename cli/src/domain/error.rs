//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use serde::Serialize;
use thiserror::Error;

// ── Classification ────────────────────────────────────────────────────────────

/// Stable, machine-readable name of a provisioning failure.
///
/// Serialized in `PascalCase` so the hosting layer can match on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    MissingParameters,
    InvalidCredentialEncoding,
    #[serde(rename = "InvalidRepositoryURL")]
    InvalidRepositoryUrl,
    WorkspaceCollision,
    #[serde(rename = "WorkspaceIOError")]
    WorkspaceIoError,
    FetchFailed,
    NameSpaceExhausted,
    ConfigWriteFailed,
    ProxyConfigInvalid,
    ProxyReloadFailed,
    ResolutionRegistrationFailed,
    LaunchFailed,
    InternalError,
}

impl ErrorKind {
    /// Status class the hosting layer should surface for this kind.
    #[must_use]
    pub fn status(self) -> StatusClass {
        match self {
            Self::MissingParameters | Self::InvalidCredentialEncoding | Self::InvalidRepositoryUrl => {
                StatusClass::ClientError
            }
            _ => StatusClass::ServerError,
        }
    }

    /// Name as it appears on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingParameters => "MissingParameters",
            Self::InvalidCredentialEncoding => "InvalidCredentialEncoding",
            Self::InvalidRepositoryUrl => "InvalidRepositoryURL",
            Self::WorkspaceCollision => "WorkspaceCollision",
            Self::WorkspaceIoError => "WorkspaceIOError",
            Self::FetchFailed => "FetchFailed",
            Self::NameSpaceExhausted => "NameSpaceExhausted",
            Self::ConfigWriteFailed => "ConfigWriteFailed",
            Self::ProxyConfigInvalid => "ProxyConfigInvalid",
            Self::ProxyReloadFailed => "ProxyReloadFailed",
            Self::ResolutionRegistrationFailed => "ResolutionRegistrationFailed",
            Self::LaunchFailed => "LaunchFailed",
            Self::InternalError => "InternalError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome classification paired with every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Success,
    ClientError,
    ServerError,
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors raised by the provisioning pipeline steps.
///
/// `detail` fields carry the external tool's diagnostic output. They never
/// contain the decoded credential: callers redact before constructing.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("missing required parameter(s): {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    #[error("credential is not valid base64-encoded UTF-8")]
    InvalidCredentialEncoding,

    #[error("invalid repository URL '{url}': {reason}")]
    InvalidRepositoryUrl { url: String, reason: String },

    #[error("workspace {path} already exists")]
    WorkspaceCollision { path: String },

    #[error("cannot create workspace {path}")]
    WorkspaceIo { path: String, detail: String },

    #[error("fetching source into {path} failed")]
    FetchFailed { path: String, detail: String },

    #[error("no free subdomain after {attempts} attempts")]
    NameSpaceExhausted { attempts: u32 },

    #[error("cannot write proxy route definition {path}")]
    ConfigWriteFailed { path: String, detail: String },

    #[error("proxy configuration check failed")]
    ProxyConfigInvalid { detail: String },

    #[error("proxy reload failed")]
    ProxyReloadFailed { detail: String },

    #[error("cannot register {domain} in {path}")]
    ResolutionRegistrationFailed {
        domain: String,
        path: String,
        detail: String,
    },

    #[error("cannot start application in {path}")]
    LaunchFailed { path: String, detail: String },
}

impl ProvisionError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameters(_) => ErrorKind::MissingParameters,
            Self::InvalidCredentialEncoding => ErrorKind::InvalidCredentialEncoding,
            Self::InvalidRepositoryUrl { .. } => ErrorKind::InvalidRepositoryUrl,
            Self::WorkspaceCollision { .. } => ErrorKind::WorkspaceCollision,
            Self::WorkspaceIo { .. } => ErrorKind::WorkspaceIoError,
            Self::FetchFailed { .. } => ErrorKind::FetchFailed,
            Self::NameSpaceExhausted { .. } => ErrorKind::NameSpaceExhausted,
            Self::ConfigWriteFailed { .. } => ErrorKind::ConfigWriteFailed,
            Self::ProxyConfigInvalid { .. } => ErrorKind::ProxyConfigInvalid,
            Self::ProxyReloadFailed { .. } => ErrorKind::ProxyReloadFailed,
            Self::ResolutionRegistrationFailed { .. } => ErrorKind::ResolutionRegistrationFailed,
            Self::LaunchFailed { .. } => ErrorKind::LaunchFailed,
        }
    }

    /// Tool diagnostic attached to the error, or an empty string.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::WorkspaceIo { detail, .. }
            | Self::FetchFailed { detail, .. }
            | Self::ConfigWriteFailed { detail, .. }
            | Self::ProxyConfigInvalid { detail }
            | Self::ProxyReloadFailed { detail }
            | Self::ResolutionRegistrationFailed { detail, .. }
            | Self::LaunchFailed { detail, .. } => detail,
            _ => "",
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base domain '{0}': expected a dotted lowercase name such as 'ipless.local'")]
    InvalidBaseDomain(String),

    #[error("Command '{0}' must not be empty")]
    EmptyCommand(&'static str),

    #[error("Command '{key}' must contain the {placeholder} placeholder")]
    MissingPlaceholder {
        key: &'static str,
        placeholder: &'static str,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

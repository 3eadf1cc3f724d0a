//! Request and result types crossing the provisioning boundary.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{ErrorKind, ProvisionError, StatusClass};

/// Raw provisioning input as received from the hosting layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisionRequest {
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default, rename = "repositoryURL")]
    pub repository_url: Option<String>,
}

/// A request whose required fields are present.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedRequest<'a> {
    pub credential: &'a str,
    pub repository_url: &'a str,
}

impl ProvisionRequest {
    #[must_use]
    pub fn new(credential: impl Into<String>, repository_url: impl Into<String>) -> Self {
        Self {
            credential: Some(credential.into()),
            repository_url: Some(repository_url.into()),
        }
    }

    /// Check that both fields are present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::MissingParameters`] naming every missing field.
    pub fn validate(&self) -> Result<ValidatedRequest<'_>, ProvisionError> {
        let credential = non_blank(self.credential.as_deref());
        let repository_url = non_blank(self.repository_url.as_deref());
        match (credential, repository_url) {
            (Some(credential), Some(repository_url)) => Ok(ValidatedRequest {
                credential,
                repository_url,
            }),
            (credential, repository_url) => {
                let mut missing = Vec::new();
                if credential.is_none() {
                    missing.push("credential");
                }
                if repository_url.is_none() {
                    missing.push("repositoryURL");
                }
                Err(ProvisionError::MissingParameters(missing))
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A non-fatal problem reported alongside a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: ErrorKind,
    pub message: String,
}

/// Fields returned for a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionSuccess {
    pub status: StatusClass,
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub workspace_path: String,
    pub full_domain: String,
    pub url: String,
    pub proxy_config_path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Fields returned for a failed run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionFailure {
    pub status: StatusClass,
    pub error_kind: ErrorKind,
    pub message: String,
    pub detail: String,
}

/// The single outcome of a provisioning run.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProvisionResult {
    Success(ProvisionSuccess),
    Failure(ProvisionFailure),
}

impl ProvisionResult {
    #[must_use]
    pub fn failure(kind: ErrorKind, message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Failure(ProvisionFailure {
            status: kind.status(),
            error_kind: kind,
            message: message.into(),
            detail: detail.into(),
        })
    }

    #[must_use]
    pub fn status(&self) -> StatusClass {
        match self {
            Self::Success(s) => s.status,
            Self::Failure(f) => f.status,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Error kind of a failed run.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure(f) => Some(f.error_kind),
        }
    }
}

impl From<&ProvisionError> for ProvisionResult {
    fn from(err: &ProvisionError) -> Self {
        Self::failure(err.kind(), err.to_string(), err.detail())
    }
}

/// A provisioned instance as recorded in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Project ID of the workspace.
    pub id: String,
    pub full_domain: String,
    pub url: String,
    pub workspace_path: String,
    pub proxy_config_path: String,
    pub upstream_port: u16,
    /// PID of the launcher process, when the platform reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Lossy display form of a path for results and records.
#[must_use]
pub fn display_path(path: &Path) -> String {
    path.display().to_string()
}

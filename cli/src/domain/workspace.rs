//! Workspace naming: pure derivation of project identifiers.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! All functions take data in and return data out.

use std::path::{Path, PathBuf};

use crate::domain::error::ProvisionError;

/// Length of the random hex suffix appended to every project ID.
pub const SUFFIX_LEN: usize = 8;

/// A reserved workspace directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Absolute directory holding the fetched source.
    pub path: PathBuf,
    /// `{repo_base_name}_{suffix}`.
    pub project_id: String,
}

/// Derive a human-readable base name from the last path segment of `url`.
///
/// Trailing `/` and `.git` are stripped. Characters outside
/// `[A-Za-z0-9._-]` are replaced with `-` so the name is always a single,
/// safe path component.
///
/// # Errors
///
/// Returns [`ProvisionError::InvalidRepositoryUrl`] if nothing usable remains.
pub fn repo_base_name(url: &str) -> Result<String, ProvisionError> {
    let trimmed = url.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let segment = trimmed.rsplit('/').next().unwrap_or_default();

    let name: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if name.is_empty() || name.chars().all(|c| c == '.') || segment.contains(':') {
        return Err(ProvisionError::InvalidRepositoryUrl {
            url: url.to_owned(),
            reason: "cannot derive a project name from the last path segment".to_owned(),
        });
    }
    Ok(name)
}

/// Check that `suffix` is exactly [`SUFFIX_LEN`] lowercase hex characters.
#[must_use]
pub fn is_valid_suffix(suffix: &str) -> bool {
    suffix.len() == SUFFIX_LEN
        && suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

/// Compose `{base}_{suffix}`.
#[must_use]
pub fn project_id(base: &str, suffix: &str) -> String {
    format!("{base}_{suffix}")
}

/// Compose the workspace for `project_id` under `root`.
#[must_use]
pub fn workspace_at(root: &Path, project_id: String) -> Workspace {
    Workspace {
        path: root.join(&project_id),
        project_id,
    }
}

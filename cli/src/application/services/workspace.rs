//! Application service: workspace allocation.
//!
//! Reserves a fresh project directory under the workspace root. The reservation
//! is a single non-recursive `create_dir`, which is atomic: two runs that
//! derive the same name cannot both succeed.

use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use anyhow::{Result, bail};

use crate::application::ports::{IdSource, LocalFs};
use crate::domain::error::ProvisionError;
use crate::domain::provision::display_path;
use crate::domain::workspace::{Workspace, is_valid_suffix, project_id, workspace_at};

/// Reserve `{root}/{base_name}_{suffix}`.
///
/// # Errors
///
/// - [`ProvisionError::WorkspaceCollision`] if the directory already exists.
/// - [`ProvisionError::WorkspaceIo`] for any other filesystem error.
pub fn allocate_workspace(
    fs: &impl LocalFs,
    ids: &impl IdSource,
    root: &Path,
    base_name: &str,
) -> Result<Workspace> {
    let suffix = ids.hex_suffix();
    if !is_valid_suffix(&suffix) {
        bail!("identifier source produced an invalid suffix '{suffix}'");
    }
    let workspace = workspace_at(root, project_id(base_name, &suffix));

    match fs.create_dir(&workspace.path) {
        Ok(()) => {
            tracing::info!(
                project_id = %workspace.project_id,
                path = %workspace.path.display(),
                "workspace reserved"
            );
            Ok(workspace)
        }
        Err(e) if e.kind() == IoErrorKind::AlreadyExists => Err(ProvisionError::WorkspaceCollision {
            path: display_path(&workspace.path),
        }
        .into()),
        Err(e) => Err(ProvisionError::WorkspaceIo {
            path: display_path(&workspace.path),
            detail: e.to_string(),
        }
        .into()),
    }
}

/// Best-effort removal of a workspace created by this run.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be removed.
pub fn release_workspace(fs: &impl LocalFs, workspace: &Workspace) -> Result<()> {
    if !fs.exists(&workspace.path) {
        return Ok(());
    }
    fs.remove_dir_all(&workspace.path)?;
    tracing::info!(path = %workspace.path.display(), "workspace removed");
    Ok(())
}

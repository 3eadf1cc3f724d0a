//! Application service: reverse-proxy route management.
//!
//! The route table (definition directory, activation directory, and the proxy's
//! loaded configuration) is shared by every run and reloaded globally, so every
//! mutation from prune through reload happens while the caller holds a
//! [`RouteLock`](crate::application::ports::RouteLock).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, LocalFs};
use crate::application::services::{diagnostic, split_argv};
use crate::domain::error::ProvisionError;
use crate::domain::provision::display_path;
use crate::domain::proxy::ProxyRoute;

/// Write the route's definition file. Never overwrites.
///
/// # Errors
///
/// Returns [`ProvisionError::ConfigWriteFailed`] if the file exists or cannot
/// be written.
pub fn write_definition(fs: &impl LocalFs, route: &ProxyRoute) -> Result<()> {
    fs.write_new(&route.available_path, &route.render())
        .map_err(|e| ProvisionError::ConfigWriteFailed {
            path: display_path(&route.available_path),
            detail: e.to_string(),
        })?;
    tracing::info!(path = %route.available_path.display(), "route definition written");
    Ok(())
}

/// Remove every activation marker in `enabled_dir` whose target is gone.
///
/// Returns the removed paths. Running it again without intervening changes
/// removes nothing.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or a marker cannot be
/// removed.
pub fn prune_broken_markers(fs: &impl LocalFs, enabled_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pruned = Vec::new();
    for entry in fs
        .list_dir(enabled_dir)
        .with_context(|| format!("scanning {}", enabled_dir.display()))?
    {
        if fs.is_broken_symlink(&entry) {
            fs.remove_file(&entry)?;
            tracing::warn!(path = %entry.display(), "pruned broken activation marker");
            pruned.push(entry);
        }
    }
    Ok(pruned)
}

/// Point the route's activation marker at its definition.
///
/// Returns `true` when this call created the marker, `false` when a live
/// marker was already in place.
///
/// # Errors
///
/// Returns [`ProvisionError::ConfigWriteFailed`] if the marker cannot be
/// created.
pub fn activate(fs: &impl LocalFs, route: &ProxyRoute) -> Result<bool> {
    if fs.exists(&route.enabled_path) {
        tracing::debug!(path = %route.enabled_path.display(), "activation marker already present");
        return Ok(false);
    }
    fs.symlink(&route.available_path, &route.enabled_path)
        .map_err(|e| ProvisionError::ConfigWriteFailed {
            path: display_path(&route.enabled_path),
            detail: format!("{e:#}"),
        })?;
    tracing::info!(path = %route.enabled_path.display(), "route activated");
    Ok(true)
}

/// Run the proxy's whole-configuration syntax check.
///
/// # Errors
///
/// Returns [`ProvisionError::ProxyConfigInvalid`] on failure or timeout.
pub async fn validate(runner: &impl CommandRunner, argv: &[String], timeout: Duration) -> Result<()> {
    run_proxy_command(runner, argv, timeout)
        .await
        .map_err(|detail| ProvisionError::ProxyConfigInvalid { detail })?;
    tracing::debug!("proxy configuration valid");
    Ok(())
}

/// Ask the proxy service to reload.
///
/// # Errors
///
/// Returns [`ProvisionError::ProxyReloadFailed`] on failure or timeout.
pub async fn reload(runner: &impl CommandRunner, argv: &[String], timeout: Duration) -> Result<()> {
    run_proxy_command(runner, argv, timeout)
        .await
        .map_err(|detail| ProvisionError::ProxyReloadFailed { detail })?;
    tracing::info!("proxy reloaded");
    Ok(())
}

async fn run_proxy_command(
    runner: &impl CommandRunner,
    argv: &[String],
    timeout: Duration,
) -> std::result::Result<(), String> {
    let (program, args) = split_argv(argv).map_err(|e| e.to_string())?;
    let output = runner
        .run_with_timeout(program, &args, timeout)
        .await
        .map_err(|e| format!("{e:#}"))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(diagnostic(&output))
    }
}

/// Remove the route's marker (only if `created_marker`) and definition.
///
/// Both removals are attempted; the problems encountered are returned so the
/// caller can report them.
pub fn rollback(fs: &impl LocalFs, route: &ProxyRoute, created_marker: bool) -> Vec<String> {
    let mut problems = Vec::new();
    if created_marker && fs.is_symlink(&route.enabled_path) {
        if let Err(e) = fs.remove_file(&route.enabled_path) {
            problems.push(format!("{e:#}"));
        }
    }
    if fs.exists(&route.available_path) {
        if let Err(e) = fs.remove_file(&route.available_path) {
            problems.push(format!("{e:#}"));
        }
    }
    if problems.is_empty() {
        tracing::warn!(domain = %route.domain.full, "route rolled back");
    } else {
        tracing::warn!(domain = %route.domain.full, ?problems, "route rollback incomplete");
    }
    problems
}

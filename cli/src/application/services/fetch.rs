//! Application service: source fetch.
//!
//! The authenticated URL is handed to the fetch command and nowhere else.
//! Diagnostics are redacted before they leave this module.

use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::application::ports::CommandRunner;
use crate::application::services::{diagnostic, expand_argv, split_argv};
use crate::domain::config::{CommandsConfig, DEST_PLACEHOLDER, URL_PLACEHOLDER};
use crate::domain::credential::Secret;
use crate::domain::error::ProvisionError;
use crate::domain::provision::display_path;
use crate::domain::workspace::Workspace;

/// Clone `repository_url` into `workspace`, authenticating with `secret`.
///
/// After a successful clone, `commands.scrub_remote` (when configured) resets
/// the stored remote to the unauthenticated URL.
///
/// # Errors
///
/// Returns [`ProvisionError::FetchFailed`] if either command cannot run, times
/// out, or exits nonzero. The detail is the tool's diagnostic with the secret
/// replaced. A scrub failure additionally carries
/// [`CredentialLeftInWorkspace`] so the caller can discard the workspace.
pub async fn fetch_source(
    runner: &impl CommandRunner,
    commands: &CommandsConfig,
    timeout: Duration,
    secret: &Secret,
    authenticated_url: &str,
    repository_url: &str,
    workspace: &Workspace,
) -> Result<()> {
    let dest = display_path(&workspace.path);
    let failed = |detail: &str| ProvisionError::FetchFailed {
        path: dest.clone(),
        detail: secret.redact(detail),
    };

    let argv = expand_argv(
        &commands.fetch,
        &[(URL_PLACEHOLDER, authenticated_url), (DEST_PLACEHOLDER, &dest)],
    );
    run_step(runner, &argv, timeout).await.map_err(|d| failed(&d))?;
    tracing::info!(project_id = %workspace.project_id, "source fetched");

    if commands.scrub_remote.is_empty() {
        return Ok(());
    }
    let argv = expand_argv(
        &commands.scrub_remote,
        &[(URL_PLACEHOLDER, repository_url), (DEST_PLACEHOLDER, &dest)],
    );
    run_step(runner, &argv, timeout)
        .await
        .map_err(|d| failed(&d))
        .context(CredentialLeftInWorkspace)?;
    tracing::debug!(project_id = %workspace.project_id, "stored remote reset");
    Ok(())
}

/// Context marker on a fetch error raised after the clone succeeded but before
/// the stored remote was reset, so the workspace still holds the credential.
#[derive(Debug)]
pub struct CredentialLeftInWorkspace;

impl std::fmt::Display for CredentialLeftInWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("stored remote still carries the credential")
    }
}

/// Run one command, returning its diagnostic text on any failure.
async fn run_step(
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

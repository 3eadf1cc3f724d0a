//! Application service: local name resolution.
//!
//! Callers hold the route-table lock: the read-then-append below is not atomic
//! on its own.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{CommandRunner, LocalFs};
use crate::application::services::{diagnostic, expand_argv, split_argv};
use crate::domain::config::HOSTS_PLACEHOLDER;
use crate::domain::error::ProvisionError;
use crate::domain::hosts::{append_text, has_entry};
use crate::domain::provision::display_path;

/// Ensure `full_domain` resolves to the loopback address.
///
/// Returns `true` when an entry was appended, `false` when one already existed.
///
/// # Errors
///
/// Returns [`ProvisionError::ResolutionRegistrationFailed`] if the hosts file
/// cannot be read or the privileged append fails.
pub async fn register_domain(
    fs: &impl LocalFs,
    runner: &impl CommandRunner,
    hosts_file: &Path,
    append_cmd: &[String],
    timeout: Duration,
    full_domain: &str,
) -> Result<bool> {
    let failed = |detail: String| ProvisionError::ResolutionRegistrationFailed {
        domain: full_domain.to_owned(),
        path: display_path(hosts_file),
        detail,
    };

    let contents = fs.read_to_string(hosts_file).map_err(|e| failed(format!("{e:#}")))?;
    if has_entry(&contents, full_domain) {
        tracing::debug!(domain = %full_domain, "hosts entry already present");
        return Ok(false);
    }

    let hosts = display_path(hosts_file);
    let argv = expand_argv(append_cmd, &[(HOSTS_PLACEHOLDER, &hosts)]);
    let (program, args) = split_argv(&argv).map_err(|e| failed(e.to_string()))?;
    let output = runner
        .run_with_stdin(
            program,
            &args,
            append_text(&contents, full_domain).as_bytes(),
            timeout,
        )
        .await
        .map_err(|e| failed(format!("{e:#}")))?;
    if !output.status.success() {
        return Err(failed(diagnostic(&output)).into());
    }
    tracing::info!(domain = %full_domain, "hosts entry added");
    Ok(true)
}

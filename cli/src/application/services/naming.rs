//! Application service: subdomain allocation.
//!
//! Labels are random, so uniqueness is checked against the route files on disk
//! and re-drawn a bounded number of times. Callers hold the route-table lock
//! from allocation until the definition is written, which closes the window
//! between the check and the write.

use anyhow::{Result, bail};

use crate::application::ports::{IdSource, LocalFs};
use crate::domain::config::{DomainConfig, PathsConfig};
use crate::domain::error::ProvisionError;
use crate::domain::naming::{Domain, is_valid_label};
use crate::domain::proxy::ProxyRoute;

/// Attempts before giving up with [`ProvisionError::NameSpaceExhausted`].
pub const MAX_LABEL_ATTEMPTS: u32 = 10;

/// Draw labels until one has neither a definition nor an activation marker.
///
/// # Errors
///
/// Returns [`ProvisionError::NameSpaceExhausted`] after
/// [`MAX_LABEL_ATTEMPTS`] collisions.
pub fn allocate_route(
    fs: &impl LocalFs,
    ids: &impl IdSource,
    domain: &DomainConfig,
    paths: &PathsConfig,
) -> Result<ProxyRoute> {
    for attempt in 1..=MAX_LABEL_ATTEMPTS {
        let label = ids.subdomain_label();
        if !is_valid_label(&label) {
            bail!("identifier source produced an invalid label '{label}'");
        }
        let route = ProxyRoute::new(
            Domain::new(&label, &domain.base_domain),
            &paths.sites_available,
            &paths.sites_enabled,
            domain.upstream_port,
        );
        if is_taken(fs, &route) {
            tracing::debug!(attempt, domain = %route.domain.full, "subdomain taken, redrawing");
            continue;
        }
        tracing::info!(domain = %route.domain.full, attempt, "subdomain allocated");
        return Ok(route);
    }
    Err(ProvisionError::NameSpaceExhausted {
        attempts: MAX_LABEL_ATTEMPTS,
    }
    .into())
}

fn is_taken(fs: &impl LocalFs, route: &ProxyRoute) -> bool {
    fs.exists(&route.available_path)
        || fs.is_symlink(&route.available_path)
        || fs.exists(&route.enabled_path)
        || fs.is_symlink(&route.enabled_path)
}

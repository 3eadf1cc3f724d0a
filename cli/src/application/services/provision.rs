//! Application service: the provisioning pipeline.
//!
//! Imports only from `crate::domain` and `crate::application`.
//! All I/O is routed through injected port traits.
//!
//! Steps run strictly in order and each one only runs if every earlier step
//! succeeded:
//!
//! 1. validate the request, decode the credential, check the URL
//! 2. reserve the workspace
//! 3. fetch the source
//! 4. under the route-table lock: allocate a subdomain, write and activate the
//!    route, validate and reload the proxy, register the hosts entry
//! 5. launch the application (non-fatal)
//! 6. record the instance (non-fatal)
//!
//! Client-input problems are all detected in step 1, before any side effect.
//! A failure after the route is written rolls the route back. The workspace
//! is kept or removed according to `policy.cleanup_workspace_on_failure`,
//! except that a workspace whose stored remote could not be scrubbed is always
//! removed.

use anyhow::Result;
use chrono::Utc;

use crate::application::ports::{
    CommandRunner, IdSource, InstanceRegistry, LocalFs, ProgressReporter, RouteLock,
};
use crate::application::services::proxy;
use crate::application::services::fetch::{self, CredentialLeftInWorkspace};
use crate::application::services::{launcher, naming, resolution, workspace};
use crate::domain::config::IplessConfig;
use crate::domain::credential::{Secret, authenticated_url, decode_credential};
use crate::domain::error::{ErrorKind, ProvisionError, StatusClass};
use crate::domain::provision::{
    InstanceRecord, ProvisionRequest, ProvisionResult, ProvisionSuccess, Warning, display_path,
};
use crate::domain::proxy::ProxyRoute;
use crate::domain::workspace::{Workspace, repo_base_name};

/// Everything a provisioning run talks to.
pub struct ProvisionContext<'a, R, F, I, G, L> {
    pub runner: &'a R,
    pub fs: &'a F,
    pub ids: &'a I,
    pub registry: &'a G,
    pub config: &'a IplessConfig,
    /// Held from subdomain allocation through hosts registration.
    pub route_lock: &'a L,
    /// Host OS name as in `std::env::consts::OS`; selects the launcher.
    pub host_os: &'a str,
}

/// What a run has created so far, for failure handling.
#[derive(Default)]
struct Progress {
    secret: Option<Secret>,
    workspace: Option<Workspace>,
    warnings: Vec<Warning>,
}

impl Progress {
    fn warn(&mut self, reporter: &impl ProgressReporter, kind: ErrorKind, message: String) {
        reporter.warn(&message);
        self.warnings.push(Warning { kind, message });
    }
}

/// Run the pipeline for `request` and return its single outcome.
///
/// Never returns an error: every failure, expected or not, is converted into
/// a [`ProvisionResult::Failure`].
pub async fn provision<R, F, I, G, L>(
    ctx: &ProvisionContext<'_, R, F, I, G, L>,
    reporter: &impl ProgressReporter,
    request: &ProvisionRequest,
) -> ProvisionResult
where
    R: CommandRunner,
    F: LocalFs,
    I: IdSource,
    G: InstanceRegistry,
    L: RouteLock,
{
    let mut progress = Progress::default();
    match run_pipeline(ctx, reporter, request, &mut progress).await {
        Ok(success) => ProvisionResult::Success(success),
        Err(err) => failure_result(ctx, reporter, &progress, &err),
    }
}

async fn run_pipeline<R, F, I, G, L>(
    ctx: &ProvisionContext<'_, R, F, I, G, L>,
    reporter: &impl ProgressReporter,
    request: &ProvisionRequest,
    progress: &mut Progress,
) -> Result<ProvisionSuccess>
where
    R: CommandRunner,
    F: LocalFs,
    I: IdSource,
    G: InstanceRegistry,
    L: RouteLock,
{
    let config = ctx.config;

    // Step 1: client input.
    let req = request.validate()?;
    let secret = decode_credential(req.credential)?;
    let fetch_url = authenticated_url(&secret, req.repository_url)?;
    let base_name = repo_base_name(req.repository_url)?;
    progress.secret = Some(secret.clone());

    // Step 2: workspace.
    reporter.step("reserving workspace...");
    let ws = workspace::allocate_workspace(ctx.fs, ctx.ids, &config.paths.workspace_root, &base_name)?;
    progress.workspace = Some(ws.clone());

    // Step 3: source.
    reporter.step(&format!("fetching {}...", req.repository_url));
    fetch::fetch_source(
        ctx.runner,
        &config.commands,
        config.timeouts.fetch(),
        &secret,
        &fetch_url,
        req.repository_url,
        &ws,
    )
    .await?;
    reporter.success("source fetched");

    // Step 4: route and resolution.
    let route = {
        let _guard = ctx.route_lock.acquire().await?;
        install_route(ctx, reporter, progress).await?
    };
    reporter.success(&format!("{} routed to port {}", route.domain.full, route.upstream_port));

    // Step 5: launch.
    reporter.step("starting application...");
    let pid = match launcher::launch(ctx.runner, &config.commands, &ws, ctx.host_os) {
        Ok(pid) => pid,
        Err(e) => {
            progress.warn(reporter, ErrorKind::LaunchFailed, launch_warning(&e));
            None
        }
    };

    // Step 6: registry.
    let record = InstanceRecord {
        id: ws.project_id.clone(),
        full_domain: route.domain.full.clone(),
        url: route.domain.url(),
        workspace_path: display_path(&ws.path),
        proxy_config_path: display_path(&route.available_path),
        upstream_port: route.upstream_port,
        pid,
        created_at: Utc::now(),
    };
    if let Err(e) = ctx.registry.record(&record).await {
        tracing::warn!(error = %format!("{e:#}"), "instance registry not updated");
        progress.warn(
            reporter,
            ErrorKind::InternalError,
            format!("instance not recorded: {e:#}"),
        );
    }

    Ok(ProvisionSuccess {
        status: StatusClass::Success,
        message: format!(
            "{} is routed to port {} and the application is starting in {}",
            route.domain.full, route.upstream_port, record.workspace_path
        ),
        project_id: record.id,
        workspace_path: record.workspace_path,
        full_domain: record.full_domain,
        url: record.url,
        proxy_config_path: record.proxy_config_path,
        warnings: std::mem::take(&mut progress.warnings),
    })
}

/// Allocate, write, activate, validate and reload the route, then register
/// the hosts entry. Caller holds the route-table lock.
async fn install_route<R, F, I, G, L>(
    ctx: &ProvisionContext<'_, R, F, I, G, L>,
    reporter: &impl ProgressReporter,
    progress: &mut Progress,
) -> Result<ProxyRoute>
where
    R: CommandRunner,
    F: LocalFs,
    I: IdSource,
    G: InstanceRegistry,
    L: RouteLock,
{
    let config = ctx.config;

    reporter.step("allocating subdomain...");
    let route = naming::allocate_route(ctx.fs, ctx.ids, &config.domain, &config.paths)?;

    reporter.step(&format!("configuring proxy for {}...", route.domain.full));
    proxy::write_definition(ctx.fs, &route)?;

    let mut created_marker = false;
    if let Err(err) = activate_route(ctx, &route, &mut created_marker).await {
        return Err(with_rollback(ctx.fs, &route, created_marker, err));
    }

    reporter.step("registering local name resolution...");
    if let Err(err) = resolution::register_domain(
        ctx.fs,
        ctx.runner,
        &config.paths.hosts_file,
        &config.commands.hosts_append,
        config.timeouts.hosts(),
        &route.domain.full,
    )
    .await
    {
        if config.policy.strict_resolution {
            let err = with_rollback(ctx.fs, &route, created_marker, err);
            // The proxy already serves the route; reload again so it forgets it.
            let reloaded =
                proxy::reload(ctx.runner, &config.commands.proxy_reload, config.timeouts.proxy())
                    .await;
            if let Err(e) = reloaded {
                tracing::warn!(error = %format!("{e:#}"), "reload after rollback failed");
            }
            return Err(err);
        }
        let message = match err.downcast_ref::<ProvisionError>() {
            Some(pe) => format!("{pe}: {}", pe.detail().trim_end()),
            None => format!("{err:#}"),
        };
        tracing::warn!(domain = %route.domain.full, "hosts registration failed");
        progress.warn(reporter, ErrorKind::ResolutionRegistrationFailed, message);
    }

    Ok(route)
}

/// Prune, activate, validate, reload.
async fn activate_route<R, F, I, G, L>(
    ctx: &ProvisionContext<'_, R, F, I, G, L>,
    route: &ProxyRoute,
    created_marker: &mut bool,
) -> Result<()>
where
    R: CommandRunner,
    F: LocalFs,
{
    let config = ctx.config;
    proxy::prune_broken_markers(ctx.fs, &config.paths.sites_enabled)?;
    *created_marker = proxy::activate(ctx.fs, route)?;
    proxy::validate(ctx.runner, &config.commands.proxy_validate, config.timeouts.proxy()).await?;
    proxy::reload(ctx.runner, &config.commands.proxy_reload, config.timeouts.proxy()).await
}

/// Roll the route back and attach any rollback problems to `err`.
fn with_rollback(
    fs: &impl LocalFs,
    route: &ProxyRoute,
    created_marker: bool,
    err: anyhow::Error,
) -> anyhow::Error {
    let problems = proxy::rollback(fs, route, created_marker);
    if problems.is_empty() {
        err
    } else {
        err.context(RollbackIncomplete(problems.join("; ")))
    }
}

/// Context marker for a rollback that left files behind.
#[derive(Debug)]
struct RollbackIncomplete(String);

impl std::fmt::Display for RollbackIncomplete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "route rollback incomplete: {}", self.0)
    }
}

fn launch_warning(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ProvisionError>() {
        Some(pe) => format!("{pe}: {}", pe.detail()),
        None => format!("{err:#}"),
    }
}

/// Convert a pipeline error into the failure result, applying the workspace
/// policy and redacting the secret.
fn failure_result<R, F, I, G, L>(
    ctx: &ProvisionContext<'_, R, F, I, G, L>,
    reporter: &impl ProgressReporter,
    progress: &Progress,
    err: &anyhow::Error,
) -> ProvisionResult
where
    F: LocalFs,
{
    let (kind, mut message, detail) = match err.downcast_ref::<ProvisionError>() {
        Some(pe) => (pe.kind(), pe.to_string(), pe.detail().to_owned()),
        None => (
            ErrorKind::InternalError,
            "unexpected error during provisioning".to_owned(),
            format!("{err:#}"),
        ),
    };
    if let Some(rollback) = err.downcast_ref::<RollbackIncomplete>() {
        message.push_str(&format!("; {rollback}"));
    }

    if let Some(ws) = &progress.workspace {
        let path = display_path(&ws.path);
        let holds_credential = err.downcast_ref::<CredentialLeftInWorkspace>().is_some();
        if holds_credential || ctx.config.policy.cleanup_workspace_on_failure {
            let reason = if holds_credential { " because its stored remote held the credential" } else { "" };
            match workspace::release_workspace(ctx.fs, ws) {
                Ok(()) => message.push_str(&format!("; workspace {path} removed{reason}")),
                Err(e) => {
                    tracing::error!(workspace = %path, "workspace could not be removed");
                    message.push_str(&format!("; workspace {path} could not be removed{reason}: {e:#}"));
                }
            }
        } else {
            message.push_str(&format!("; workspace retained at {path}"));
        }
    }

    let (message, detail) = match &progress.secret {
        Some(secret) => (secret.redact(&message), secret.redact(&detail)),
        None => (message, detail),
    };

    tracing::warn!(error_kind = %kind, %message, "provisioning failed");
    reporter.warn(&message);
    ProvisionResult::failure(kind, message, detail)
}

//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the adapters the services run against, so command
//! handlers never construct infrastructure themselves. Adding a new
//! cross-cutting concern requires only one field change here.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::application::services::provision::ProvisionContext;
use crate::domain::IplessConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::fs::HostFs;
use crate::infra::ids::RandomIds;
use crate::infra::lock::FileLock;
use crate::infra::registry::JsonInstanceRegistry;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    pub config_store: YamlConfigStore,
    /// Loaded and validated configuration.
    pub config: IplessConfig,
    pub runner: TokioCommandRunner,
    pub fs: HostFs,
    pub ids: RandomIds,
    pub registry: JsonInstanceRegistry,
    /// Guards the route table and hosts file across every run on the host.
    pub route_lock: FileLock,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// In JSON mode human output is suppressed so stdout carries one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the home
    /// directory cannot be determined.
    pub fn new(flags: &OutputFlags, config_store: YamlConfigStore) -> Result<Self> {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let config = config_store.load()?;
        let registry = match &config.paths.registry_file {
            Some(path) => JsonInstanceRegistry::with_path(path.clone()),
            None => JsonInstanceRegistry::new()?,
        };
        let route_lock = match &config.paths.lock_file {
            Some(path) => FileLock::with_path(path.clone()),
            None => FileLock::new()?,
        };

        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json),
            mode,
            config_store,
            config,
            runner: TokioCommandRunner::new(),
            fs: HostFs,
            ids: RandomIds,
            registry,
            route_lock,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Borrow the production adapters for a provisioning run.
    #[must_use]
    pub fn provision_context(
        &self,
    ) -> ProvisionContext<
        '_,
        TokioCommandRunner,
        HostFs,
        RandomIds,
        JsonInstanceRegistry,
        FileLock,
    > {
        ProvisionContext {
            runner: &self.runner,
            fs: &self.fs,
            ids: &self.ids,
            registry: &self.registry,
            config: &self.config,
            route_lock: &self.route_lock,
            host_os: std::env::consts::OS,
        }
    }
}

//! Human-readable terminal renderer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;

use crate::domain::{InstanceRecord, IplessConfig, ProvisionResult};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the outcome of a provisioning run.
    ///
    /// Failures go to stderr and are never suppressed. In quiet mode a success
    /// prints only the URL.
    pub fn render_provision(&self, result: &ProvisionResult) {
        match result {
            ProvisionResult::Success(ok) => {
                if self.ctx.quiet {
                    println!("{}", ok.url);
                    return;
                }
                println!();
                self.ctx.success(&ok.message);
                self.ctx.kv("URL:      ", &ok.url.style(self.ctx.styles.link).to_string());
                self.ctx.kv("Project:  ", &ok.project_id);
                self.ctx.kv("Workspace:", &ok.workspace_path);
                self.ctx.kv("Domain:   ", &ok.full_domain);
                self.ctx.kv("Proxy:    ", &ok.proxy_config_path);
                for warning in &ok.warnings {
                    self.ctx.warn(&format!("{}: {}", warning.kind, warning.message));
                }
            }
            ProvisionResult::Failure(err) => {
                self.ctx.error(&format!("{}: {}", err.error_kind, err.message));
                let detail = err.detail.trim_end();
                if !detail.is_empty() {
                    for line in detail.lines() {
                        eprintln!("    {}", line.style(self.ctx.styles.dim));
                    }
                }
            }
        }
    }

    /// Render the recorded instances, oldest first.
    pub fn render_instances(&self, instances: &[InstanceRecord]) {
        if instances.is_empty() {
            self.ctx.info("No instances provisioned yet.");
            return;
        }
        self.ctx.header("Instances:");
        for instance in instances {
            self.ctx.kv(
                &instance.created_at.format("%Y-%m-%d %H:%M").to_string(),
                &format!(
                    "{}  {}  {}",
                    instance.id.style(self.ctx.styles.bold),
                    instance.url.style(self.ctx.styles.link),
                    instance.workspace_path,
                ),
            );
        }
    }

    /// Render the activation markers removed by a prune.
    pub fn render_pruned(&self, pruned: &[PathBuf]) {
        if pruned.is_empty() {
            self.ctx.success("No broken routes found");
            return;
        }
        for path in pruned {
            self.ctx.warn(&format!("Removed broken route {}", path.display()));
        }
        self.ctx
            .success(&format!("Pruned {} broken route(s)", pruned.len()));
    }

    /// Render the effective configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn render_config(&self, config: &IplessConfig, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(config).context("cannot serialize config")?;
        if self.ctx.quiet {
            print!("{yaml}");
            return Ok(());
        }
        self.ctx.header("Configuration");
        self.ctx.kv("File:", &path.display().to_string());
        println!();
        for line in yaml.lines() {
            println!("  {line}");
        }
        Ok(())
    }

    /// Print a bare path, for use in scripts.
    pub fn render_path(&self, path: &Path) {
        println!("{}", path.display());
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        println!("ipless {version}");
    }
}

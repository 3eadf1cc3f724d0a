//! Domain types and validators for ipless configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::naming::is_valid_base_domain;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_BASE_DOMAIN: &str = "ipless.local";
pub const DEFAULT_UPSTREAM_PORT: u16 = 3000;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.ipless/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct IplessConfig {
    pub domain: DomainConfig,
    pub paths: PathsConfig,
    pub commands: CommandsConfig,
    pub timeouts: TimeoutsConfig,
    pub policy: PolicyConfig,
}

/// Naming and routing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DomainConfig {
    /// Suffix appended to every generated label.
    pub base_domain: String,
    /// Local port every route forwards to.
    pub upstream_port: u16,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            base_domain: DEFAULT_BASE_DOMAIN.to_string(),
            upstream_port: DEFAULT_UPSTREAM_PORT,
        }
    }
}

/// Filesystem locations the pipeline reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Parent directory of every workspace. Must already exist.
    pub workspace_root: PathBuf,
    /// Route definitions.
    pub sites_available: PathBuf,
    /// Activation markers.
    pub sites_enabled: PathBuf,
    /// System resolution file.
    pub hosts_file: PathBuf,
    /// Instance registry; `~/.ipless/instances.json` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_file: Option<PathBuf>,
    /// Route-table lock shared by concurrent runs; `~/.ipless/routes.lock`
    /// when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_file: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("/srv/ipless/projects"),
            sites_available: PathBuf::from("/etc/nginx/sites-available"),
            sites_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
            hosts_file: PathBuf::from("/etc/hosts"),
            registry_file: None,
            lock_file: None,
        }
    }
}

/// Placeholder for the repository URL in command templates.
pub const URL_PLACEHOLDER: &str = "{url}";
/// Placeholder for the workspace directory in command templates.
pub const DEST_PLACEHOLDER: &str = "{dest}";
/// Placeholder for the hosts file in command templates.
pub const HOSTS_PLACEHOLDER: &str = "{hosts_file}";

/// External commands, as argv templates.
///
/// `fetch` gets the authenticated URL as `{url}`; `scrub_remote` gets the
/// plain URL, so the credential is not left in the fetched tree.
/// `hosts_append` receives the entry on stdin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommandsConfig {
    pub fetch: Vec<String>,
    /// Run after a successful fetch; empty disables it.
    pub scrub_remote: Vec<String>,
    pub proxy_validate: Vec<String>,
    pub proxy_reload: Vec<String>,
    pub hosts_append: Vec<String>,
    /// Shell snippet run in the workspace before `run`.
    pub install: String,
    /// Shell snippet that starts the application.
    pub run: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            fetch: argv(&["git", "clone", "--quiet", URL_PLACEHOLDER, DEST_PLACEHOLDER]),
            scrub_remote: argv(&[
                "git",
                "-C",
                DEST_PLACEHOLDER,
                "remote",
                "set-url",
                "origin",
                URL_PLACEHOLDER,
            ]),
            proxy_validate: argv(&["sudo", "nginx", "-t"]),
            proxy_reload: argv(&["sudo", "systemctl", "reload", "nginx"]),
            hosts_append: argv(&["sudo", "tee", "-a", HOSTS_PLACEHOLDER]),
            install: "npm install".to_string(),
            run: "npm start".to_string(),
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

/// Subprocess bounds, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub fetch_secs: u64,
    pub proxy_secs: u64,
    pub hosts_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            fetch_secs: 300,
            proxy_secs: 30,
            hosts_secs: 15,
        }
    }
}

impl TimeoutsConfig {
    #[must_use]
    pub fn fetch(&self) -> Duration {
        Duration::from_secs(self.fetch_secs)
    }

    #[must_use]
    pub fn proxy(&self) -> Duration {
        Duration::from_secs(self.proxy_secs)
    }

    #[must_use]
    pub fn hosts(&self) -> Duration {
        Duration::from_secs(self.hosts_secs)
    }
}

/// Failure handling.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Remove the workspace when a later step fails. Off by default so a
    /// failed clone can be inspected.
    pub cleanup_workspace_on_failure: bool,
    /// Treat a failed hosts registration as fatal.
    pub strict_resolution: bool,
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a loaded configuration.
///
/// # Errors
///
/// Returns a [`ConfigError`] for the first invalid value found.
pub fn validate_config(config: &IplessConfig) -> Result<()> {
    if !is_valid_base_domain(&config.domain.base_domain) {
        return Err(ConfigError::InvalidBaseDomain(config.domain.base_domain.clone()).into());
    }
    if config.domain.upstream_port == 0 {
        return Err(ConfigError::InvalidValue {
            key: "domain.upstream_port",
            value: "0".to_string(),
        }
        .into());
    }
    for (name, cmd) in [
        ("commands.fetch", &config.commands.fetch),
        ("commands.proxy_validate", &config.commands.proxy_validate),
        ("commands.proxy_reload", &config.commands.proxy_reload),
        ("commands.hosts_append", &config.commands.hosts_append),
    ] {
        if cmd.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(ConfigError::EmptyCommand(name).into());
        }
    }
    for placeholder in [URL_PLACEHOLDER, DEST_PLACEHOLDER] {
        if !config.commands.fetch.iter().any(|arg| arg.contains(placeholder)) {
            return Err(ConfigError::MissingPlaceholder {
                key: "commands.fetch",
                placeholder,
            }
            .into());
        }
    }
    if config.commands.run.trim().is_empty() {
        return Err(ConfigError::EmptyCommand("commands.run").into());
    }
    for (key, secs) in [
        ("timeouts.fetch_secs", config.timeouts.fetch_secs),
        ("timeouts.proxy_secs", config.timeouts.proxy_secs),
        ("timeouts.hosts_secs", config.timeouts.hosts_secs),
    ] {
        if secs == 0 {
            return Err(ConfigError::InvalidValue {
                key,
                value: "0".to_string(),
            }
            .into());
        }
    }
    if config.paths.sites_available == config.paths.sites_enabled {
        return Err(ConfigError::InvalidValue {
            key: "paths.sites_enabled",
            value: config.paths.sites_enabled.display().to_string(),
        }
        .into());
    }
    Ok(())
}

//! Infrastructure implementation of the `InstanceRegistry` port.
//!
//! `JsonInstanceRegistry` keeps every provisioned instance in one JSON file.
//! Writes go through `tokio::task::spawn_blocking` with an atomic temp file +
//! rename, so a crash mid-write never leaves a truncated registry. Each
//! read-modify-write cycle holds an exclusive lock on a sibling `.lock` file,
//! so concurrent processes never drop each other's records.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::ports::InstanceRegistry;
use crate::domain::InstanceRecord;
use crate::infra::lock::lock_exclusive_sync;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    instances: Vec<InstanceRecord>,
}

/// Registry file manager.
pub struct JsonInstanceRegistry {
    path: PathBuf,
}

impl JsonInstanceRegistry {
    /// Create a registry using the default path (`~/.ipless/instances.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_path(home.join(".ipless").join("instances.json")))
    }

    /// Create a registry with an explicit path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load_sync(path: &Path) -> Result<RegistryFile> {
    if !path.exists() {
        return Ok(RegistryFile::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading registry {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing registry {}", path.display()))
}

fn lock_path(path: &Path) -> PathBuf {
    path.with_extension("json.lock")
}

fn save_sync(path: &Path, registry: &RegistryFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(registry).context("serializing registry")?;

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, &content)
        .with_context(|| format!("writing temp file {}", temp_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
    }

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("finalizing registry {}", path.display()))
}

impl InstanceRegistry for JsonInstanceRegistry {
    async fn record(&self, instance: &InstanceRecord) -> Result<()> {
        let path = self.path.clone();
        let instance = instance.clone();
        tokio::task::spawn_blocking(move || {
            let _lock = lock_exclusive_sync(&lock_path(&path))?;
            let mut registry = load_sync(&path)?;
            registry.instances.push(instance);
            save_sync(&path, &registry)
        })
        .await
        .context("registry save task panicked")?
    }

    async fn list(&self) -> Result<Vec<InstanceRecord>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_sync(&path).map(|r| r.instances))
            .await
            .context("registry load task panicked")?
    }
}

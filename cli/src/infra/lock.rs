//! Infrastructure implementation of the `RouteLock` port.
//!
//! `FileLock` takes an exclusive advisory lock on a well-known file, so runs in
//! separate processes serialize on it as well as tasks within one process.
//! Acquisition blocks, so it runs on `tokio::task::spawn_blocking`. The lock is
//! released when the guard's file handle closes.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::RouteLock;

/// Cross-process lock backed by a lock file.
#[derive(Debug, Clone)]
pub struct FileLock {
    path: PathBuf,
}

/// Holds the lock until dropped.
#[derive(Debug)]
pub struct FileLockGuard {
    _file: File,
}

impl FileLock {
    /// Create a lock at the default path (`~/.ipless/routes.lock`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_path(home.join(".ipless").join("routes.lock")))
    }

    /// Create a lock on an explicit path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open (creating if needed) and exclusively lock `path`, blocking until the
/// current holder releases it.
pub(crate) fn lock_exclusive_sync(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .with_context(|| format!("opening lock file {}", path.display()))?;
    file.lock().with_context(|| format!("locking {}", path.display()))?;
    Ok(file)
}

impl RouteLock for FileLock {
    type Guard = FileLockGuard;

    async fn acquire(&self) -> Result<FileLockGuard> {
        let path = self.path.clone();
        let file = tokio::task::spawn_blocking(move || lock_exclusive_sync(&path))
            .await
            .context("lock task panicked")??;
        tracing::debug!(lock = %self.path.display(), "route table locked");
        Ok(FileLockGuard { _file: file })
    }
}

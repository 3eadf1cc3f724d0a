//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{InstanceRecord, IplessConfig};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Implementations must not log `args`: the fetch command carries the
/// authenticated URL.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program to completion and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;

    /// Run a program with stdin piped from `stdin`.
    ///
    /// # Errors
    ///
    /// Same as [`CommandRunner::run_with_timeout`].
    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        stdin: &[u8],
        timeout: Duration,
    ) -> Result<Output>;

    /// Spawn a program in `cwd` without waiting for it, returning its PID
    /// when the platform reports one. The child outlives the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn spawn_detached(&self, program: &str, args: &[&str], cwd: &Path) -> Result<Option<u32>>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Abstracts the filesystem operations the pipeline performs.
///
/// Creation methods return `std::io::Result` so callers can tell
/// `AlreadyExists` apart from other failures.
pub trait LocalFs {
    /// Whether `path` exists, following symlinks.
    fn exists(&self, path: &Path) -> bool;
    /// Whether `path` is a symlink, without following it.
    fn is_symlink(&self, path: &Path) -> bool;
    /// Create a single directory; fails if it already exists.
    fn create_dir(&self, path: &Path) -> std::io::Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    /// Create `path` with `content`; fails if it already exists.
    fn write_new(&self, path: &Path, content: &str) -> std::io::Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Create `link` pointing at `target`.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;
    /// Entries of `dir`, sorted by path.
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// A symlink whose target does not exist.
    fn is_broken_symlink(&self, path: &Path) -> bool {
        self.is_symlink(path) && !self.exists(path)
    }
}

// ── Identifier Port ───────────────────────────────────────────────────────────

/// Source of random identifiers.
pub trait IdSource {
    /// Eight lowercase hexadecimal characters.
    fn hex_suffix(&self) -> String;
    /// Eight characters drawn uniformly from `[a-z0-9]`.
    fn subdomain_label(&self) -> String;
}

// ── Instance Registry Port ────────────────────────────────────────────────────

/// Durable record of provisioned instances.
#[allow(async_fn_in_trait)]
pub trait InstanceRegistry {
    /// Append a record.
    async fn record(&self, instance: &InstanceRecord) -> Result<()>;
    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<InstanceRecord>>;
}

// ── Route Lock Port ───────────────────────────────────────────────────────────

/// Exclusive access to the route table and hosts file, shared with every other
/// run on the host, in this process or another.
#[allow(async_fn_in_trait)]
pub trait RouteLock {
    /// Releases the lock when dropped.
    type Guard;

    /// Wait for exclusive access.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be obtained.
    async fn acquire(&self) -> Result<Self::Guard>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration loading.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when absent.
    fn load(&self) -> Result<IplessConfig>;
    /// Location the configuration is read from.
    fn path(&self) -> Result<PathBuf>;
}

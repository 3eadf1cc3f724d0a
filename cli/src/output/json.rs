//! JSON output helpers.
//!
//! `JsonRenderer` prints one pretty-printed JSON document per command on
//! stdout. `format_error` is the error object used by every `--json` code path
//! when a command fails outside the provisioning result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{InstanceRecord, IplessConfig, ProvisionResult};

/// Renders domain types as JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    fn print(value: &impl Serialize) -> Result<()> {
        let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
        println!("{out}");
        Ok(())
    }

    /// Render the provisioning result object.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_provision(&self, result: &ProvisionResult) -> Result<()> {
        Self::print(result)
    }

    /// Render `{"instances": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_instances(&self, instances: &[InstanceRecord]) -> Result<()> {
        Self::print(&serde_json::json!({ "instances": instances }))
    }

    /// Render `{"pruned": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_pruned(&self, pruned: &[PathBuf]) -> Result<()> {
        Self::print(&serde_json::json!({ "pruned": pruned }))
    }

    /// Render `{"path": ..., "config": {...}}`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &IplessConfig, path: &Path) -> Result<()> {
        Self::print(&serde_json::json!({ "path": path, "config": config }))
    }

    /// Render `{"path": ...}`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_path(&self, path: &Path) -> Result<()> {
        Self::print(&serde_json::json!({ "path": path }))
    }

    /// Render `{"version": ...}`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        Self::print(&serde_json::json!({ "version": version }))
    }
}

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen in
/// practice: `serde_json` only fails on non-finite floats and maps with
/// non-string keys, neither of which appear here).
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

//! Application services: use-case orchestration.
//!
//! Each service module implements one pipeline step by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`. `provision` sequences them.

pub mod fetch;
pub mod launcher;
pub mod naming;
pub mod provision;
pub mod proxy;
pub mod resolution;
pub mod workspace;

use std::process::Output;

use anyhow::{Result, bail};

/// Substitute `{name}` placeholders in a configured argv template.
#[must_use]
pub fn expand_argv(template: &[String], values: &[(&str, &str)]) -> Vec<String> {
    template
        .iter()
        .map(|arg| {
            values
                .iter()
                .fold(arg.clone(), |acc, (key, value)| acc.replace(key, value))
        })
        .collect()
}

/// Split an argv into program and arguments.
///
/// # Errors
///
/// Returns an error if the argv is empty.
pub fn split_argv(argv: &[String]) -> Result<(&str, Vec<&str>)> {
    let Some((program, args)) = argv.split_first() else {
        bail!("empty command");
    };
    Ok((program.as_str(), args.iter().map(String::as_str).collect()))
}

/// Diagnostic text of a finished command: stderr verbatim, falling back to
/// stdout, then to the exit status.
#[must_use]
pub fn diagnostic(output: &Output) -> String {
    if !output.stderr.is_empty() {
        return String::from_utf8_lossy(&output.stderr).into_owned();
    }
    if !output.stdout.is_empty() {
        return String::from_utf8_lossy(&output.stdout).into_owned();
    }
    format!("exited with {}", output.status)
}

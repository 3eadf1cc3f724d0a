//! `ipless config`: inspect configuration.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::output::Renderer;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (file values over defaults)
    Show,
    /// Print the configuration file location
    Path,
}

/// Show the effective configuration.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or serialization
/// fails.
pub fn show(app: &AppContext) -> Result<ExitCode> {
    let path = app.config_store.path()?;
    app.renderer().render_config(&app.config, &path)?;
    Ok(ExitCode::SUCCESS)
}

/// Print where configuration is read from. Works even when the file is invalid.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn path(store: &impl ConfigStore, renderer: &Renderer<'_>) -> Result<ExitCode> {
    renderer.render_path(&store.path()?)?;
    Ok(ExitCode::SUCCESS)
}

//! `ipless routes`: maintenance of the proxy route table.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::RouteLock;
use crate::application::services::proxy;

/// Routes subcommands.
#[derive(Subcommand)]
pub enum RoutesCommand {
    /// Remove activation markers whose route definition no longer exists
    Prune,
}

/// Run the routes command.
///
/// # Errors
///
/// Returns an error if the route-table lock cannot be taken, the activation
/// directory cannot be scanned, or a marker cannot be removed.
pub async fn run(app: &AppContext, cmd: RoutesCommand) -> Result<ExitCode> {
    match cmd {
        RoutesCommand::Prune => {
            let pruned = {
                let _guard = app.route_lock.acquire().await?;
                proxy::prune_broken_markers(&app.fs, &app.config.paths.sites_enabled)?
            };
            app.renderer().render_pruned(&pruned)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

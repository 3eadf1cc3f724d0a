//! `ipless instances`: list provisioned instances.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::InstanceRegistry;

/// Run the instances command.
///
/// # Errors
///
/// Returns an error if the registry cannot be read.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let instances = app.registry.list().await?;
    app.renderer().render_instances(&instances)?;
    Ok(ExitCode::SUCCESS)
}

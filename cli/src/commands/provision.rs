//! `ipless provision`: run the provisioning pipeline once.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::provision;
use crate::domain::{ProvisionRequest, StatusClass};
use crate::output::TerminalReporter;

/// Arguments for the provision command.
#[derive(Args)]
pub struct ProvisionArgs {
    /// Base64-encoded access token for the repository host
    #[arg(long, env = "IPLESS_CREDENTIAL", hide_env_values = true)]
    pub credential: Option<String>,

    /// HTTPS URL of the repository to provision
    #[arg(long = "repo-url", value_name = "URL")]
    pub repo_url: Option<String>,
}

/// Exit code for a status class: 0 success, 2 client error, 1 server error.
#[must_use]
pub fn exit_code(status: StatusClass) -> ExitCode {
    match status {
        StatusClass::Success => ExitCode::SUCCESS,
        StatusClass::ClientError => ExitCode::from(2),
        StatusClass::ServerError => ExitCode::FAILURE,
    }
}

/// Run the provision command.
///
/// Pipeline failures are rendered as a result, not returned as errors.
///
/// # Errors
///
/// Returns an error only if rendering fails.
pub async fn run(app: &AppContext, args: ProvisionArgs) -> Result<ExitCode> {
    let request = ProvisionRequest {
        credential: args.credential,
        repository_url: args.repo_url,
    };
    let reporter = TerminalReporter::new(&app.output);
    let result = provision::provision(&app.provision_context(), &reporter, &request).await;
    app.renderer().render_provision(&result)?;
    Ok(exit_code(result.status()))
}

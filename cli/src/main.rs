//! ipless - provision git repositories behind a local reverse proxy

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ipless_cli::cli::Cli;
use ipless_cli::output::{OutputContext, json::format_error};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let json = cli.json;
    let no_color = cli.no_color;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            if json {
                match format_error(&format!("{e:#}"), "InternalError") {
                    Ok(out) => println!("{out}"),
                    Err(_) => eprintln!("Error: {e:#}"),
                }
            } else {
                OutputContext::new(no_color, false).error(&format!("{e:#}"));
            }
            ExitCode::FAILURE
        }
    }
}

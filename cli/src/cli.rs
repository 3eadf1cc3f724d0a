//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, OutputFlags};
use crate::commands;
use crate::infra::config::YamlConfigStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Provision a git repository as a locally routed application
#[derive(Parser)]
#[command(
    name = "ipless",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch a repository, route a fresh subdomain to it and start it
    Provision(commands::provision::ProvisionArgs),

    /// Maintain proxy routes
    #[command(subcommand)]
    Routes(commands::routes::RoutesCommand),

    /// List provisioned instances
    Instances,

    /// Inspect configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Default tracing filter for the chosen verbosity.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "ipless_cli=debug,info",
            _ => "trace",
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the command fails
    /// outside its own result reporting.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            command,
            ..
        } = self;
        let store = YamlConfigStore::new();

        // Commands that must work without a loadable config.
        if matches!(
            command,
            Command::Version | Command::Config(commands::config::ConfigCommand::Path)
        ) {
            let output = OutputContext::new(no_color, quiet);
            let renderer = if json {
                Renderer::Json(JsonRenderer)
            } else {
                Renderer::Human(HumanRenderer::new(&output))
            };
            return match command {
                Command::Version => commands::version::run(&renderer),
                _ => commands::config::path(&store, &renderer),
            };
        }

        let flags = OutputFlags {
            no_color,
            quiet,
            json,
        };
        let app = AppContext::new(&flags, store)?;
        match command {
            Command::Provision(args) => commands::provision::run(&app, args).await,
            Command::Routes(cmd) => commands::routes::run(&app, cmd).await,
            Command::Instances => commands::instances::run(&app).await,
            Command::Config(_) => commands::config::show(&app),
            Command::Version => commands::version::run(&app.renderer()),
        }
    }
}

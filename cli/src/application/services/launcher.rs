//! Application service: start the application in a visible session.
//!
//! Fire-and-forget: the launcher is spawned detached and never awaited. The
//! only thing kept is the PID the platform reports, for the instance registry.

use anyhow::Result;

use crate::application::ports::CommandRunner;
use crate::domain::config::CommandsConfig;
use crate::domain::error::ProvisionError;
use crate::domain::provision::display_path;
use crate::domain::workspace::Workspace;

/// One way of starting the shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchPlan {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }
}

/// Quote `s` for a POSIX shell.
#[must_use]
pub fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// `cd` into the workspace, install, then run.
#[must_use]
pub fn shell_command(os: &str, workspace: &str, commands: &CommandsConfig) -> String {
    let cd = if os == "windows" {
        format!("cd /d \"{workspace}\"")
    } else {
        format!("cd {}", sh_quote(workspace))
    };
    let mut steps = vec![cd];
    if !commands.install.trim().is_empty() {
        steps.push(commands.install.clone());
    }
    steps.push(commands.run.clone());
    steps.join(" && ")
}

/// Candidate plans for `os`, most preferred first.
///
/// Every OS ends with a detached background shell so an instance still starts
/// when no terminal emulator is available.
#[must_use]
pub fn launch_plans(os: &str, command: &str) -> Vec<LaunchPlan> {
    let keep_open = format!("{command}; exec \"${{SHELL:-sh}}\"");
    let mut plans = match os {
        "linux" | "freebsd" | "openbsd" | "netbsd" => vec![
            LaunchPlan::new("gnome-terminal", &["--", "sh", "-c", &keep_open]),
            LaunchPlan::new("x-terminal-emulator", &["-e", "sh", "-c", &keep_open]),
        ],
        "macos" => {
            let escaped = command.replace('\\', "\\\\").replace('"', "\\\"");
            let script = format!("tell application \"Terminal\" to do script \"{escaped}\"");
            vec![LaunchPlan::new("osascript", &["-e", &script])]
        }
        "windows" => {
            return vec![LaunchPlan::new(
                "cmd",
                &["/C", "start", "cmd", "/K", command],
            )];
        }
        _ => Vec::new(),
    };
    plans.push(LaunchPlan::new("sh", &["-c", command]));
    plans
}

/// Start the application for `workspace`.
///
/// Tries each plan for the host OS in turn and stops at the first that spawns.
///
/// # Errors
///
/// Returns [`ProvisionError::LaunchFailed`] if no plan could be spawned.
pub fn launch(
    runner: &impl CommandRunner,
    commands: &CommandsConfig,
    workspace: &Workspace,
    os: &str,
) -> Result<Option<u32>> {
    let path = display_path(&workspace.path);
    let command = shell_command(os, &path, commands);
    let mut failures = Vec::new();

    for plan in launch_plans(os, &command) {
        let args: Vec<&str> = plan.args.iter().map(String::as_str).collect();
        match runner.spawn_detached(&plan.program, &args, &workspace.path) {
            Ok(pid) => {
                tracing::info!(program = %plan.program, ?pid, path = %path, "application launched");
                return Ok(pid);
            }
            Err(e) => {
                tracing::debug!(program = %plan.program, error = %e, "launch plan failed");
                failures.push(format!("{}: {e:#}", plan.program));
            }
        }
    }

    Err(ProvisionError::LaunchFailed {
        path,
        detail: failures.join("\n"),
    }
    .into())
}

//! Tests for the `launcher` application service.

#![allow(clippy::expect_used)]

use ipless_cli::application::services::launcher::launch;
use ipless_cli::application::services::workspace::allocate_workspace;
use ipless_cli::domain::{ErrorKind, ProvisionError};

use crate::helpers::{FakeRunner, HOST_FS, ScriptedIds, TestEnv};

#[test]
fn first_available_terminal_wins() {
    let env = TestEnv::new();
    let ws = allocate_workspace(&HOST_FS, &ScriptedIds::new(), &env.config.paths.workspace_root, "app")
        .expect("allocate");
    let runner = FakeRunner::new().failing_spawn("gnome-terminal");

    let pid = launch(&runner, &env.config.commands, &ws, "linux").expect("launch");

    assert_eq!(pid, Some(4242));
    let spawned = runner.spawned();
    assert_eq!(spawned.len(), 1);
    let (argv, cwd) = &spawned[0];
    assert_eq!(argv[0], "x-terminal-emulator");
    assert_eq!(cwd, &ws.path);
    let script = argv.last().expect("script");
    assert!(script.contains("npm install && npm start"));
    assert!(script.contains(&ws.path.display().to_string()));
}

#[test]
fn every_plan_failing_is_launch_failed() {
    let env = TestEnv::new();
    let ws = allocate_workspace(&HOST_FS, &ScriptedIds::new(), &env.config.paths.workspace_root, "app")
        .expect("allocate");
    let runner = FakeRunner::new()
        .failing_spawn("gnome-terminal")
        .failing_spawn("x-terminal-emulator")
        .failing_spawn("sh");

    let err = launch(&runner, &env.config.commands, &ws, "linux").expect_err("no terminal");

    let pe = err.downcast_ref::<ProvisionError>().expect("pe");
    assert_eq!(pe.kind(), ErrorKind::LaunchFailed);
    assert!(pe.detail().contains("gnome-terminal"));
    assert!(pe.detail().contains("sh"));
}

#[test]
fn windows_opens_a_new_console() {
    let env = TestEnv::new();
    let ws = allocate_workspace(&HOST_FS, &ScriptedIds::new(), &env.config.paths.workspace_root, "app")
        .expect("allocate");
    let runner = FakeRunner::new();

    launch(&runner, &env.config.commands, &ws, "windows").expect("launch");

    let (argv, _) = &runner.spawned()[0];
    assert_eq!(&argv[..5], ["cmd", "/C", "start", "cmd", "/K"]);
    assert!(argv[5].starts_with("cd /d \""));
}

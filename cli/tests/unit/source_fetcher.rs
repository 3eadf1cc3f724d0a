//! Tests for the `fetch` application service.

#![allow(clippy::expect_used)]

use std::time::Duration;

use ipless_cli::application::services::fetch::{CredentialLeftInWorkspace, fetch_source};
use ipless_cli::application::services::workspace::allocate_workspace;
use ipless_cli::domain::credential::{authenticated_url, decode_credential};
use ipless_cli::domain::{ErrorKind, ProvisionError, Workspace};

use crate::helpers::{CREDENTIAL, FakeRunner, HOST_FS, Outcome, REPO_URL, SECRET, ScriptedIds, TestEnv};

const TIMEOUT: Duration = Duration::from_secs(5);

fn workspace(env: &TestEnv) -> Workspace {
    allocate_workspace(&HOST_FS, &ScriptedIds::new(), &env.config.paths.workspace_root, "app")
        .expect("allocate")
}

#[tokio::test]
async fn clones_with_authenticated_url_then_scrubs_remote() {
    let env = TestEnv::new();
    let ws = workspace(&env);
    let runner = FakeRunner::new();
    let secret = decode_credential(CREDENTIAL).expect("decode");
    let url = authenticated_url(&secret, REPO_URL).expect("url");

    fetch_source(&runner, &env.config.commands, TIMEOUT, &secret, &url, REPO_URL, &ws)
        .await
        .expect("fetch");

    let dest = ws.path.display().to_string();
    assert_eq!(
        runner.calls(),
        vec![
            vec![
                "fetch".to_owned(),
                "https://tok123@github.com/example/app.git".to_owned(),
                dest.clone(),
            ],
            vec!["scrub".to_owned(), dest, REPO_URL.to_owned()],
        ]
    );
    assert!(ws.path.join("package.json").exists());
}

#[tokio::test]
async fn nonzero_exit_is_fetch_failed_with_stderr_verbatim() {
    let env = TestEnv::new();
    let ws = workspace(&env);
    let stderr = "fatal: repository 'https://github.com/example/app.git/' not found\n";
    let runner = FakeRunner::new().script("fetch", [Outcome::Fail(128, stderr)]);
    let secret = decode_credential(CREDENTIAL).expect("decode");
    let url = authenticated_url(&secret, REPO_URL).expect("url");

    let err = fetch_source(&runner, &env.config.commands, TIMEOUT, &secret, &url, REPO_URL, &ws)
        .await
        .expect_err("fail");

    let pe = err.downcast_ref::<ProvisionError>().expect("provision error");
    assert_eq!(pe.kind(), ErrorKind::FetchFailed);
    assert_eq!(pe.detail(), stderr);
    assert!(runner.calls_to("scrub").is_empty());
    assert!(err.downcast_ref::<CredentialLeftInWorkspace>().is_none());
}

#[tokio::test]
async fn secret_echoed_by_tool_is_redacted() {
    let env = TestEnv::new();
    let ws = workspace(&env);
    let runner = FakeRunner::new().script(
        "fetch",
        [Outcome::Fail(128, "fatal: could not read from https://tok123@github.com/example/app.git\n")],
    );
    let secret = decode_credential(CREDENTIAL).expect("decode");
    let url = authenticated_url(&secret, REPO_URL).expect("url");

    let err = fetch_source(&runner, &env.config.commands, TIMEOUT, &secret, &url, REPO_URL, &ws)
        .await
        .expect_err("fail");

    let text = format!("{err:#} {}", err.downcast_ref::<ProvisionError>().expect("pe").detail());
    assert!(!text.contains(SECRET), "secret leaked: {text}");
    assert!(text.contains("https://***@github.com"));
}

#[tokio::test]
async fn timeout_is_fetch_failed() {
    let env = TestEnv::new();
    let ws = workspace(&env);
    let runner = FakeRunner::new().script("fetch", [Outcome::Error("fetch timed out after 300s")]);
    let secret = decode_credential(CREDENTIAL).expect("decode");
    let url = authenticated_url(&secret, REPO_URL).expect("url");

    let err = fetch_source(&runner, &env.config.commands, TIMEOUT, &secret, &url, REPO_URL, &ws)
        .await
        .expect_err("timeout");

    let pe = err.downcast_ref::<ProvisionError>().expect("pe");
    assert_eq!(pe.kind(), ErrorKind::FetchFailed);
    assert!(pe.detail().contains("timed out"));
}

#[tokio::test]
async fn scrub_failure_is_fetch_failed() {
    let env = TestEnv::new();
    let ws = workspace(&env);
    let runner = FakeRunner::new().script("scrub", [Outcome::Fail(1, "error: no such remote\n")]);
    let secret = decode_credential(CREDENTIAL).expect("decode");
    let url = authenticated_url(&secret, REPO_URL).expect("url");

    let err = fetch_source(&runner, &env.config.commands, TIMEOUT, &secret, &url, REPO_URL, &ws)
        .await
        .expect_err("scrub fails");

    assert_eq!(
        err.downcast_ref::<ProvisionError>().map(ProvisionError::kind),
        Some(ErrorKind::FetchFailed)
    );
    assert!(err.downcast_ref::<CredentialLeftInWorkspace>().is_some());
}

#[tokio::test]
async fn empty_scrub_command_is_skipped() {
    let mut env = TestEnv::new();
    env.config.commands.scrub_remote.clear();
    let ws = workspace(&env);
    let runner = FakeRunner::new();
    let secret = decode_credential(CREDENTIAL).expect("decode");
    let url = authenticated_url(&secret, REPO_URL).expect("url");

    fetch_source(&runner, &env.config.commands, TIMEOUT, &secret, &url, REPO_URL, &ws)
        .await
        .expect("fetch");

    assert_eq!(runner.calls().len(), 1);
}

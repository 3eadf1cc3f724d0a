//! Shared test helpers: fakes for every port and a temp-dir environment.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use ipless_cli::application::ports::{CommandRunner, IdSource, InstanceRegistry, ProgressReporter};
use ipless_cli::application::services::provision::ProvisionContext;
use ipless_cli::domain::InstanceRecord;
use ipless_cli::domain::config::IplessConfig;
use ipless_cli::infra::fs::HostFs;
use ipless_cli::infra::lock::FileLock;
use tempfile::TempDir;

/// Base64 of `tok123`.
pub const CREDENTIAL: &str = "dG9rMTIz";
pub const SECRET: &str = "tok123";
pub const REPO_URL: &str = "https://github.com/example/app.git";

pub static HOST_FS: HostFs = HostFs;

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Fake command runner ──────────────────────────────────────────────────────

/// Scripted result of one command invocation.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Exit 0. `fetch` populates the destination, `append` appends stdin to
    /// the hosts file named by its first argument.
    Ok,
    /// Exit nonzero with the given stderr.
    Fail(i32, &'static str),
    /// The runner itself errors (spawn failure or timeout).
    Error(&'static str),
}

/// `CommandRunner` fake keyed by program name.
///
/// Each program has a queue of outcomes; an empty queue means [`Outcome::Ok`].
/// Every invocation is recorded as its full argv.
#[derive(Default)]
pub struct FakeRunner {
    scripts: Mutex<HashMap<String, VecDeque<Outcome>>>,
    calls: Mutex<Vec<Vec<String>>>,
    spawned: Mutex<Vec<(Vec<String>, PathBuf)>>,
    /// Programs whose `spawn_detached` fails.
    spawn_failures: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn script(self, program: &str, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.scripts
            .lock()
            .expect("lock")
            .entry(program.to_owned())
            .or_default()
            .extend(outcomes);
        self
    }

    #[must_use]
    pub fn failing_spawn(self, program: &str) -> Self {
        self.spawn_failures.lock().expect("lock").push(program.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|argv| argv.first().is_some_and(|p| p == program))
            .collect()
    }

    pub fn spawned(&self) -> Vec<(Vec<String>, PathBuf)> {
        self.spawned.lock().expect("lock").clone()
    }

    fn next(&self, program: &str, args: &[&str]) -> Outcome {
        let mut argv = vec![program.to_owned()];
        argv.extend(args.iter().map(|a| (*a).to_owned()));
        self.calls.lock().expect("lock").push(argv);
        self.scripts
            .lock()
            .expect("lock")
            .get_mut(program)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Outcome::Ok)
    }
}

impl CommandRunner for FakeRunner {
    async fn run_with_timeout(&self, program: &str, args: &[&str], _: Duration) -> Result<Output> {
        match self.next(program, args) {
            Outcome::Ok => {
                if program == "fetch" {
                    if let Some(dest) = args.get(1) {
                        std::fs::write(Path::new(dest).join("package.json"), "{}")?;
                    }
                }
                Ok(ok_output(b""))
            }
            Outcome::Fail(code, stderr) => Ok(err_output(code, stderr.as_bytes())),
            Outcome::Error(msg) => anyhow::bail!("{msg}"),
        }
    }

    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        stdin: &[u8],
        _: Duration,
    ) -> Result<Output> {
        match self.next(program, args) {
            Outcome::Ok => {
                if let Some(path) = args.first() {
                    let mut file = std::fs::OpenOptions::new().append(true).open(path)?;
                    file.write_all(stdin)?;
                }
                Ok(ok_output(b""))
            }
            Outcome::Fail(code, stderr) => Ok(err_output(code, stderr.as_bytes())),
            Outcome::Error(msg) => anyhow::bail!("{msg}"),
        }
    }

    fn spawn_detached(&self, program: &str, args: &[&str], cwd: &Path) -> Result<Option<u32>> {
        if self.spawn_failures.lock().expect("lock").iter().any(|p| p == program) {
            anyhow::bail!("failed to spawn {program}");
        }
        let mut argv = vec![program.to_owned()];
        argv.extend(args.iter().map(|a| (*a).to_owned()));
        self.spawned.lock().expect("lock").push((argv, cwd.to_path_buf()));
        Ok(Some(4242))
    }
}

// ── Fake identifier source ───────────────────────────────────────────────────

/// Hands out queued identifiers, then deterministic fresh ones.
#[derive(Default)]
pub struct ScriptedIds {
    suffixes: Mutex<VecDeque<String>>,
    labels: Mutex<VecDeque<String>>,
    counter: Mutex<u32>,
}

impl ScriptedIds {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_suffixes(self, suffixes: &[&str]) -> Self {
        self.suffixes
            .lock()
            .expect("lock")
            .extend(suffixes.iter().map(|s| (*s).to_owned()));
        self
    }

    #[must_use]
    pub fn with_labels(self, labels: &[&str]) -> Self {
        self.labels
            .lock()
            .expect("lock")
            .extend(labels.iter().map(|s| (*s).to_owned()));
        self
    }

    fn tick(&self) -> u32 {
        let mut n = self.counter.lock().expect("lock");
        *n += 1;
        *n
    }
}

impl IdSource for ScriptedIds {
    fn hex_suffix(&self) -> String {
        let queued = self.suffixes.lock().expect("lock").pop_front();
        queued.unwrap_or_else(|| format!("{:08x}", self.tick()))
    }

    fn subdomain_label(&self) -> String {
        let queued = self.labels.lock().expect("lock").pop_front();
        queued.unwrap_or_else(|| format!("lbl{:05}", self.tick()))
    }
}

// ── Fake registry ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryRegistry {
    pub records: Mutex<Vec<InstanceRecord>>,
    pub fail: bool,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<InstanceRecord> {
        self.records.lock().expect("lock").clone()
    }
}

impl InstanceRegistry for MemoryRegistry {
    async fn record(&self, instance: &InstanceRecord) -> Result<()> {
        if self.fail {
            anyhow::bail!("registry is read-only");
        }
        self.records.lock().expect("lock").push(instance.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<InstanceRecord>> {
        Ok(self.records())
    }
}

// ── Reporters ────────────────────────────────────────────────────────────────

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

/// Records every message, prefixed with its level.
#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn all(&self) -> Vec<String> {
        self.messages.lock().expect("lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("success: {message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("warn: {message}"));
    }
}

// ── Temp-dir environment ─────────────────────────────────────────────────────

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_owned()).collect()
}

/// Workspace root, proxy directories and hosts file under one temp dir, with
/// commands renamed so [`FakeRunner`] can tell them apart.
pub struct TestEnv {
    pub dir: TempDir,
    pub config: IplessConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        let mut config = IplessConfig::default();
        config.paths.workspace_root = root.join("projects");
        config.paths.sites_available = root.join("sites-available");
        config.paths.sites_enabled = root.join("sites-enabled");
        config.paths.hosts_file = root.join("hosts");
        config.commands.fetch = argv(&["fetch", "{url}", "{dest}"]);
        config.commands.scrub_remote = argv(&["scrub", "{dest}", "{url}"]);
        config.commands.proxy_validate = argv(&["validate"]);
        config.commands.proxy_reload = argv(&["reload"]);
        config.commands.hosts_append = argv(&["append", "{hosts_file}"]);

        for d in [
            &config.paths.workspace_root,
            &config.paths.sites_available,
            &config.paths.sites_enabled,
        ] {
            std::fs::create_dir_all(d).expect("mkdir");
        }
        std::fs::write(&config.paths.hosts_file, "127.0.0.1 localhost\n").expect("hosts");
        Self { dir, config }
    }

    pub fn context<'a>(
        &'a self,
        runner: &'a FakeRunner,
        ids: &'a ScriptedIds,
        registry: &'a MemoryRegistry,
        lock: &'a FileLock,
    ) -> ProvisionContext<'a, FakeRunner, HostFs, ScriptedIds, MemoryRegistry, FileLock> {
        ProvisionContext {
            runner,
            fs: &HOST_FS,
            ids,
            registry,
            config: &self.config,
            route_lock: lock,
            host_os: "linux",
        }
    }

    /// A route lock private to this environment.
    pub fn route_lock(&self) -> FileLock {
        FileLock::with_path(self.dir.path().join("routes.lock"))
    }

    pub fn hosts(&self) -> String {
        std::fs::read_to_string(&self.config.paths.hosts_file).expect("read hosts")
    }

    pub fn entries(dir: &Path) -> Vec<PathBuf> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)
            .expect("read_dir")
            .map(|e| e.expect("entry").path())
            .collect();
        entries.sort();
        entries
    }

    pub fn workspaces(&self) -> Vec<PathBuf> {
        Self::entries(&self.config.paths.workspace_root)
    }

    pub fn definitions(&self) -> Vec<PathBuf> {
        Self::entries(&self.config.paths.sites_available)
    }

    pub fn markers(&self) -> Vec<PathBuf> {
        Self::entries(&self.config.paths.sites_enabled)
    }
}

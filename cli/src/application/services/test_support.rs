//! Shared test doubles for application service tests.
//!
//! Provides cross-platform `exit_status()`, canned `Output` builders and
//! in-memory implementations of the port traits.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Mutex;

use anyhow::Result;

use crate::application::ports::{
    CommandRunner, Downloader, InstallLocker, LocalFs, ProgressReporter, ResourceFetcher,
    RuntimePropertyStore, ServiceAction, ServiceManager,
};
use crate::domain::{InstallerError, RuntimeProperties};

/// Build an `ExitStatus` from a logical exit code (cross-platform).
#[cfg(unix)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    std::process::ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn fail_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── CommandRunner ─────────────────────────────────────────────────────────────

/// Records every argv it is asked to run and answers from a script.
///
/// Queued outputs are consumed in order; once the queue is empty the
/// `fallback` output is returned. Commands whose joined argv contains a
/// `fail_on` pattern get that pattern's output instead.
pub struct RecordingRunner {
    calls: Mutex<Vec<Vec<String>>>,
    queue: Mutex<VecDeque<Output>>,
    fallback: Option<Output>,
    fail_on: Vec<(String, Output)>,
    spawn_error: Option<String>,
}

impl RecordingRunner {
    pub fn always(output: Output) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            queue: Mutex::new(VecDeque::new()),
            fallback: Some(output),
            fail_on: Vec::new(),
            spawn_error: None,
        }
    }

    pub fn succeeding() -> Self {
        Self::always(ok_output(b""))
    }

    pub fn sequence(outputs: Vec<Output>) -> Self {
        let fallback = outputs.last().cloned();
        Self {
            queue: Mutex::new(outputs.into()),
            fallback,
            ..Self::succeeding()
        }
    }

    pub fn spawn_error(message: &str) -> Self {
        Self {
            spawn_error: Some(message.to_string()),
            ..Self::succeeding()
        }
    }

    pub fn failing_on(mut self, pattern: &str, output: Output) -> Self {
        self.fail_on.push((pattern.to_string(), output));
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("lock").clone()
    }

    /// Calls rendered as single space-joined lines, for `contains` checks.
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(|argv| argv.join(" ")).collect()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, std::time::Duration::from_secs(1))
            .await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: std::time::Duration,
    ) -> Result<Output> {
        let mut argv = vec![program.to_string()];
        argv.extend(args.iter().map(ToString::to_string));
        let line = argv.join(" ");
        self.calls.lock().expect("lock").push(argv);

        if let Some(msg) = &self.spawn_error {
            anyhow::bail!("failed to spawn {program}: {msg}");
        }
        if let Some((_, output)) = self.fail_on.iter().find(|(p, _)| line.contains(p.as_str())) {
            return Ok(output.clone());
        }
        if let Some(output) = self.queue.lock().expect("lock").pop_front() {
            return Ok(output);
        }
        self.fallback
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no scripted output for {line}"))
    }
}

// ── Downloader / ResourceFetcher ──────────────────────────────────────────────

/// Writes fixed bytes into `temp_dir` as if they had been downloaded.
pub struct StubDownloader {
    pub body: Vec<u8>,
    pub fail: bool,
    pub urls: Mutex<Vec<String>>,
}

impl StubDownloader {
    pub fn serving(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            fail: false,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::serving(b"")
        }
    }
}

impl Downloader for StubDownloader {
    async fn download(&self, url: &str, temp_dir: &Path, filename: &str) -> Result<PathBuf> {
        self.urls.lock().expect("lock").push(url.to_string());
        if self.fail {
            return Err(InstallerError::DownloadError(format!("{url}: status 404")).into());
        }
        let path = temp_dir.join(format!(".shipctl-test-{filename}"));
        std::fs::write(&path, &self.body)?;
        Ok(path)
    }
}

/// Serves templates from a map of reference → text.
#[derive(Default)]
pub struct MapFetcher {
    pub resources: HashMap<String, String>,
}

impl MapFetcher {
    pub fn with(reference: &str, text: &str) -> Self {
        let mut resources = HashMap::new();
        resources.insert(reference.to_string(), text.to_string());
        Self { resources }
    }
}

impl ResourceFetcher for MapFetcher {
    async fn fetch_text(&self, reference: &str) -> Result<String> {
        self.resources
            .get(reference)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("resource not found: {reference}"))
    }
}

// ── LocalFs ───────────────────────────────────────────────────────────────────

/// In-memory filesystem: a map of file contents plus a set of directories.
#[derive(Default)]
pub struct MemoryFs {
    pub files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    pub dirs: Mutex<Vec<PathBuf>>,
    pub removed: Mutex<Vec<PathBuf>>,
}

impl MemoryFs {
    pub fn with_file(path: &str, content: &[u8]) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .expect("lock")
            .insert(PathBuf::from(path), content.to_vec());
        fs
    }

    pub fn with_dir(path: &str) -> Self {
        let fs = Self::default();
        fs.dirs.lock().expect("lock").push(PathBuf::from(path));
        fs
    }

    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().expect("lock").get(Path::new(path)).cloned()
    }
}

impl LocalFs for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.dirs.lock().expect("lock").iter().any(|d| d == path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.lock().expect("lock").contains_key(path)
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        self.files
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.files.lock().expect("lock").remove(path);
        self.removed.lock().expect("lock").push(path.to_path_buf());
        Ok(())
    }
}

// ── Locker / Store / Reporter / ServiceManager ────────────────────────────────

pub struct NoopLocker;

impl InstallLocker for NoopLocker {
    fn acquire(&self, _: &Path) -> Result<Box<dyn std::any::Any>> {
        Ok(Box::new(()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub props: Mutex<Option<RuntimeProperties>>,
}

impl RuntimePropertyStore for MemoryStore {
    async fn load_async(&self) -> Result<Option<RuntimeProperties>> {
        Ok(self.props.lock().expect("lock").clone())
    }

    async fn save_async(&self, props: &RuntimeProperties) -> Result<()> {
        *self.props.lock().expect("lock") = Some(props.clone());
        Ok(())
    }
}

/// Collects reported messages.
#[derive(Default)]
pub struct CollectingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl ProgressReporter for CollectingReporter {
    fn step(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("warn: {message}"));
    }
}

/// Service manager that emits `<tool> <action> <service>`.
pub struct FakeManager(pub &'static str);

impl ServiceManager for FakeManager {
    fn name(&self) -> &'static str {
        self.0
    }

    fn command(&self, service: &str, action: ServiceAction) -> Vec<String> {
        vec![self.0.to_string(), action.verb().to_string(), service.to_string()]
    }
}

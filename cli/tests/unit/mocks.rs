//! Shared mock infrastructure for unit tests.
//!
//! Provides a scripted [`Backend`] and [`CommandRunner`] so each test file
//! doesn't have to re-define the same boilerplate.

#![allow(clippy::unwrap_used, dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hostcheck::application::ports::{Backend, CommandRunner, ProgressReporter};
use hostcheck::domain::error::{BackendError, TransportError};
use hostcheck::domain::exec::{ExecOutput, FileStat};
use hostcheck_common::CheckResult;

// ── Output helpers ────────────────────────────────────────────────────────────

pub fn out(code: i32, stdout: &str, stderr: &str) -> ExecOutput {
    ExecOutput {
        exit_code: code,
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

pub fn ok(stdout: &str) -> ExecOutput {
    out(0, stdout, "")
}

// ── Mock: scripted backend ────────────────────────────────────────────────────

/// What the fake target answers to one command.
pub enum Reply {
    Output(ExecOutput),
    Fault(TransportError),
    Delay(Duration, ExecOutput),
    /// Never answers.
    Hang,
}

struct FakeFile {
    stat: FileStat,
    content: Vec<u8>,
}

/// Backend answering from canned commands and files, recording every call.
#[derive(Default)]
pub struct FakeBackend {
    commands: HashMap<String, Reply>,
    files: HashMap<String, FakeFile>,
    unreadable: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(self, command: impl Into<String>, output: ExecOutput) -> Self {
        self.with_reply(command, Reply::Output(output))
    }

    pub fn with_reply(mut self, command: impl Into<String>, reply: Reply) -> Self {
        self.commands.insert(command.into(), reply);
        self
    }

    pub fn with_file(mut self, path: &str, owner: &str, group: &str, mode: u32, content: &str) -> Self {
        let stat = FileStat {
            exists: true,
            is_file: true,
            owner: owner.to_string(),
            group: group.to_string(),
            mode,
            size: content.len() as u64,
            ..FileStat::default()
        };
        self.files.insert(
            path.to_string(),
            FakeFile {
                stat,
                content: content.as_bytes().to_vec(),
            },
        );
        self
    }

    /// A file that exists but cannot be read.
    pub fn with_unreadable_file(mut self, path: &str) -> Self {
        let stat = FileStat {
            exists: true,
            is_file: true,
            owner: "root".to_string(),
            group: "root".to_string(),
            mode: 0o600,
            ..FileStat::default()
        };
        self.files.insert(
            path.to_string(),
            FakeFile {
                stat,
                content: Vec::new(),
            },
        );
        self.unreadable.insert(path.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Backend for FakeBackend {
    fn label(&self) -> String {
        "fake".to_string()
    }

    async fn execute(&self, command: &str) -> Result<ExecOutput, BackendError> {
        self.execute_with_timeout(command, Duration::from_secs(30)).await
    }

    async fn execute_with_timeout(
        &self,
        command: &str,
        _timeout: Duration,
    ) -> Result<ExecOutput, BackendError> {
        self.record(command.to_string());
        match self.commands.get(command) {
            Some(Reply::Output(output)) => Ok(output.clone()),
            Some(Reply::Fault(err)) => Err(BackendError::Transport(err.clone())),
            Some(Reply::Delay(delay, output)) => {
                tokio::time::sleep(*delay).await;
                Ok(output.clone())
            }
            Some(Reply::Hang) => std::future::pending().await,
            None => Ok(out(1, "", &format!("fake: no reply scripted for {command}"))),
        }
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>, BackendError> {
        self.record(format!("read_file {path}"));
        if self.unreadable.contains(path) {
            return Err(BackendError::PermissionDenied(path.to_string()));
        }
        self.files
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| BackendError::NotFound(path.to_string()))
    }

    async fn stat(&self, path: &str) -> Result<FileStat, BackendError> {
        self.record(format!("stat {path}"));
        Ok(self
            .files
            .get(path)
            .map_or_else(FileStat::missing, |f| f.stat.clone()))
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>, BackendError> {
        self.record(format!("list_dir {path}"));
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut entries: Vec<String> = self
            .files
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect();
        if entries.is_empty() {
            return Err(BackendError::NotFound(path.to_string()));
        }
        entries.sort();
        Ok(entries)
    }
}

// ── Mock: scripted command runner ─────────────────────────────────────────────

/// Calls seen by a [`FakeRunner`]; shared so tests can inspect it after the
/// runner has been moved into a backend.
#[derive(Default)]
pub struct RunnerLog {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    invocations: Mutex<Vec<(String, Vec<String>)>>,
}

impl RunnerLog {
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> Vec<(String, Vec<String>)> {
        self.invocations.lock().unwrap().clone()
    }
}

/// `CommandRunner` answering by the last argument (the shell command line for
/// local transports), tracking how many calls are in flight at once.
#[derive(Default)]
pub struct FakeRunner {
    replies: HashMap<String, ExecOutput>,
    delay: Duration,
    log: Arc<RunnerLog>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, last_arg: impl Into<String>, output: ExecOutput) -> Self {
        self.replies.insert(last_arg.into(), output);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn log(&self) -> Arc<RunnerLog> {
        Arc::clone(&self.log)
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<ExecOutput, TransportError> {
        self.run_with_timeout(program, args, Duration::from_secs(30)).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<ExecOutput, TransportError> {
        self.log.invocations.lock().unwrap().push((
            program.to_string(),
            args.iter().map(|a| (*a).to_string()).collect(),
        ));
        let now = self.log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.log.in_flight.fetch_sub(1, Ordering::SeqCst);

        let key = args.last().copied().unwrap_or(program);
        Ok(self
            .replies
            .get(key)
            .cloned()
            .unwrap_or_else(|| out(127, "", &format!("sh: {key}: not found"))))
    }
}

// ── Mock: progress reporter ───────────────────────────────────────────────────

/// Records finished check ids and warnings.
#[derive(Default)]
pub struct RecordingReporter {
    pub finished: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, _message: &str) {}

    fn check_finished(&self, result: &CheckResult) {
        self.finished.lock().unwrap().push(result.id.clone());
    }

    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}

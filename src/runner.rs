//! Subprocess runner for the `gammu-json` helper.
//!
//! The runner spawns the helper with a given argument vector, reads its
//! standard output to completion, and parses the result as JSON. Standard
//! input is closed immediately (the helper does not read it) and standard
//! error passes through as diagnostics. The poll scheduler is serial, so at
//! most one helper runs per phase and no concurrency control is needed here.

use std::{
    env,
    ffi::OsString,
    io,
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;

/// Errors produced while running the helper.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunnerError {
    /// The helper could not be spawned at all.
    #[error("helper could not be spawned: {0}")]
    Spawn(#[from] io::Error),
    /// The helper exited with a non-zero status (`None` when killed by a
    /// signal).
    #[error("helper exited with status {code:?}")]
    Exit { code: Option<i32> },
    /// The helper's standard output was not valid JSON.
    #[error("helper emitted invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Seam between the pipeline phases and the helper subprocess.
///
/// The pipelines only ever need "run these arguments, give me the JSON root",
/// which keeps the phases testable against scripted implementations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the helper once and return the parsed root of its output.
    async fn run(&self, args: &[String]) -> Result<Value, RunnerError>;
}

/// Production runner that spawns the `gammu-json` binary.
#[derive(Clone, Debug)]
pub struct GammuRunner {
    command: PathBuf,
    search_path: Option<OsString>,
}

impl GammuRunner {
    /// Runner for `command`, resolved through the inherited `PATH`.
    #[must_use]
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            search_path: None,
        }
    }

    /// Runner that resolves `command` with `<prefix>/bin` prepended to the
    /// `PATH` seen by the child.
    #[must_use]
    pub fn with_prefix(command: impl Into<PathBuf>, prefix: &Path) -> Self {
        Self {
            command: command.into(),
            search_path: Some(prefixed_path(prefix)),
        }
    }
}

fn prefixed_path(prefix: &Path) -> OsString {
    let bin = prefix.join("bin");
    let mut entries = vec![bin.clone()];
    if let Some(current) = env::var_os("PATH") {
        entries.extend(env::split_paths(&current));
    }
    // join_paths only fails on entries containing the separator itself; the
    // inherited PATH cannot, so fall back to the bare prefix entry.
    env::join_paths(entries).unwrap_or_else(|_| bin.into_os_string())
}

#[async_trait]
impl CommandRunner for GammuRunner {
    async fn run(&self, args: &[String]) -> Result<Value, RunnerError> {
        debug!("running helper: command={:?} args={args:?}", self.command);

        let mut command = Command::new(&self.command);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(path) = &self.search_path {
            command.env("PATH", path);
        }

        let child = command.spawn().map_err(RunnerError::Spawn)?;
        let output = child.wait_with_output().await.map_err(RunnerError::Spawn)?;

        if !output.status.success() {
            return Err(RunnerError::Exit {
                code: output.status.code(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(RunnerError::Parse)
    }
}

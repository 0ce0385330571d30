#![deny(clippy::all)]

mod child;
mod parent;
mod pipe;
mod signal;

pub use self::pipe::CapturedOutput;

use grader_utils::os_cmd::OsCmd;

use std::future::{self, Future};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone)]
pub struct SandboxArgs {
    pub cmd: OsCmd,

    /// Working directory of the child process.
    pub workdir: PathBuf,

    /// Written to the child's stdin, which is closed afterwards.
    pub stdin: Vec<u8>,

    pub real_time_limit: Duration,

    pub stdout_limit: usize, // bytes
    pub stderr_limit: usize, // bytes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Code(i32),
    Signal(i32),
    Unknown,
}

#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub status: ExitStatus,
    pub stdout: CapturedOutput,
    pub stderr: CapturedOutput,
    pub real_time: Duration,
    pub timed_out: bool,
    pub cancelled: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("failed to spawn {}: {source}", bin.display())]
    Spawn {
        bin: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for child process: {0}")]
    Wait(#[source] io::Error),
}

impl ProcessOutcome {
    /// Exited by itself with code 0.
    pub fn is_success(&self) -> bool {
        !self.timed_out && !self.cancelled && self.status == ExitStatus::Code(0)
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            ExitStatus::Code(code) => Some(code),
            _ => None,
        }
    }
}

/// Runs `args.cmd` to completion or until `args.real_time_limit` elapses.
pub async fn run(args: &SandboxArgs) -> Result<ProcessOutcome, SandboxError> {
    run_until(args, future::pending()).await
}

/// Like [`run`], but the child is also killed as soon as `cancel` resolves.
pub async fn run_until(
    args: &SandboxArgs,
    cancel: impl Future<Output = ()>,
) -> Result<ProcessOutcome, SandboxError> {
    debug!(cmd = %args.cmd, workdir = %args.workdir.display(), "spawn");

    let t0 = Instant::now();
    let child = child::spawn(args)?;
    let outcome = parent::supervise(child, args, t0, cancel).await?;

    debug!(
        status = ?outcome.status,
        real_time = ?outcome.real_time,
        timed_out = outcome.timed_out,
        cancelled = outcome.cancelled,
        stdout_len = outcome.stdout.len(),
        stderr_len = outcome.stderr.len(),
        "reaped"
    );

    Ok(outcome)
}

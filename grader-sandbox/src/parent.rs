use crate::pipe::{self, Drain};
use crate::signal::kill_group;
use crate::{ExitStatus, ProcessOutcome, SandboxArgs, SandboxError};

use std::future::Future;
use std::os::unix::process::ExitStatusExt;
use std::process;
use std::time::{Duration, Instant};

use nix::unistd::Pid;
use scopeguard::ScopeGuard;
use tokio::process::Child;
use tokio::time;
use tracing::debug;

/// How long output pipes may stay open after the child has been reaped.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

enum Termination {
    Exited(process::ExitStatus),
    TimedOut,
    Cancelled,
}

pub async fn supervise(
    mut child: Child,
    args: &SandboxArgs,
    t0: Instant,
    cancel: impl Future<Output = ()>,
) -> Result<ProcessOutcome, SandboxError> {
    let pgid = child.id().map(|id| Pid::from_raw(id as i32));
    debug!(?pgid, "child spawned");

    // the group is killed on every early return, including drops of this future
    let killer = scopeguard::guard(pgid, |pgid| {
        if let Some(pgid) = pgid {
            kill_group(pgid);
        }
    });

    let feeder = child
        .stdin
        .take()
        .map(|stdin| pipe::feed(stdin, args.stdin.clone()));
    let stdout = child
        .stdout
        .take()
        .map(|r| Drain::spawn("stdout", r, args.stdout_limit));
    let stderr = child
        .stderr
        .take()
        .map(|r| Drain::spawn("stderr", r, args.stderr_limit));

    let deadline = time::sleep(args.real_time_limit);
    tokio::pin!(deadline);
    tokio::pin!(cancel);

    let termination = tokio::select! {
        result = child.wait() => Termination::Exited(result.map_err(SandboxError::Wait)?),
        () = &mut deadline => Termination::TimedOut,
        () = &mut cancel => Termination::Cancelled,
    };

    let (status, timed_out, cancelled) = match termination {
        Termination::Exited(status) => (status, false, false),
        Termination::TimedOut => (kill_and_reap(&mut child, pgid).await?, true, false),
        Termination::Cancelled => (kill_and_reap(&mut child, pgid).await?, false, true),
    };
    let real_time = t0.elapsed();

    // Stray descendants may still hold the output pipes open. The group id
    // cannot be reused until the pid space wraps around.
    if let Some(pgid) = ScopeGuard::into_inner(killer) {
        kill_group(pgid);
    }

    if let Some(feeder) = feeder {
        feeder.abort();
    }

    let drain_deadline = time::Instant::now() + DRAIN_GRACE;
    let (stdout, stderr) = tokio::join!(
        finish_drain(stdout, drain_deadline),
        finish_drain(stderr, drain_deadline),
    );

    Ok(ProcessOutcome {
        status: exit_status(status),
        stdout,
        stderr,
        real_time,
        timed_out,
        cancelled,
    })
}

async fn kill_and_reap(
    child: &mut Child,
    pgid: Option<Pid>,
) -> Result<process::ExitStatus, SandboxError> {
    match pgid {
        Some(pgid) => kill_group(pgid),
        None => {
            let _ = child.start_kill();
        }
    }
    child.wait().await.map_err(SandboxError::Wait)
}

async fn finish_drain(drain: Option<Drain>, deadline: time::Instant) -> pipe::CapturedOutput {
    match drain {
        Some(drain) => drain.finish(deadline).await,
        None => pipe::CapturedOutput::default(),
    }
}

fn exit_status(status: process::ExitStatus) -> ExitStatus {
    if let Some(code) = status.code() {
        ExitStatus::Code(code)
    } else if let Some(signal) = status.signal() {
        ExitStatus::Signal(signal)
    } else {
        ExitStatus::Unknown
    }
}

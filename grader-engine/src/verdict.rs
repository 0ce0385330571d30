use grader_protocol::Verdict;
use grader_sandbox::{ExitStatus, ProcessOutcome};

use std::convert::TryFrom;

use nix::sys::signal::Signal;

pub const COMPILE_TIMEOUT_MESSAGE: &str = "Time Limit Exceeded during Compilation";

/// What happened to one supervised invocation.
#[derive(Debug)]
pub enum Stage {
    Finished(ProcessOutcome),
    /// The process could not be started, or supervising it failed.
    Failed(String),
}

impl Stage {
    pub fn is_success(&self) -> bool {
        match self {
            Stage::Finished(outcome) => outcome.is_success(),
            Stage::Failed(_) => false,
        }
    }
}

/// Maps the compile and run stages of one submission to its verdict.
///
/// `compile` is `None` for interpreted languages. `run` is `None` when the
/// run stage was never reached. A compiler that cannot be started is a
/// compile error carrying the start failure; a run that cannot be started
/// is an internal error.
pub fn classify(compile: Option<&Stage>, run: Option<&Stage>) -> Verdict {
    match compile {
        Some(Stage::Failed(err)) => return Verdict::compile_error(err.as_str()),
        Some(Stage::Finished(outcome)) if outcome.cancelled => {
            return Verdict::time_limit_exceeded(outcome.real_time.as_secs_f64())
        }
        Some(Stage::Finished(outcome)) if outcome.timed_out => {
            return Verdict::compile_error(COMPILE_TIMEOUT_MESSAGE)
        }
        Some(Stage::Finished(outcome)) if !outcome.is_success() => {
            return Verdict::compile_error(compiler_diagnostics(outcome))
        }
        Some(Stage::Finished(_)) | None => {}
    }

    let outcome = match run {
        None => return Verdict::internal_error("the run stage was not reached"),
        Some(Stage::Failed(err)) => return Verdict::internal_error(err.as_str()),
        Some(Stage::Finished(outcome)) => outcome,
    };

    let time = outcome.real_time.as_secs_f64();
    let stdout = outcome.stdout.to_string_lossy();

    if outcome.timed_out || outcome.cancelled {
        return Verdict::time_limit_exceeded(time);
    }

    if !outcome.is_success() {
        let stderr = outcome.stderr.to_string_lossy();
        let diagnostics = if stderr.trim().is_empty() {
            runtime_error_fallback(outcome.status)
        } else {
            stderr
        };
        return Verdict::runtime_error(stdout, diagnostics, time);
    }

    Verdict::accepted(stdout, time)
}

/// javac reports on stdout, gcc on stderr.
fn compiler_diagnostics(outcome: &ProcessOutcome) -> String {
    let mut diagnostics = outcome.stdout.to_string_lossy();
    diagnostics.push_str(&outcome.stderr.to_string_lossy());
    if diagnostics.trim().is_empty() {
        match outcome.status {
            ExitStatus::Code(code) => format!("Compilation Error (exit code {})", code),
            status => format!("Compilation Error ({})", describe_status(status)),
        }
    } else {
        diagnostics
    }
}

fn runtime_error_fallback(status: ExitStatus) -> String {
    format!("Runtime Error ({})", describe_status(status))
}

fn describe_status(status: ExitStatus) -> String {
    match status {
        ExitStatus::Code(code) => format!("exit code {}", code),
        ExitStatus::Signal(sig) => match Signal::try_from(sig) {
            Ok(signal) => signal.as_str().to_owned(),
            Err(_) => format!("signal {}", sig),
        },
        ExitStatus::Unknown => "unknown exit status".to_owned(),
    }
}

mod common;

use grader_sandbox::{ExitStatus, SandboxArgs, SandboxError};
use grader_utils::os_cmd::OsCmd;

use std::fs;
use std::time::{Duration, Instant};

use anyhow::Result;
use tempfile::TempDir;
use tokio::time;

#[tokio::test(flavor = "multi_thread")]
async fn echo_stdin() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;

    let mut args = common::sh(dir.path(), "cat");
    args.stdin = b"hello\nworld\n".to_vec();

    let outcome = grader_sandbox::run(&args).await?;
    assert!(outcome.is_success());
    assert_eq!(outcome.stdout.to_string_lossy(), "hello\nworld\n");
    assert!(outcome.stderr.is_empty());
    assert!(!outcome.stdout.truncated);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn nonzero_exit() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;

    let args = common::sh(dir.path(), "echo oops >&2; exit 3");
    let outcome = grader_sandbox::run(&args).await?;

    assert!(!outcome.is_success());
    assert_eq!(outcome.status, ExitStatus::Code(3));
    assert_eq!(outcome.exit_code(), Some(3));
    assert_eq!(outcome.stderr.to_string_lossy(), "oops\n");
    assert!(!outcome.timed_out);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn killed_by_signal() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;

    let args = common::sh(dir.path(), "kill -SEGV $$");
    let outcome = grader_sandbox::run(&args).await?;

    assert_eq!(outcome.status, ExitStatus::Signal(11));
    assert_eq!(outcome.exit_code(), None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn infinite_loop_times_out() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;

    let mut args = common::sh(dir.path(), "while :; do :; done");
    args.real_time_limit = Duration::from_millis(500);

    let t0 = Instant::now();
    let outcome = grader_sandbox::run(&args).await?;
    let elapsed = t0.elapsed();

    assert!(outcome.timed_out);
    assert!(!outcome.cancelled);
    assert!(!outcome.is_success());
    assert!(outcome.real_time >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_millis(2500), "elapsed = {:?}", elapsed);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn timeout_kills_descendants() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;

    // the background sleep inherits stdout and would keep the pipe open
    let mut args = common::sh(dir.path(), "sleep 30 & sleep 30");
    args.real_time_limit = Duration::from_millis(300);

    let t0 = Instant::now();
    let outcome = grader_sandbox::run(&args).await?;

    assert!(outcome.timed_out);
    assert!(t0.elapsed() < Duration::from_secs(3));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn orphans_do_not_stall_normal_exit() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;

    let args = common::sh(dir.path(), "sleep 30 & echo done");

    let t0 = Instant::now();
    let outcome = grader_sandbox::run(&args).await?;

    assert!(outcome.is_success());
    assert_eq!(outcome.stdout.to_string_lossy(), "done\n");
    assert!(t0.elapsed() < Duration::from_secs(3));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cancellation_takes_the_kill_path() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;

    let args = common::sh(dir.path(), "sleep 30");
    let cancel = time::sleep(Duration::from_millis(200));

    let t0 = Instant::now();
    let outcome = grader_sandbox::run_until(&args, cancel).await?;

    assert!(outcome.cancelled);
    assert!(!outcome.timed_out);
    assert!(!outcome.is_success());
    assert!(t0.elapsed() < Duration::from_secs(3));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_binary_is_a_spawn_error() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;

    let args = SandboxArgs {
        cmd: OsCmd::new("/nonexistent/toolchain/bin"),
        ..common::sh(dir.path(), "")
    };

    match grader_sandbox::run(&args).await {
        Err(SandboxError::Spawn { bin, .. }) => {
            assert_eq!(bin.to_str(), Some("/nonexistent/toolchain/bin"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn huge_output_is_capped() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;

    let mut args = common::sh(dir.path(), "head -c 104857600 /dev/zero");
    args.stdout_limit = 1024 * 1024;
    args.real_time_limit = Duration::from_secs(20);

    let outcome = grader_sandbox::run(&args).await?;

    assert!(outcome.is_success());
    assert!(outcome.stdout.truncated);
    assert_eq!(outcome.stdout.len(), 1024 * 1024);
    assert!(outcome.real_time < args.real_time_limit);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn large_stdin_with_large_stdout_does_not_deadlock() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;

    // both directions exceed the pipe capacity
    let mut args = common::sh(dir.path(), "cat");
    args.stdin = vec![b'x'; 8 * 1024 * 1024];
    args.stdout_limit = 64 * 1024;
    args.real_time_limit = Duration::from_secs(10);

    let outcome = grader_sandbox::run(&args).await?;

    assert!(outcome.is_success(), "outcome = {:?}", outcome.status);
    assert!(!outcome.timed_out);
    assert!(outcome.stdout.truncated);
    assert_eq!(outcome.stdout.len(), 64 * 1024);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn runs_inside_workdir_with_explicit_env() -> Result<()> {
    common::init();
    let dir = TempDir::new()?;
    fs::write(dir.path().join("marker.txt"), "inside\n")?;

    let mut args = common::sh(dir.path(), "cat marker.txt; echo \"$GRADER_VALUE:$HOME\"");
    args.cmd.add_env("GRADER_VALUE", "42");

    let outcome = grader_sandbox::run(&args).await?;

    assert!(outcome.is_success());
    assert_eq!(outcome.stdout.to_string_lossy(), "inside\n42:\n");
    Ok(())
}

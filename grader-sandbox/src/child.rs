use crate::{SandboxArgs, SandboxError};

use grader_utils::os_cmd::EnvVar;

use std::env;
use std::process::Stdio;

use tokio::process::{Child, Command};

/// Spawns the child as the leader of a new process group, with every stdio
/// stream piped and an environment built only from `args.cmd.env`.
pub fn spawn(args: &SandboxArgs) -> Result<Child, SandboxError> {
    let os_cmd = &args.cmd;

    let mut cmd = Command::new(&os_cmd.bin);
    cmd.args(&os_cmd.args);
    cmd.current_dir(&args.workdir);

    cmd.env_clear();
    for var in &os_cmd.env {
        match var {
            EnvVar::Inherit(k) => {
                if let Some(v) = env::var_os(k) {
                    cmd.env(k, v);
                }
            }
            EnvVar::Set(k, v) => {
                cmd.env(k, v);
            }
        }
    }

    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    cmd.process_group(0);
    cmd.kill_on_drop(true);

    cmd.spawn().map_err(|source| SandboxError::Spawn {
        bin: os_cmd.bin.clone(),
        source,
    })
}

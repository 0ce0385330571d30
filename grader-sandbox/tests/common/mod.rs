use grader_sandbox::SandboxArgs;
use grader_utils::os_cmd::OsCmd;

use std::path::Path;
use std::sync::Once;
use std::time::Duration;

pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(grader_utils::tracing::setup_test_tracing);
}

pub fn sh(workdir: &Path, script: &str) -> SandboxArgs {
    let mut cmd = OsCmd::new("/bin/sh");
    cmd.arg("-c").arg(script);
    cmd.inherit_env("PATH");

    SandboxArgs {
        cmd,
        workdir: workdir.to_owned(),
        stdin: Vec::new(),
        real_time_limit: Duration::from_secs(5),
        stdout_limit: 1024 * 1024,
        stderr_limit: 64 * 1024,
    }
}

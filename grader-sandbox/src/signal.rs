use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

/// Sends SIGKILL to every process in the group led by `pgid`.
pub fn kill_group(pgid: Pid) {
    match send_group_signal(pgid, Signal::SIGKILL) {
        Ok(()) | Err(nix::Error::Sys(Errno::ESRCH)) => {}
        Err(err) => warn!(%pgid, %err, "failed to kill process group"),
    }
}

fn send_group_signal(pgid: Pid, signal: Signal) -> nix::Result<()> {
    let result = signal::killpg(pgid, signal);
    debug!(
        "killpg pgid = {}, signal = {}, result = {:?}",
        pgid, signal, result
    );
    result
}

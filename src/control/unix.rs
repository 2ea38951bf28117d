use super::{PriorityValue, ProcessController, Signal};
use crate::error::ActionError;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal as NixSignal};
use nix::unistd::Pid;

/// Signals through `kill(2)`, niceness through `setpriority(2)`.
#[derive(Debug, Default)]
pub struct UnixController;

impl UnixController {
    pub fn new() -> Self {
        Self
    }
}

/// Only strictly positive pids address a single process.
fn target(pid: u32) -> Result<Pid, ActionError> {
    i32::try_from(pid)
        .ok()
        .filter(|raw| *raw > 0)
        .map(Pid::from_raw)
        .ok_or(ActionError::ProcessNotFound(pid))
}

fn map_errno(pid: u32, errno: Errno) -> ActionError {
    match errno {
        Errno::ESRCH => ActionError::ProcessNotFound(pid),
        Errno::EPERM | Errno::EACCES => ActionError::PermissionDenied(pid),
        other => ActionError::other(other.desc()),
    }
}

impl ProcessController for UnixController {
    fn send_signal(&mut self, pid: u32, signal: Signal) -> Result<(), ActionError> {
        let signal = match signal {
            Signal::Term => NixSignal::SIGTERM,
            Signal::Kill => NixSignal::SIGKILL,
            Signal::Stop => NixSignal::SIGSTOP,
            Signal::Cont => NixSignal::SIGCONT,
        };
        kill(target(pid)?, signal).map_err(|e| map_errno(pid, e))
    }

    fn set_priority(&mut self, pid: u32, value: PriorityValue) -> Result<(), ActionError> {
        let PriorityValue::Niceness(nice) = value else {
            return Err(ActionError::other(
                "priority classes are not supported on this platform",
            ));
        };
        let who = target(pid)?.as_raw() as libc::id_t;
        // SAFETY: plain syscall wrapper, no pointers involved.
        let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, who, nice) };
        if rc == -1 {
            return Err(map_errno(pid, Errno::last()));
        }
        Ok(())
    }

    fn has_exited(&mut self, pid: u32) -> bool {
        let Ok(pid_t) = target(pid) else {
            return true;
        };
        match kill(pid_t, None::<NixSignal>) {
            Err(Errno::ESRCH) => true,
            _ => is_zombie(pid_t),
        }
    }
}

#[cfg(target_os = "linux")]
fn is_zombie(pid: Pid) -> bool {
    procfs::process::Process::new(pid.as_raw())
        .and_then(|p| p.stat())
        .map(|stat| stat.state == 'Z' || stat.state == 'X')
        .unwrap_or(true)
}

#[cfg(not(target_os = "linux"))]
fn is_zombie(_pid: Pid) -> bool {
    false
}

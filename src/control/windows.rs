use super::{PriorityValue, ProcessController, Signal};
use crate::error::ActionError;
use log::debug;
use std::mem;
use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER, HANDLE,
    INVALID_HANDLE_VALUE, WAIT_OBJECT_0, WIN32_ERROR,
};
use windows_sys::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Thread32First, Thread32Next, TH32CS_SNAPTHREAD, THREADENTRY32,
};
use windows_sys::Win32::System::Threading::{
    OpenProcess, OpenThread, ResumeThread, SetPriorityClass, SuspendThread, TerminateProcess,
    WaitForSingleObject, PROCESS_ACCESS_RIGHTS, PROCESS_SET_INFORMATION, PROCESS_SUSPEND_RESUME,
    PROCESS_SYNCHRONIZE, PROCESS_TERMINATE, THREAD_SUSPEND_RESUME,
};

/// Exit code of a process ended by Terminate or Kill.
const TERMINATED_EXIT_CODE: u32 = 1;

/// Win32 process control.
///
/// There is no graceful stop on Windows for arbitrary processes: Terminate
/// and Kill both end in `TerminateProcess`. Suspend and Resume walk the
/// process's threads.
#[derive(Debug, Default)]
pub struct WindowsController;

impl WindowsController {
    pub fn new() -> Self {
        Self
    }
}

/// Kernel handle closed on drop.
struct OwnedHandle(HANDLE);

impl OwnedHandle {
    fn process(pid: u32, access: PROCESS_ACCESS_RIGHTS) -> Result<Self, ActionError> {
        // SAFETY: no preconditions; a null handle reports failure.
        let handle = unsafe { OpenProcess(access, 0, pid) };
        if handle.is_null() {
            Err(last_error(pid))
        } else {
            Ok(Self(handle))
        }
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        // SAFETY: the handle is valid and owned by us.
        unsafe {
            CloseHandle(self.0);
        }
    }
}

fn error_from_code(code: WIN32_ERROR, pid: u32) -> ActionError {
    match code {
        ERROR_ACCESS_DENIED => ActionError::PermissionDenied(pid),
        ERROR_INVALID_PARAMETER => ActionError::ProcessNotFound(pid),
        code => ActionError::other(format!("win32 error {code}")),
    }
}

fn last_error(pid: u32) -> ActionError {
    // SAFETY: reads thread-local error state only.
    error_from_code(unsafe { GetLastError() }, pid)
}

/// Ids of the threads owned by `pid`.
fn thread_ids(pid: u32) -> Result<Vec<u32>, ActionError> {
    // SAFETY: the snapshot handle is checked before use and closed by
    // `OwnedHandle`; `entry.dwSize` is set as Thread32First requires.
    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0);
        if snapshot == INVALID_HANDLE_VALUE {
            return Err(last_error(pid));
        }
        let snapshot = OwnedHandle(snapshot);

        let mut entry: THREADENTRY32 = mem::zeroed();
        entry.dwSize = mem::size_of::<THREADENTRY32>() as u32;
        let mut ids = Vec::new();
        let mut more = Thread32First(snapshot.0, &mut entry) != 0;
        while more {
            if entry.th32OwnerProcessID == pid {
                ids.push(entry.th32ThreadID);
            }
            more = Thread32Next(snapshot.0, &mut entry) != 0;
        }
        Ok(ids)
    }
}

/// Suspends (or resumes) every thread of `pid`.
fn suspend_threads(pid: u32, suspend: bool) -> Result<(), ActionError> {
    // fails with NotFound / PermissionDenied before any thread is touched
    OwnedHandle::process(pid, PROCESS_SUSPEND_RESUME)?;

    let ids = thread_ids(pid)?;
    if ids.is_empty() {
        return Err(ActionError::ProcessNotFound(pid));
    }
    for tid in ids {
        // SAFETY: the thread handle is checked for null and closed by `OwnedHandle`.
        unsafe {
            let handle = OpenThread(THREAD_SUSPEND_RESUME, 0, tid);
            if handle.is_null() {
                // the thread exited since the snapshot
                if GetLastError() == ERROR_INVALID_PARAMETER {
                    debug!("thread {tid} of {pid} is gone");
                    continue;
                }
                return Err(last_error(pid));
            }
            let thread = OwnedHandle(handle);
            let previous = if suspend {
                SuspendThread(thread.0)
            } else {
                ResumeThread(thread.0)
            };
            if previous == u32::MAX {
                return Err(last_error(pid));
            }
        }
    }
    Ok(())
}

impl ProcessController for WindowsController {
    fn send_signal(&mut self, pid: u32, signal: Signal) -> Result<(), ActionError> {
        match signal {
            Signal::Term | Signal::Kill => {
                let process = OwnedHandle::process(pid, PROCESS_TERMINATE)?;
                // SAFETY: `process` holds PROCESS_TERMINATE access.
                if unsafe { TerminateProcess(process.0, TERMINATED_EXIT_CODE) } == 0 {
                    return Err(last_error(pid));
                }
                Ok(())
            }
            Signal::Stop => suspend_threads(pid, true),
            Signal::Cont => suspend_threads(pid, false),
        }
    }

    fn set_priority(&mut self, pid: u32, value: PriorityValue) -> Result<(), ActionError> {
        let PriorityValue::Class(class) = value else {
            return Err(ActionError::other("niceness is not supported on this platform"));
        };
        let process = OwnedHandle::process(pid, PROCESS_SET_INFORMATION)?;
        // SAFETY: `process` holds PROCESS_SET_INFORMATION access.
        if unsafe { SetPriorityClass(process.0, class) } == 0 {
            return Err(last_error(pid));
        }
        Ok(())
    }

    fn has_exited(&mut self, pid: u32) -> bool {
        match OwnedHandle::process(pid, PROCESS_SYNCHRONIZE) {
            // SAFETY: `process` holds SYNCHRONIZE access; a zero timeout never blocks.
            Ok(process) => unsafe { WaitForSingleObject(process.0, 0) == WAIT_OBJECT_0 },
            Err(ActionError::ProcessNotFound(_)) => true,
            Err(e) => {
                debug!("cannot wait on {pid}: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Child, Command};

    fn spawn_ping() -> Child {
        Command::new("ping")
            .args(["-n", "30", "127.0.0.1"])
            .stdout(std::process::Stdio::null())
            .spawn()
            .unwrap()
    }

    #[test]
    fn win32_errors_map_to_action_errors() {
        assert_eq!(
            error_from_code(ERROR_ACCESS_DENIED, 4),
            ActionError::PermissionDenied(4)
        );
        assert_eq!(
            error_from_code(ERROR_INVALID_PARAMETER, 4),
            ActionError::ProcessNotFound(4)
        );
        assert_eq!(
            error_from_code(6, 4),
            ActionError::Other("win32 error 6".into())
        );
    }

    #[test]
    fn every_signal_is_supported() {
        let mut child = spawn_ping();
        let pid = child.id();
        let mut controller = WindowsController::new();

        assert!(!thread_ids(pid).unwrap().is_empty());
        assert_eq!(controller.send_signal(pid, Signal::Stop), Ok(()));
        assert_eq!(controller.send_signal(pid, Signal::Cont), Ok(()));
        assert!(!controller.has_exited(pid));

        assert_eq!(controller.send_signal(pid, Signal::Term), Ok(()));
        let _ = child.wait();
        assert!(controller.has_exited(pid));
    }

    #[test]
    fn missing_pid_is_not_found() {
        let mut controller = WindowsController::new();
        // pids are multiples of 4; this one is never handed out
        let pid = 0xFFFF_FFFD;
        assert_eq!(
            controller.send_signal(pid, Signal::Kill),
            Err(ActionError::ProcessNotFound(pid))
        );
        assert_eq!(
            controller.send_signal(pid, Signal::Stop),
            Err(ActionError::ProcessNotFound(pid))
        );
        assert!(controller.has_exited(pid));
    }
}

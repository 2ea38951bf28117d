use crate::error::ProviderError;
use crate::metrics::process::ServiceRow;

/// Parses `systemctl list-units --plain --no-legend` output.
///
/// Columns: UNIT LOAD ACTIVE SUB DESCRIPTION. The description may contain
/// spaces, everything after SUB belongs to it.
pub fn parse_systemctl_units(output: &str) -> Vec<ServiceRow> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let _load = fields.next()?;
            let _active = fields.next()?;
            let sub = fields.next()?;
            let description = fields.collect::<Vec<_>>().join(" ");
            Some(ServiceRow {
                name: name.to_string(),
                display_name: description,
                status: sub.to_string(),
                pid: None,
            })
        })
        .collect()
}

/// Lowercase label for a `SERVICE_STATUS_PROCESS::dwCurrentState` value.
pub fn windows_service_state(state: u32) -> &'static str {
    match state {
        1 => "stopped",
        2 => "start_pending",
        3 => "stop_pending",
        4 => "running",
        5 => "continue_pending",
        6 => "pause_pending",
        7 => "paused",
        _ => "unknown",
    }
}

#[cfg(not(any(target_os = "linux", windows)))]
pub(super) fn list() -> Result<Vec<ServiceRow>, ProviderError> {
    Err(ProviderError::Unsupported("service listing"))
}

#[cfg(windows)]
pub(super) fn list() -> Result<Vec<ServiceRow>, ProviderError> {
    scm::services()
}

#[cfg(target_os = "linux")]
pub(super) fn list() -> Result<Vec<ServiceRow>, ProviderError> {
    use log::debug;
    use std::process::Command;

    let output = Command::new("systemctl")
        .args([
            "list-units",
            "--type=service",
            "--all",
            "--plain",
            "--no-legend",
            "--no-pager",
        ])
        .output();
    match output {
        Ok(output) if output.status.success() => {
            Ok(parse_systemctl_units(&String::from_utf8_lossy(&output.stdout)))
        }
        Ok(output) => {
            debug!("systemctl exited with {}", output.status);
            Err(ProviderError::Unsupported("service listing"))
        }
        Err(e) => {
            debug!("systemctl not runnable: {e}");
            Err(ProviderError::Unsupported("service listing"))
        }
    }
}

/// Win32 services through the service control manager.
#[cfg(windows)]
mod scm {
    use super::windows_service_state;
    use crate::error::ProviderError;
    use crate::metrics::process::ServiceRow;
    use std::{io, ptr, slice};
    use windows_sys::Win32::Foundation::{GetLastError, ERROR_MORE_DATA};
    use windows_sys::Win32::System::Services::{
        CloseServiceHandle, EnumServicesStatusExW, OpenSCManagerW, ENUM_SERVICE_STATUS_PROCESSW,
        SC_ENUM_PROCESS_INFO, SC_HANDLE, SC_MANAGER_ENUMERATE_SERVICE, SERVICE_STATE_ALL,
        SERVICE_WIN32,
    };

    /// Initial enumeration buffer; grown to what the SCM asks for.
    const BUFFER_BYTES: usize = 64 * 1024;

    struct Manager(SC_HANDLE);

    impl Drop for Manager {
        fn drop(&mut self) {
            // SAFETY: the handle came from OpenSCManagerW and is closed once.
            unsafe {
                CloseServiceHandle(self.0);
            }
        }
    }

    /// UTF-16 C string to `String`; null gives "".
    ///
    /// # Safety
    /// `ptr` is null or points to a NUL-terminated UTF-16 string.
    unsafe fn wide(ptr: *const u16) -> String {
        if ptr.is_null() {
            return String::new();
        }
        let mut len = 0;
        while *ptr.add(len) != 0 {
            len += 1;
        }
        String::from_utf16_lossy(slice::from_raw_parts(ptr, len))
    }

    pub(super) fn services() -> Result<Vec<ServiceRow>, ProviderError> {
        // SAFETY: the manager handle is checked and closed by `Manager`. The
        // buffer is u64-backed so the returned structs are aligned, and only
        // the `returned` entries the SCM filled in are read; their string
        // pointers point into the same buffer.
        unsafe {
            let handle = OpenSCManagerW(ptr::null(), ptr::null(), SC_MANAGER_ENUMERATE_SERVICE);
            if handle.is_null() {
                return Err(ProviderError::Io(io::Error::last_os_error()));
            }
            let manager = Manager(handle);

            let mut buffer = vec![0u64; BUFFER_BYTES / 8];
            let mut resume = 0u32;
            let mut rows = Vec::new();
            loop {
                let mut needed = 0u32;
                let mut returned = 0u32;
                let ok = EnumServicesStatusExW(
                    manager.0,
                    SC_ENUM_PROCESS_INFO,
                    SERVICE_WIN32,
                    SERVICE_STATE_ALL,
                    buffer.as_mut_ptr().cast(),
                    (buffer.len() * 8) as u32,
                    &mut needed,
                    &mut returned,
                    &mut resume,
                    ptr::null(),
                );
                let more = ok == 0 && GetLastError() == ERROR_MORE_DATA;
                if ok == 0 && !more {
                    return Err(ProviderError::Io(io::Error::last_os_error()));
                }

                let entries = slice::from_raw_parts(
                    buffer.as_ptr().cast::<ENUM_SERVICE_STATUS_PROCESSW>(),
                    returned as usize,
                );
                rows.extend(entries.iter().map(|entry| {
                    let status = &entry.ServiceStatusProcess;
                    ServiceRow {
                        name: wide(entry.lpServiceName),
                        display_name: wide(entry.lpDisplayName),
                        status: windows_service_state(status.dwCurrentState).to_string(),
                        pid: (status.dwProcessId != 0).then_some(status.dwProcessId),
                    }
                }));

                if !more {
                    return Ok(rows);
                }
                let needed = needed as usize / 8 + 1;
                if needed > buffer.len() {
                    buffer.resize(needed, 0);
                }
            }
        }
    }
}

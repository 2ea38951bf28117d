use crate::error::ProviderError;
use crate::metrics::process::UserSessionRow;
use std::ffi::c_char;

#[cfg(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos"))]
pub(super) fn sessions() -> Result<Vec<UserSessionRow>, ProviderError> {
    let mut rows = Vec::new();
    // SAFETY: the utmpx cursor is process-global; only the sampler thread
    // walks it, and every record is copied out before the next call.
    unsafe {
        libc::setutxent();
        loop {
            let entry = libc::getutxent();
            if entry.is_null() {
                break;
            }
            let entry = &*entry;
            if entry.ut_type != libc::USER_PROCESS {
                continue;
            }
            rows.push(UserSessionRow {
                username: c_field(&entry.ut_user),
                terminal: c_field(&entry.ut_line),
                login_time: u64::try_from(entry.ut_tv.tv_sec).unwrap_or(0),
            });
        }
        libc::endutxent();
    }
    Ok(rows)
}

#[cfg(not(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos")))]
pub(super) fn sessions() -> Result<Vec<UserSessionRow>, ProviderError> {
    Err(ProviderError::Unsupported("logged-in user listing"))
}

/// utmpx strings are fixed-size and only NUL-terminated when shorter than the field.
#[cfg_attr(
    not(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos")),
    allow(dead_code)
)]
fn c_field(field: &[c_char]) -> String {
    let bytes: Vec<u8> = field
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

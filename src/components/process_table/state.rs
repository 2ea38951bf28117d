use crate::control::ProcessAction;
use std::io;
use std::path::Path;
use std::process::Command;

/// What the user asked for in the process table this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    Select(u32),
    Apply(ProcessAction, u32),
    OpenLocation(String),
    CopyPid(u32),
}

/// Opens the folder containing `executable` in the platform file manager.
pub fn open_file_location(executable: &str) -> io::Result<()> {
    if executable.is_empty() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "executable path unknown"));
    }
    let folder = Path::new(executable)
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent folder"))?;

    let opener = if cfg!(windows) {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    Command::new(opener).arg(folder).spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_path_is_reported() {
        let err = open_file_location("").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}

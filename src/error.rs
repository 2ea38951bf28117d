use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures of the OS metrics provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("metrics provider unavailable: {0}")]
    Unavailable(String),

    #[error("{0} not available on this platform")]
    Unsupported(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of a process control action other than success.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("process {0} does not exist")]
    ProcessNotFound(u32),

    #[error("permission denied for process {0}")]
    PermissionDenied(u32),

    #[error("process {pid} did not exit within {waited:?}")]
    Timeout { pid: u32, waited: Duration },

    #[error("{0}")]
    Other(String),
}

impl ActionError {
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ActionError::Other(msg.into())
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

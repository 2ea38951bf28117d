//! Boundary to the operating system.
//!
//! Everything the monitor displays comes through [`MetricsProvider`]; the
//! production implementation is [`SysinfoProvider`], tests use in-memory
//! fakes.

mod gpu;
mod network;
mod services;
mod system;
mod users;

pub use gpu::{gpu_label, GpuQuery};
pub use network::{format_tcp_state, parse_lsof, parse_netstat_ano};
pub use services::{parse_systemctl_units, windows_service_state};
pub use system::SysinfoProvider;

use crate::error::ProviderError;
use crate::metrics::process::{
    GpuInfo, NetworkConnectionRow, ServiceRow, SystemLoad, SystemSummary, UserSessionRow,
};
use std::collections::HashMap;
use std::path::PathBuf;

/// A process as reported by the OS; `None` marks a field that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProcess {
    pub pid: u32,
    pub name: Option<String>,
    pub user: Option<String>,
    pub cpu_percent: Option<f32>,
    pub memory_percent: Option<f32>,
    pub thread_count: Option<usize>,
    pub start_time: Option<u64>,
    pub status: Option<String>,
    pub io_read_bytes: Option<u64>,
    pub io_write_bytes: Option<u64>,
    pub executable_path: Option<PathBuf>,
    pub command_line: Option<Vec<String>>,
    pub niceness: Option<i32>,
}

/// One entry of a process enumeration.
///
/// There is no per-process error: a field that cannot be read is `None` in
/// [`RawProcess`], so the only way to lose a row is for the process to exit.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessRecord {
    Live(RawProcess),
    /// The process exited while being read
    Vanished(u32),
}

pub trait MetricsProvider: Send {
    fn list_processes(&mut self) -> Result<Vec<ProcessRecord>, ProviderError>;

    fn list_network_connections(&mut self) -> Result<Vec<NetworkConnectionRow>, ProviderError>;

    fn list_logged_in_users(&mut self) -> Result<Vec<UserSessionRow>, ProviderError>;

    /// `Err(ProviderError::Unsupported)` when there is no service manager.
    fn list_services(&mut self) -> Result<Vec<ServiceRow>, ProviderError>;

    fn system_summary(&mut self) -> Result<SystemSummary, ProviderError>;

    fn system_load(&mut self) -> SystemLoad;

    /// `None` when GPU querying is not available at all.
    fn list_gpus(&mut self) -> Option<Vec<GpuInfo>> {
        None
    }

    /// GPU load per pid; empty when unknown.
    fn gpu_process_loads(&mut self) -> HashMap<u32, f32> {
        HashMap::new()
    }

    fn process_open_files(&mut self, _pid: u32) -> Option<usize> {
        None
    }
}

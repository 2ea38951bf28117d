mod chart;
mod circular_buffer;
mod history;
mod sampler;

pub use chart::*;
pub use circular_buffer::CircularBuffer;
pub use history::*;
pub use sampler::*;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// One process as shown in the process table for one tick.
///
/// Fields the provider could not read hold their defaults (`""` / `0`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshotRow {
    pub pid: u32,
    pub name: String,
    pub user: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub thread_count: usize,
    /// Seconds since the unix epoch, `0` when unknown.
    pub start_time: u64,
    pub status: String,
    pub io_read_bytes: u64,
    pub io_write_bytes: u64,
    pub gpu_percent: f32,
    pub executable_path: String,
    pub command_line: String,
    pub niceness: i32,
}

impl ProcessSnapshotRow {
    pub fn start_time_label(&self) -> String {
        format_timestamp(self.start_time)
    }

    /// Whether `query` (already lowercased and trimmed) matches this row.
    pub fn matches(&self, query: &str) -> bool {
        query.is_empty()
            || self.name.to_lowercase().contains(query)
            || self.pid.to_string().contains(query)
            || self.user.to_lowercase().contains(query)
            || self.command_line.to_lowercase().contains(query)
    }
}

/// Process identity that survives PID reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessIdentity {
    pub pid: u32,
    pub start_time: u64,
}

impl From<&ProcessSnapshotRow> for ProcessIdentity {
    fn from(row: &ProcessSnapshotRow) -> Self {
        Self {
            pid: row.pid,
            start_time: row.start_time,
        }
    }
}

/// Selected process with the extra fields of the detail pane.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessDetails {
    pub row: ProcessSnapshotRow,
    pub open_files: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("TCP"),
            Protocol::Udp => f.write_str("UDP"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConnectionRow {
    pub protocol: Protocol,
    pub local_address: String,
    pub remote_address: String,
    pub status: String,
    pub pid: Option<u32>,
    pub process_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRow {
    pub name: String,
    pub display_name: String,
    pub status: String,
    pub pid: Option<u32>,
}

impl ServiceRow {
    pub const UNAVAILABLE: &'static str = "Services listing not available on this platform";

    /// Row substituted when the platform has no supported service manager.
    pub fn placeholder() -> Self {
        Self {
            name: Self::UNAVAILABLE.to_string(),
            display_name: String::new(),
            status: String::new(),
            pid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSessionRow {
    pub username: String,
    pub terminal: String,
    /// Seconds since the unix epoch.
    pub login_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemSummary {
    pub platform: String,
    pub cpu_count_logical: usize,
    pub cpu_count_physical: Option<usize>,
    pub memory_total: u64,
    pub memory_percent_used: f32,
    pub disk_total: u64,
    pub disk_percent_used: f32,
    pub boot_time: u64,
}

/// Global utilisation used by the fast chart tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemLoad {
    pub cpu_percent: f32,
    pub memory_percent: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpuInfo {
    pub id: u32,
    pub name: String,
    pub load_percent: f32,
    pub memory_used_mb: f32,
    pub memory_total_mb: f32,
}

pub fn format_timestamp(secs: u64) -> String {
    if secs == 0 {
        return String::new();
    }
    i64::try_from(secs)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|dt: DateTime<Local>| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Short wall-clock label used on chart axes and in the history table.
pub fn clock_label(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

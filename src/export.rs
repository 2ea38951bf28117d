//! CSV snapshots of the process and service tables.

use crate::error::ExportError;
use crate::metrics::process::{ProcessSnapshotRow, ServiceRow};
use chrono::{DateTime, Local};
use humansize::{format_size, DECIMAL};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROCESS_HEADERS: [&str; 14] = [
    "PID",
    "Name",
    "User",
    "CPU%",
    "Memory%",
    "Threads",
    "Start",
    "Status",
    "Disk Read",
    "Disk Write",
    "GPU%",
    "Path",
    "Cmdline",
    "Nice",
];

pub const SERVICE_HEADERS: [&str; 4] = ["Name", "Display Name", "Status", "PID"];

pub fn export_processes(dir: &Path, rows: &[ProcessSnapshotRow]) -> Result<PathBuf, ExportError> {
    export_processes_at(dir, rows, Local::now())
}

pub fn export_processes_at(
    dir: &Path,
    rows: &[ProcessSnapshotRow],
    at: DateTime<Local>,
) -> Result<PathBuf, ExportError> {
    let path = export_path(dir, "processes", at)?;
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(PROCESS_HEADERS)?;
    for row in rows {
        writer.write_record([
            row.pid.to_string(),
            row.name.clone(),
            row.user.clone(),
            format!("{:.1}", row.cpu_percent),
            format!("{:.1}", row.memory_percent),
            row.thread_count.to_string(),
            row.start_time_label(),
            row.status.clone(),
            format_size(row.io_read_bytes, DECIMAL),
            format_size(row.io_write_bytes, DECIMAL),
            format!("{:.1}", row.gpu_percent),
            row.executable_path.clone(),
            row.command_line.clone(),
            row.niceness.to_string(),
        ])?;
    }
    writer.flush()?;
    info!("exported {} processes to {}", rows.len(), path.display());
    Ok(path)
}

pub fn export_services(dir: &Path, rows: &[ServiceRow]) -> Result<PathBuf, ExportError> {
    export_services_at(dir, rows, Local::now())
}

pub fn export_services_at(
    dir: &Path,
    rows: &[ServiceRow],
    at: DateTime<Local>,
) -> Result<PathBuf, ExportError> {
    let path = export_path(dir, "services", at)?;
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(SERVICE_HEADERS)?;
    for row in rows {
        let pid = row.pid.map(|pid| pid.to_string()).unwrap_or_default();
        writer.write_record([
            row.name.as_str(),
            row.display_name.as_str(),
            row.status.as_str(),
            pid.as_str(),
        ])?;
    }
    writer.flush()?;
    info!("exported {} services to {}", rows.len(), path.display());
    Ok(path)
}

fn export_path(dir: &Path, prefix: &str, at: DateTime<Local>) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    Ok(dir.join(format!("{prefix}_{}.csv", at.format("%Y%m%d_%H%M%S"))))
}

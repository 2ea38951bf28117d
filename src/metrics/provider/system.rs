use super::{network, services, users, GpuQuery, MetricsProvider, ProcessRecord, RawProcess};
use crate::error::ProviderError;
use crate::metrics::process::{
    GpuInfo, NetworkConnectionRow, ServiceRow, SystemLoad, SystemSummary, UserSessionRow,
};
use log::debug;
use std::collections::HashMap;
use std::path::Path;
use sysinfo::{
    Disks, Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, Users,
};

#[cfg(windows)]
const ROOT_MOUNT: &str = "C:\\";
#[cfg(not(windows))]
const ROOT_MOUNT: &str = "/";

/// [`MetricsProvider`] backed by `sysinfo`, with procfs/utmpx/systemctl
/// helpers for what sysinfo does not cover.
pub struct SysinfoProvider {
    /// Process table; per-process CPU is measured between its refreshes
    system: System,
    /// Global CPU/memory for the chart tick. Refreshing CPU times on
    /// `system` would shorten the window the next process refresh measures.
    load: System,
    users: Users,
    gpu: GpuQuery,
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        system.refresh_memory();
        let mut load = System::new();
        load.refresh_cpu_all();
        load.refresh_memory();
        Self {
            system,
            load,
            users: Users::new_with_refreshed_list(),
            gpu: GpuQuery::new(),
        }
    }

    /// Reloads the user table when a process belongs to an unknown uid.
    fn refresh_users_if_stale(&mut self) {
        let users = &self.users;
        let stale = self
            .system
            .processes()
            .values()
            .filter_map(Process::user_id)
            .any(|uid| users.get_user_by_id(uid).is_none());
        if stale {
            debug!("reloading user table");
            self.users = Users::new_with_refreshed_list();
        }
    }

    fn read_process(&self, process: &Process, total_memory: u64) -> ProcessRecord {
        let pid = process.pid().as_u32();
        if matches!(process.status(), ProcessStatus::Dead) {
            return ProcessRecord::Vanished(pid);
        }
        let Some(extra) = proc_extra(pid) else {
            return ProcessRecord::Vanished(pid);
        };

        let memory_percent = (total_memory > 0)
            .then(|| process.memory() as f32 / total_memory as f32 * 100.0);
        let disk = process.disk_usage();
        let start_time = process.start_time();

        ProcessRecord::Live(RawProcess {
            pid,
            name: Some(process.name().to_string_lossy().into_owned()),
            user: process
                .user_id()
                .and_then(|uid| self.users.get_user_by_id(uid))
                .map(|user| user.name().to_string()),
            cpu_percent: Some(process.cpu_usage()),
            memory_percent,
            thread_count: extra
                .thread_count
                .or_else(|| process.tasks().map(|tasks| tasks.len().max(1))),
            start_time: (start_time > 0).then_some(start_time),
            status: Some(process.status().to_string().to_lowercase()),
            io_read_bytes: Some(disk.total_read_bytes),
            io_write_bytes: Some(disk.total_written_bytes),
            executable_path: process.exe().map(Path::to_path_buf),
            command_line: Some(
                process
                    .cmd()
                    .iter()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect(),
            ),
            niceness: extra.niceness,
        })
    }
}

/// Fields sysinfo does not expose.
#[derive(Default)]
struct ProcExtra {
    thread_count: Option<usize>,
    niceness: Option<i32>,
}

/// `None` once the process is gone.
#[cfg(target_os = "linux")]
fn proc_extra(pid: u32) -> Option<ProcExtra> {
    use procfs::ProcError;

    let stat = i32::try_from(pid)
        .map_err(|_| ProcError::NotFound(None))
        .and_then(procfs::process::Process::new)
        .and_then(|p| p.stat());
    match stat {
        Ok(stat) => Some(ProcExtra {
            thread_count: usize::try_from(stat.num_threads).ok(),
            niceness: i32::try_from(stat.nice).ok(),
        }),
        Err(ProcError::NotFound(_)) => None,
        Err(e) => {
            debug!("no /proc stat for {pid}: {e}");
            Some(ProcExtra::default())
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn proc_extra(_pid: u32) -> Option<ProcExtra> {
    Some(ProcExtra::default())
}

impl MetricsProvider for SysinfoProvider {
    fn list_processes(&mut self) -> Result<Vec<ProcessRecord>, ProviderError> {
        self.system.refresh_memory();
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );
        self.refresh_users_if_stale();

        let total_memory = self.system.total_memory();
        let mut processes: Vec<_> = self
            .system
            .processes()
            .values()
            .filter(|p| p.thread_kind().is_none())
            .collect();
        if processes.is_empty() {
            return Err(ProviderError::Unavailable(
                "no processes visible".to_string(),
            ));
        }
        // pid order gives a deterministic enumeration order for tie-breaks
        processes.sort_by_key(|p| p.pid());

        Ok(processes
            .into_iter()
            .map(|p| self.read_process(p, total_memory))
            .collect())
    }

    fn list_network_connections(&mut self) -> Result<Vec<NetworkConnectionRow>, ProviderError> {
        let mut rows = network::connections()?;
        for row in rows.iter_mut().filter(|row| row.process_name.is_none()) {
            row.process_name = row
                .pid
                .and_then(|pid| self.system.process(Pid::from_u32(pid)))
                .map(|p| p.name().to_string_lossy().into_owned());
        }
        Ok(rows)
    }

    fn list_logged_in_users(&mut self) -> Result<Vec<UserSessionRow>, ProviderError> {
        users::sessions()
    }

    fn list_services(&mut self) -> Result<Vec<ServiceRow>, ProviderError> {
        services::list()
    }

    fn system_summary(&mut self) -> Result<SystemSummary, ProviderError> {
        self.system.refresh_memory();
        if self.system.cpus().is_empty() {
            self.system.refresh_cpu_all();
        }

        let memory_total = self.system.total_memory();
        let disks = Disks::new_with_refreshed_list();
        let root = Path::new(ROOT_MOUNT);
        let (disk_total, disk_available) = match disks.list().iter().find(|d| d.mount_point() == root) {
            Some(disk) => (disk.total_space(), disk.available_space()),
            None => disks.list().iter().fold((0, 0), |(total, avail), d| {
                (total + d.total_space(), avail + d.available_space())
            }),
        };

        Ok(SystemSummary {
            platform: platform_string(),
            cpu_count_logical: self.system.cpus().len(),
            cpu_count_physical: self.system.physical_core_count(),
            memory_total,
            memory_percent_used: percent(self.system.used_memory(), memory_total),
            disk_total,
            disk_percent_used: percent(disk_total.saturating_sub(disk_available), disk_total),
            boot_time: System::boot_time(),
        })
    }

    fn system_load(&mut self) -> SystemLoad {
        self.load.refresh_cpu_usage();
        self.load.refresh_memory();
        SystemLoad {
            cpu_percent: self.load.global_cpu_usage(),
            memory_percent: percent(self.load.used_memory(), self.load.total_memory()),
        }
    }

    fn list_gpus(&mut self) -> Option<Vec<GpuInfo>> {
        self.gpu.list_gpus()
    }

    fn gpu_process_loads(&mut self) -> HashMap<u32, f32> {
        self.gpu.process_loads()
    }

    fn process_open_files(&mut self, pid: u32) -> Option<usize> {
        open_files(pid)
    }
}

fn percent(part: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 100.0) as f32
}

fn platform_string() -> String {
    let os = System::long_os_version().unwrap_or_else(|| "unknown OS".to_string());
    match System::kernel_version() {
        Some(kernel) => format!("{os} (kernel {kernel})"),
        None => os,
    }
}

#[cfg(target_os = "linux")]
fn open_files(pid: u32) -> Option<usize> {
    let pid = i32::try_from(pid).ok()?;
    procfs::process::Process::new(pid)
        .and_then(|p| p.fd_count())
        .ok()
}

#[cfg(not(target_os = "linux"))]
fn open_files(_pid: u32) -> Option<usize> {
    None
}

use super::ProcessSnapshotRow;
use crate::metrics::provider::{MetricsProvider, ProcessRecord, RawProcess};
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Result of one sampling pass.
#[derive(Debug, Clone, Default)]
pub struct Sample {
    /// Every live process in provider enumeration order
    pub snapshot: Vec<ProcessSnapshotRow>,
    /// `snapshot` filtered and sorted by CPU, descending
    pub rows: Vec<ProcessSnapshotRow>,
    /// The previously selected pid, if it is still among `rows`
    pub restored_selection: Option<u32>,
}

/// Pulls process snapshots from a provider and shapes them into table rows
pub struct Sampler<P> {
    provider: P,
    last_update: Option<Instant>,
    update_interval: Duration,
}

impl<P: MetricsProvider> Sampler<P> {
    pub fn new(provider: P, update_interval: Duration) -> Self {
        Self {
            provider,
            last_update: None,
            update_interval,
        }
    }

    pub fn set_update_interval(&mut self, interval: Duration) {
        self.update_interval = interval;
    }

    pub fn should_update(&self) -> bool {
        self.last_update
            .map_or(true, |at| at.elapsed() >= self.update_interval)
    }

    /// Zero when a sample is already due.
    pub fn time_until_update(&self) -> Duration {
        self.last_update.map_or(Duration::ZERO, |at| {
            self.update_interval.saturating_sub(at.elapsed())
        })
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Full process snapshot in enumeration order.
    ///
    /// A failing provider yields an empty snapshot. Vanished processes are
    /// dropped and unreadable fields fall back to their defaults.
    pub fn snapshot(&mut self) -> Vec<ProcessSnapshotRow> {
        self.last_update = Some(Instant::now());

        let records = match self.provider.list_processes() {
            Ok(records) => records,
            Err(e) => {
                warn!("process enumeration failed: {e}");
                return Vec::new();
            }
        };
        let gpu_loads = self.provider.gpu_process_loads();

        let rows: Vec<_> = records
            .into_iter()
            .filter_map(|record| match record {
                ProcessRecord::Live(raw) => Some(normalize(raw, &gpu_loads)),
                ProcessRecord::Vanished(pid) => {
                    debug!("dropping vanished process {pid}");
                    None
                }
            })
            .collect();
        debug!("sampled {} processes", rows.len());
        rows
    }

    pub fn sample(&mut self, filter_text: &str, previous_selected: Option<u32>) -> Sample {
        let snapshot = self.snapshot();
        let rows = filter_and_sort(&snapshot, filter_text);
        let restored_selection = restore_selection(&rows, previous_selected);
        Sample {
            snapshot,
            rows,
            restored_selection,
        }
    }
}

fn finite_or_zero(value: Option<f32>) -> f32 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn normalize(raw: RawProcess, gpu_loads: &HashMap<u32, f32>) -> ProcessSnapshotRow {
    ProcessSnapshotRow {
        pid: raw.pid,
        name: raw.name.unwrap_or_default(),
        user: raw.user.unwrap_or_default(),
        cpu_percent: finite_or_zero(raw.cpu_percent),
        memory_percent: finite_or_zero(raw.memory_percent),
        thread_count: raw.thread_count.unwrap_or(0),
        start_time: raw.start_time.unwrap_or(0),
        status: raw.status.unwrap_or_default(),
        io_read_bytes: raw.io_read_bytes.unwrap_or(0),
        io_write_bytes: raw.io_write_bytes.unwrap_or(0),
        gpu_percent: finite_or_zero(gpu_loads.get(&raw.pid).copied()),
        executable_path: raw
            .executable_path
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default(),
        command_line: raw.command_line.map(|c| c.join(" ")).unwrap_or_default(),
        niceness: raw.niceness.unwrap_or(0),
    }
}

fn by_cpu_desc(a: &ProcessSnapshotRow, b: &ProcessSnapshotRow) -> Ordering {
    b.cpu_percent
        .partial_cmp(&a.cpu_percent)
        .unwrap_or(Ordering::Equal)
}

/// Rows matching `filter_text`, stably sorted by CPU descending.
pub fn filter_and_sort(snapshot: &[ProcessSnapshotRow], filter_text: &str) -> Vec<ProcessSnapshotRow> {
    let query = filter_text.trim().to_lowercase();
    let mut rows: Vec<_> = snapshot
        .iter()
        .filter(|row| row.matches(&query))
        .cloned()
        .collect();
    // `sort_by` is stable: equal CPU keeps enumeration order
    rows.sort_by(by_cpu_desc);
    rows
}

pub fn top_by_cpu(snapshot: &[ProcessSnapshotRow], k: usize) -> Vec<&ProcessSnapshotRow> {
    let mut rows: Vec<_> = snapshot.iter().collect();
    rows.sort_by(|a, b| by_cpu_desc(a, b));
    rows.truncate(k);
    rows
}

pub fn restore_selection(rows: &[ProcessSnapshotRow], previous: Option<u32>) -> Option<u32> {
    previous.filter(|pid| rows.iter().any(|row| row.pid == *pid))
}

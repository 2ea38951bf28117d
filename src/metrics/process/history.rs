use super::{top_by_cpu, CircularBuffer, ProcessSnapshotRow};
use chrono::{DateTime, Local};

pub const HISTORY_TOP_K: usize = 5;
pub const HISTORY_CAPACITY: usize = 500;

/// One top-CPU process captured on one tick
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Local>,
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub gpu_percent: f32,
}

/// Rolling log of the heaviest processes per tick
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    /// Oldest entries are overwritten once `capacity` is reached
    entries: CircularBuffer<HistoryEntry>,
    /// Rows captured per tick
    top_k: usize,
}

impl Default for HistoryRecorder {
    fn default() -> Self {
        Self::new(HISTORY_TOP_K, HISTORY_CAPACITY)
    }
}

impl HistoryRecorder {
    pub fn new(top_k: usize, capacity: usize) -> Self {
        Self {
            entries: CircularBuffer::new(capacity),
            top_k,
        }
    }

    /// Appends the top `top_k` rows of `snapshot` by CPU, stamped now.
    pub fn record_tick(&mut self, snapshot: &[ProcessSnapshotRow]) {
        self.record_tick_at(snapshot, Local::now());
    }

    pub fn record_tick_at(&mut self, snapshot: &[ProcessSnapshotRow], at: DateTime<Local>) {
        for row in top_by_cpu(snapshot, self.top_k) {
            self.entries.push(HistoryEntry {
                timestamp: at,
                pid: row.pid,
                name: row.name.clone(),
                cpu_percent: row.cpu_percent,
                memory_percent: row.memory_percent,
                gpu_percent: row.gpu_percent,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.as_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pid: u32, cpu: f32) -> ProcessSnapshotRow {
        ProcessSnapshotRow {
            pid,
            name: format!("proc{pid}"),
            cpu_percent: cpu,
            ..Default::default()
        }
    }

    #[test]
    fn records_top_five_in_cpu_order() {
        let snapshot: Vec<_> = (1..=8).map(|pid| row(pid, pid as f32)).collect();
        let mut history = HistoryRecorder::default();
        history.record_tick(&snapshot);

        let pids: Vec<_> = history.entries().iter().map(|e| e.pid).collect();
        assert_eq!(pids, vec![8, 7, 6, 5, 4]);
    }

    #[test]
    fn short_snapshot_records_everything() {
        let mut history = HistoryRecorder::default();
        history.record_tick(&[row(1, 0.0), row(2, 3.0)]);
        assert_eq!(history.len(), 2);
    }
}

#![allow(dead_code)]

use procwatch::control::{PriorityValue, ProcessController, Signal};
use procwatch::error::{ActionError, ProviderError};
use procwatch::metrics::process::{
    NetworkConnectionRow, ProcessSnapshotRow, ServiceRow, SystemLoad, SystemSummary,
    UserSessionRow,
};
use procwatch::metrics::provider::{MetricsProvider, ProcessRecord, RawProcess};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub fn raw(pid: u32, name: &str, cpu: f32) -> RawProcess {
    RawProcess {
        pid,
        name: Some(name.to_string()),
        user: Some("tester".to_string()),
        cpu_percent: Some(cpu),
        memory_percent: Some(1.0),
        start_time: Some(1_700_000_000 + pid as u64),
        ..Default::default()
    }
}

pub fn row(pid: u32, name: &str, cpu: f32) -> ProcessSnapshotRow {
    ProcessSnapshotRow {
        pid,
        name: name.to_string(),
        cpu_percent: cpu,
        ..Default::default()
    }
}

/// Process table the test can rewrite between ticks.
#[derive(Clone, Default)]
pub struct ProcessTable(Arc<Mutex<Vec<RawProcess>>>);

impl ProcessTable {
    pub fn set(&self, processes: Vec<RawProcess>) {
        *self.0.lock().unwrap() = processes;
    }

    pub fn get(&self) -> Vec<RawProcess> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeProvider {
    pub table: ProcessTable,
    pub vanished: Vec<u32>,
    pub unavailable: bool,
    pub services: Option<Vec<ServiceRow>>,
    pub load: SystemLoad,
}

impl FakeProvider {
    pub fn with(processes: Vec<RawProcess>) -> Self {
        let provider = Self::default();
        provider.table.set(processes);
        provider
    }
}

impl MetricsProvider for FakeProvider {
    fn list_processes(&mut self) -> Result<Vec<ProcessRecord>, ProviderError> {
        if self.unavailable {
            return Err(ProviderError::Unavailable("fake outage".into()));
        }
        let mut records: Vec<ProcessRecord> = self
            .table
            .get()
            .into_iter()
            .map(ProcessRecord::Live)
            .collect();
        records.extend(self.vanished.iter().copied().map(ProcessRecord::Vanished));
        Ok(records)
    }

    fn list_network_connections(&mut self) -> Result<Vec<NetworkConnectionRow>, ProviderError> {
        Err(ProviderError::Unsupported("network connections"))
    }

    fn list_logged_in_users(&mut self) -> Result<Vec<UserSessionRow>, ProviderError> {
        Ok(vec![UserSessionRow {
            username: "tester".into(),
            terminal: "pts/0".into(),
            login_time: 1_700_000_000,
        }])
    }

    fn list_services(&mut self) -> Result<Vec<ServiceRow>, ProviderError> {
        self.services
            .clone()
            .ok_or(ProviderError::Unsupported("service listing"))
    }

    fn system_summary(&mut self) -> Result<SystemSummary, ProviderError> {
        Ok(SystemSummary {
            platform: "FakeOS 1.0".into(),
            cpu_count_logical: 8,
            cpu_count_physical: Some(4),
            ..Default::default()
        })
    }

    fn system_load(&mut self) -> SystemLoad {
        self.load
    }
}

/// Records every call; processes in `alive` exit only when `exits_on_signal`.
#[derive(Clone, Default)]
pub struct FakeController {
    pub alive: Arc<Mutex<HashSet<u32>>>,
    pub exits_on_signal: bool,
    pub signals: Arc<Mutex<Vec<(u32, Signal)>>>,
    pub priorities: Arc<Mutex<Vec<(u32, PriorityValue)>>>,
}

impl FakeController {
    pub fn with_alive(pids: &[u32], exits_on_signal: bool) -> Self {
        Self {
            alive: Arc::new(Mutex::new(pids.iter().copied().collect())),
            exits_on_signal,
            ..Default::default()
        }
    }
}

impl ProcessController for FakeController {
    fn send_signal(&mut self, pid: u32, signal: Signal) -> Result<(), ActionError> {
        let mut alive = self.alive.lock().unwrap();
        if !alive.contains(&pid) {
            return Err(ActionError::ProcessNotFound(pid));
        }
        self.signals.lock().unwrap().push((pid, signal));
        if self.exits_on_signal && matches!(signal, Signal::Term | Signal::Kill) {
            alive.remove(&pid);
        }
        Ok(())
    }

    fn set_priority(&mut self, pid: u32, value: PriorityValue) -> Result<(), ActionError> {
        if !self.alive.lock().unwrap().contains(&pid) {
            return Err(ActionError::ProcessNotFound(pid));
        }
        self.priorities.lock().unwrap().push((pid, value));
        Ok(())
    }

    fn has_exited(&mut self, pid: u32) -> bool {
        !self.alive.lock().unwrap().contains(&pid)
    }
}

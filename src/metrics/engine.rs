use super::process::{
    clock_label, filter_and_sort, restore_selection, ChartBuffer, ChartSeriesPoint, HistoryEntry,
    HistoryRecorder, ProcessDetails, ProcessIdentity, ProcessSnapshotRow, Sampler,
    PROCESS_CHART_CAPACITY, SYSTEM_CHART_CAPACITY,
};
use super::process::{NetworkConnectionRow, ServiceRow, SystemLoad, SystemSummary, UserSessionRow};
use super::provider::{gpu_label, MetricsProvider};
use crate::control::{outcome_message, ActionExecutor, ProcessAction, ProcessController};
use crate::error::ProviderError;
use chrono::Local;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Everything the UI renders, published as one unit after every tick.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// Filtered rows, CPU descending
    pub rows: Vec<ProcessSnapshotRow>,
    /// Size of the unfiltered snapshot
    pub process_count: usize,
    pub selected: Option<u32>,
    pub details: Option<ProcessDetails>,
    pub history: Vec<HistoryEntry>,
    pub load: SystemLoad,
    /// `[cpu, memory]`
    pub system_chart: [Vec<ChartSeriesPoint>; 2],
    /// `[cpu, memory]` of the selected process
    pub process_chart: [Vec<ChartSeriesPoint>; 2],
    pub network: Vec<NetworkConnectionRow>,
    pub services: Vec<ServiceRow>,
    pub users: Vec<UserSessionRow>,
    pub summary: Option<SystemSummary>,
    pub gpu_label: String,
    pub status: String,
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorCommand {
    SetFilter(String),
    Select(Option<u32>),
    Refresh,
    RefreshNetwork,
    RefreshServices,
    RefreshSystem,
    Apply(ProcessAction, u32),
    SetIntervals { table: Duration, chart: Duration },
    Shutdown,
}

/// Owns all mutable monitor state. Single-threaded; [`super::Monitor`]
/// drives it from a background thread.
pub struct Engine<P, C> {
    sampler: Sampler<P>,
    executor: ActionExecutor<C>,
    history: HistoryRecorder,
    system_chart: ChartBuffer<2>,
    process_chart: ChartBuffer<2>,
    chart_interval: Duration,
    last_chart: Option<Instant>,
    filter: String,
    snapshot: Vec<ProcessSnapshotRow>,
    rows: Vec<ProcessSnapshotRow>,
    selected: Option<ProcessIdentity>,
    details: Option<ProcessDetails>,
    load: SystemLoad,
    network: Vec<NetworkConnectionRow>,
    services: Vec<ServiceRow>,
    users: Vec<UserSessionRow>,
    summary: Option<SystemSummary>,
    gpu_label: String,
    status: String,
}

impl<P: MetricsProvider, C: ProcessController> Engine<P, C> {
    pub fn new(provider: P, controller: C, table_interval: Duration, chart_interval: Duration) -> Self {
        Self::with_executor(provider, ActionExecutor::new(controller), table_interval, chart_interval)
    }

    pub fn with_executor(
        provider: P,
        executor: ActionExecutor<C>,
        table_interval: Duration,
        chart_interval: Duration,
    ) -> Self {
        Self {
            sampler: Sampler::new(provider, table_interval),
            executor,
            history: HistoryRecorder::default(),
            system_chart: ChartBuffer::new(SYSTEM_CHART_CAPACITY),
            process_chart: ChartBuffer::new(PROCESS_CHART_CAPACITY),
            chart_interval,
            last_chart: None,
            filter: String::new(),
            snapshot: Vec::new(),
            rows: Vec::new(),
            selected: None,
            details: None,
            load: SystemLoad::default(),
            network: Vec::new(),
            services: Vec::new(),
            users: Vec::new(),
            summary: None,
            gpu_label: gpu_label(None),
            status: String::new(),
        }
    }

    /// Periodic table tick: re-samples, then records history and charts the
    /// selected process.
    pub fn table_tick(&mut self) {
        self.resample();
        self.history.record_tick(&self.snapshot);

        if let Some(values) = self
            .selected_row()
            .map(|row| [row.cpu_percent, row.memory_percent])
        {
            self.process_chart.push(clock_label(Local::now()), values);
        }
    }

    /// Re-samples processes, users and GPU text. History and charts keep
    /// their cadence; only [`Engine::table_tick`] appends to them.
    pub fn resample(&mut self) {
        let previous = self.selected.map(|s| s.pid);
        let sample = self.sampler.sample(&self.filter, previous);
        self.snapshot = sample.snapshot;
        self.rows = sample.rows;
        self.reselect(sample.restored_selection);

        let provider = self.sampler.provider_mut();
        self.users = provider.list_logged_in_users().unwrap_or_else(|e| {
            debug!("user sessions unavailable: {e}");
            Vec::new()
        });
        self.gpu_label = gpu_label(provider.list_gpus().as_deref());
    }

    /// Pushes global CPU/Mem into the system chart.
    pub fn chart_tick(&mut self) {
        self.last_chart = Some(Instant::now());
        self.load = self.sampler.provider_mut().system_load();
        self.system_chart.push(
            clock_label(Local::now()),
            [self.load.cpu_percent, self.load.memory_percent],
        );
    }

    /// Runs whichever ticks are due.
    pub fn run_due_ticks(&mut self) {
        if self.sampler.should_update() {
            self.table_tick();
        }
        if self.chart_due() {
            self.chart_tick();
        }
    }

    /// Time until the next tick is due.
    pub fn next_due(&self) -> Duration {
        let chart = self.last_chart.map_or(Duration::ZERO, |at| {
            self.chart_interval.saturating_sub(at.elapsed())
        });
        chart.min(self.sampler.time_until_update())
    }

    fn chart_due(&self) -> bool {
        self.last_chart
            .map_or(true, |at| at.elapsed() >= self.chart_interval)
    }

    /// Returns `false` once the engine should stop.
    pub fn handle(&mut self, command: MonitorCommand) -> bool {
        debug!("handling {command:?}");
        match command {
            MonitorCommand::SetFilter(filter) => {
                self.filter = filter;
                self.rows = filter_and_sort(&self.snapshot, &self.filter);
                let restored = restore_selection(&self.rows, self.selected.map(|s| s.pid));
                self.reselect(restored);
            }
            MonitorCommand::Select(pid) => {
                let restored = restore_selection(&self.rows, pid);
                self.reselect(restored);
            }
            MonitorCommand::Refresh => self.resample(),
            MonitorCommand::RefreshNetwork => self.refresh_network(),
            MonitorCommand::RefreshServices => self.refresh_services(),
            MonitorCommand::RefreshSystem => self.refresh_system(),
            MonitorCommand::Apply(action, pid) => self.apply(action, pid),
            MonitorCommand::SetIntervals { table, chart } => {
                self.sampler.set_update_interval(table);
                self.chart_interval = chart;
            }
            MonitorCommand::Shutdown => return false,
        }
        true
    }

    /// Applies `action` and re-samples, whatever the outcome.
    pub fn apply(&mut self, action: ProcessAction, pid: u32) {
        let result = self.executor.apply(action, pid);
        match &result {
            Ok(()) => info!("{action} pid {pid} succeeded"),
            Err(e) => warn!("{action} pid {pid} failed: {e}"),
        }
        self.status = outcome_message(action, pid, &result);
        self.resample();
    }

    pub fn refresh_network(&mut self) {
        self.network = match self.sampler.provider_mut().list_network_connections() {
            Ok(rows) => rows,
            Err(e) => {
                warn!("network connections unavailable: {e}");
                Vec::new()
            }
        };
    }

    pub fn refresh_services(&mut self) {
        self.services = match self.sampler.provider_mut().list_services() {
            Ok(rows) => rows,
            Err(ProviderError::Unsupported(_)) => vec![ServiceRow::placeholder()],
            Err(e) => {
                warn!("service listing failed: {e}");
                vec![ServiceRow::placeholder()]
            }
        };
    }

    pub fn refresh_system(&mut self) {
        match self.sampler.provider_mut().system_summary() {
            Ok(summary) => self.summary = Some(summary),
            Err(e) => warn!("system summary unavailable: {e}"),
        }
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            rows: self.rows.clone(),
            process_count: self.snapshot.len(),
            selected: self.selected.map(|s| s.pid),
            details: self.details.clone(),
            history: self.history.entries(),
            load: self.load,
            system_chart: self.system_chart.snapshot(),
            process_chart: self.process_chart.snapshot(),
            network: self.network.clone(),
            services: self.services.clone(),
            users: self.users.clone(),
            summary: self.summary.clone(),
            gpu_label: self.gpu_label.clone(),
            status: self.status.clone(),
            filter: self.filter.clone(),
        }
    }

    fn selected_row(&self) -> Option<&ProcessSnapshotRow> {
        let selected = self.selected?;
        self.rows.iter().find(|row| row.pid == selected.pid)
    }

    /// Moves the selection to `pid` (already known to be among `rows`).
    /// The process chart restarts whenever the selected identity changes.
    fn reselect(&mut self, pid: Option<u32>) {
        let identity = pid
            .and_then(|pid| self.rows.iter().find(|row| row.pid == pid))
            .map(ProcessIdentity::from);
        if identity != self.selected {
            self.process_chart.clear();
        }
        self.selected = identity;
        let row = self.selected_row().cloned();
        self.details = row.map(|row| {
            let open_files = self.sampler.provider_mut().process_open_files(row.pid);
            ProcessDetails { row, open_files }
        });
    }
}

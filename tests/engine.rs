mod common;

use common::{raw, FakeController, FakeProvider};
use procwatch::control::{ActionExecutor, ProcessAction};
use procwatch::metrics::process::{ServiceRow, SystemLoad};
use procwatch::metrics::{Engine, Monitor, MonitorCommand};
use std::thread;
use std::time::{Duration, Instant};

const SLOW: Duration = Duration::from_secs(3600);

fn engine(
    provider: FakeProvider,
    controller: FakeController,
) -> Engine<FakeProvider, FakeController> {
    let executor =
        ActionExecutor::with_timeouts(controller, Duration::from_millis(50), Duration::from_millis(5));
    Engine::with_executor(provider, executor, SLOW, SLOW)
}

#[test]
fn table_tick_publishes_sorted_rows_and_history() {
    let provider = FakeProvider::with(vec![raw(1, "a", 10.0), raw(2, "b", 50.0)]);
    let mut engine = engine(provider, FakeController::default());
    engine.table_tick();

    let dashboard = engine.dashboard();
    let pids: Vec<_> = dashboard.rows.iter().map(|r| r.pid).collect();
    assert_eq!(pids, vec![2, 1]);
    assert_eq!(dashboard.process_count, 2);
    assert_eq!(dashboard.history.len(), 2);
    assert_eq!(dashboard.users.len(), 1);
    assert_eq!(dashboard.gpu_label, "GPU info not available");
}

#[test]
fn filter_applies_without_resampling() {
    let provider = FakeProvider::with(vec![raw(1, "alpha", 10.0), raw(2, "beta", 50.0)]);
    let mut engine = engine(provider, FakeController::default());
    engine.table_tick();
    engine.handle(MonitorCommand::Select(Some(2)));

    engine.handle(MonitorCommand::SetFilter("ALP".into()));
    let dashboard = engine.dashboard();
    assert_eq!(dashboard.rows.len(), 1);
    assert_eq!(dashboard.filter, "ALP");
    // the selection is no longer visible
    assert_eq!(dashboard.selected, None);
    assert_eq!(dashboard.history.len(), 2);
}

#[test]
fn selecting_tracks_the_process_chart() {
    let provider = FakeProvider::with(vec![raw(1, "alpha", 10.0), raw(2, "beta", 50.0)]);
    let table = provider.table.clone();
    let mut engine = engine(provider, FakeController::default());
    engine.table_tick();
    engine.handle(MonitorCommand::Select(Some(1)));
    engine.table_tick();
    engine.table_tick();

    let dashboard = engine.dashboard();
    assert_eq!(dashboard.selected, Some(1));
    assert_eq!(dashboard.process_chart[0].len(), 2);
    assert_eq!(dashboard.details.as_ref().map(|d| d.row.pid), Some(1));

    // pid 1 reused by a new process: the chart restarts
    let mut reused = raw(1, "alpha", 20.0);
    reused.start_time = Some(1_800_000_000);
    table.set(vec![reused, raw(2, "beta", 50.0)]);
    engine.table_tick();
    let dashboard = engine.dashboard();
    assert_eq!(dashboard.selected, Some(1));
    assert_eq!(dashboard.process_chart[0].len(), 1);
    assert_eq!(dashboard.process_chart[0][0].value, 20.0);

    engine.handle(MonitorCommand::Select(Some(2)));
    assert!(engine.dashboard().process_chart[0].is_empty());
}

#[test]
fn apply_reports_and_resamples() {
    let provider = FakeProvider::with(vec![raw(1, "a", 10.0), raw(2, "b", 50.0)]);
    let table = provider.table.clone();
    let controller = FakeController::with_alive(&[1, 2], true);
    let mut engine = engine(provider, controller);
    engine.table_tick();

    table.set(vec![raw(1, "a", 10.0)]);
    engine.handle(MonitorCommand::Apply(ProcessAction::Kill, 2));
    let dashboard = engine.dashboard();
    assert_eq!(dashboard.status, "Process 2 killed.");
    assert_eq!(dashboard.rows.len(), 1);

    engine.handle(MonitorCommand::Apply(ProcessAction::Terminate, 77));
    let dashboard = engine.dashboard();
    assert_eq!(dashboard.status, "Terminate: process 77 does not exist");
    // re-samples after actions are off the history cadence
    assert_eq!(dashboard.history.len(), 2);
}

#[test]
fn refresh_and_actions_keep_history_and_chart_cadence() {
    let provider = FakeProvider::with(vec![raw(1, "a", 10.0), raw(2, "b", 50.0)]);
    let table = provider.table.clone();
    let controller = FakeController::with_alive(&[1], false);
    let mut engine = engine(provider, controller);
    engine.table_tick();
    engine.handle(MonitorCommand::Select(Some(1)));
    engine.table_tick();
    assert_eq!(engine.dashboard().process_chart[0].len(), 1);

    table.set(vec![raw(1, "a", 30.0), raw(2, "b", 50.0)]);
    engine.handle(MonitorCommand::Refresh);
    engine.handle(MonitorCommand::Apply(ProcessAction::Suspend, 1));
    let dashboard = engine.dashboard();
    assert_eq!(dashboard.status, "Process 1 suspended.");
    // rows reflect the new sample
    assert_eq!(dashboard.details.as_ref().map(|d| d.row.cpu_percent), Some(30.0));
    assert_eq!(dashboard.history.len(), 4);
    assert_eq!(dashboard.process_chart[0].len(), 1);

    engine.table_tick();
    let dashboard = engine.dashboard();
    assert_eq!(dashboard.history.len(), 6);
    assert_eq!(dashboard.process_chart[0].len(), 2);
    assert_eq!(dashboard.process_chart[0][1].value, 30.0);
}

#[test]
fn unsupported_services_show_placeholder() {
    let mut engine = engine(FakeProvider::default(), FakeController::default());
    engine.handle(MonitorCommand::RefreshServices);
    assert_eq!(engine.dashboard().services, vec![ServiceRow::placeholder()]);

    let services = vec![ServiceRow {
        name: "cron.service".into(),
        display_name: "cron".into(),
        status: "running".into(),
        pid: None,
    }];
    let provider = FakeProvider {
        services: Some(services.clone()),
        ..Default::default()
    };
    let mut engine = self::engine(provider, FakeController::default());
    engine.handle(MonitorCommand::RefreshServices);
    assert_eq!(engine.dashboard().services, services);
}

#[test]
fn system_tabs_degrade_quietly() {
    let mut engine = engine(FakeProvider::default(), FakeController::default());
    engine.handle(MonitorCommand::RefreshNetwork);
    engine.handle(MonitorCommand::RefreshSystem);
    let dashboard = engine.dashboard();
    assert!(dashboard.network.is_empty());
    assert_eq!(
        dashboard.summary.map(|s| s.cpu_count_logical),
        Some(8)
    );
}

#[test]
fn chart_tick_records_system_load() {
    let provider = FakeProvider {
        load: SystemLoad {
            cpu_percent: 12.5,
            memory_percent: 40.0,
        },
        ..Default::default()
    };
    let mut engine = engine(provider, FakeController::default());
    engine.chart_tick();
    engine.chart_tick();
    let [cpu, mem] = engine.dashboard().system_chart;
    assert_eq!(cpu.len(), 2);
    assert_eq!(cpu[1].value, 12.5);
    assert_eq!(mem[1].value, 40.0);
}

#[test]
fn shutdown_stops_the_engine() {
    let mut engine = engine(FakeProvider::default(), FakeController::default());
    assert!(engine.handle(MonitorCommand::Refresh));
    assert!(!engine.handle(MonitorCommand::Shutdown));
}

#[test]
fn monitor_publishes_from_its_thread() {
    let provider = FakeProvider::with(vec![raw(1, "a", 10.0), raw(2, "b", 50.0)]);
    let monitor = Monitor::spawn_with(
        provider,
        FakeController::default(),
        Duration::from_millis(20),
        Duration::from_millis(10),
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    while monitor.dashboard().rows.len() < 2 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(monitor.dashboard().rows.len(), 2);

    monitor.send(MonitorCommand::SetFilter("b".into()));
    let deadline = Instant::now() + Duration::from_secs(5);
    while monitor.dashboard().filter != "b" && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    let dashboard = monitor.dashboard();
    assert_eq!(dashboard.filter, "b");
    assert_eq!(dashboard.rows.len(), 1);
    assert_eq!(dashboard.services, vec![ServiceRow::placeholder()]);

    drop(monitor);
}

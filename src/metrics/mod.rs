mod engine;
pub mod process;
pub mod provider;

pub use engine::{Dashboard, Engine, MonitorCommand};

use crate::control::{ProcessController, SystemController};
use log::{info, warn};
use provider::{MetricsProvider, SysinfoProvider};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Background sampling thread.
///
/// The thread owns an [`Engine`] and publishes a fresh [`Dashboard`] after
/// every tick or command. The UI reads the latest one with
/// [`Monitor::dashboard`] and talks back through [`Monitor::send`].
pub struct Monitor {
    dashboard: Arc<RwLock<Arc<Dashboard>>>,
    commands: Sender<MonitorCommand>,
    worker: Option<JoinHandle<()>>,
}

impl Monitor {
    pub fn spawn(table_interval: Duration, chart_interval: Duration) -> Self {
        Self::spawn_with(
            SysinfoProvider::new(),
            SystemController::new(),
            table_interval,
            chart_interval,
        )
    }

    pub fn spawn_with<P, C>(
        provider: P,
        controller: C,
        table_interval: Duration,
        chart_interval: Duration,
    ) -> Self
    where
        P: MetricsProvider + 'static,
        C: ProcessController + 'static,
    {
        let engine = Engine::new(provider, controller, table_interval, chart_interval);
        Self::spawn_engine(engine)
    }

    pub fn spawn_engine<P, C>(mut engine: Engine<P, C>) -> Self
    where
        P: MetricsProvider + 'static,
        C: ProcessController + 'static,
    {
        let dashboard = Arc::new(RwLock::new(Arc::new(Dashboard::default())));
        let (commands, receiver) = mpsc::channel();

        let shared = Arc::clone(&dashboard);
        let worker = thread::spawn(move || {
            engine.refresh_system();
            engine.refresh_services();
            engine.run_due_ticks();
            publish(&shared, engine.dashboard());

            loop {
                match receiver.recv_timeout(engine.next_due()) {
                    Ok(command) => {
                        if !engine.handle(command) {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                engine.run_due_ticks();
                publish(&shared, engine.dashboard());
            }
            info!("monitor thread stopped");
        });

        Self {
            dashboard,
            commands,
            worker: Some(worker),
        }
    }

    /// Latest published dashboard.
    pub fn dashboard(&self) -> Arc<Dashboard> {
        let guard = self.dashboard.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn send(&self, command: MonitorCommand) {
        if self.commands.send(command).is_err() {
            warn!("monitor thread is gone, command dropped");
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        let _ = self.commands.send(MonitorCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("monitor thread panicked");
            }
        }
    }
}

fn publish(shared: &RwLock<Arc<Dashboard>>, dashboard: Dashboard) {
    let mut slot = shared.write().unwrap_or_else(PoisonError::into_inner);
    *slot = Arc::new(dashboard);
}

use crate::components::process_table::{open_file_location, TableEvent};
use crate::components::services_view::ServicesEvent;
use crate::components::settings::{show_settings_window, Settings};
use crate::components::{
    history_view, network_view, performance, process_details, process_table, services_view,
    system_view, users_view,
};
use crate::export::{export_processes, export_services};
use crate::metrics::process::{ProcessSnapshotRow, ServiceRow};
use crate::metrics::{Monitor, MonitorCommand};
use log::warn;
use std::time::Duration;

const REPAINT_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    AppHistory,
    Performance,
    Processes,
    Network,
    Services,
    Users,
    SystemDetails,
}

impl Tab {
    const ALL: [Tab; 7] = [
        Tab::AppHistory,
        Tab::Performance,
        Tab::Processes,
        Tab::Network,
        Tab::Services,
        Tab::Users,
        Tab::SystemDetails,
    ];

    fn title(self) -> &'static str {
        match self {
            Tab::AppHistory => "App History",
            Tab::Performance => "Performance",
            Tab::Processes => "Processes",
            Tab::Network => "Network",
            Tab::Services => "Services",
            Tab::Users => "Users",
            Tab::SystemDetails => "System Details",
        }
    }
}

pub struct TaskManagerApp {
    monitor: Monitor,
    settings: Settings,
    tab: Tab,
    search: String,
    /// Outcome of the last UI-side operation (export, copy, open folder)
    local_status: Option<String>,
}

impl TaskManagerApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Only the settings are persisted; the monitor always starts fresh.
        let settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_monitor(
            Monitor::spawn(settings.refresh_interval(), settings.chart_interval()),
            settings,
        )
    }

    pub fn with_monitor(monitor: Monitor, settings: Settings) -> Self {
        Self {
            monitor,
            settings,
            tab: Tab::Processes,
            search: String::new(),
            local_status: None,
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        self.tab = tab;
        match tab {
            Tab::Network => self.monitor.send(MonitorCommand::RefreshNetwork),
            Tab::Services => self.monitor.send(MonitorCommand::RefreshServices),
            Tab::SystemDetails => self.monitor.send(MonitorCommand::RefreshSystem),
            _ => {}
        }
    }

    fn handle_table_event(&mut self, ctx: &egui::Context, event: TableEvent) {
        match event {
            TableEvent::Select(pid) => self.monitor.send(MonitorCommand::Select(Some(pid))),
            TableEvent::Apply(action, pid) => {
                self.local_status = None;
                self.monitor.send(MonitorCommand::Apply(action, pid));
            }
            TableEvent::OpenLocation(path) => {
                self.local_status = Some(match open_file_location(&path) {
                    Ok(()) => format!("Opened folder of {path}"),
                    Err(e) => {
                        warn!("cannot open file location of {path:?}: {e}");
                        format!("Open File Location: {e}")
                    }
                });
            }
            TableEvent::CopyPid(pid) => {
                ctx.copy_text(pid.to_string());
                self.local_status = Some(format!("Copied PID {pid}"));
            }
        }
    }

    fn export_processes(&mut self, rows: &[ProcessSnapshotRow]) {
        self.local_status = Some(match export_processes(&self.settings.log_dir, rows) {
            Ok(path) => format!("Exported processes to {}", path.display()),
            Err(e) => {
                warn!("process export failed: {e}");
                format!("Export failed: {e}")
            }
        });
    }

    fn export_services(&mut self, rows: &[ServiceRow]) {
        self.local_status = Some(match export_services(&self.settings.log_dir, rows) {
            Ok(path) => format!("Exported services to {}", path.display()),
            Err(e) => {
                warn!("service export failed: {e}");
                format!("Export failed: {e}")
            }
        });
    }
}

impl eframe::App for TaskManagerApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.settings.apply(ctx);
        let dashboard = self.monitor.dashboard();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.add_space(16.0);
                ui.label("Search:");
                if ui.text_edit_singleline(&mut self.search).changed() {
                    self.monitor
                        .send(MonitorCommand::SetFilter(self.search.clone()));
                }
                if ui.button("Refresh").clicked() {
                    self.monitor.send(MonitorCommand::Refresh);
                }
                if ui.button("Export Processes CSV").clicked() {
                    self.export_processes(&dashboard.rows);
                }

                ui.add_space(16.0);
                egui::widgets::global_theme_preference_buttons(ui);

                ui.add_space(16.0);
                if ui.button("⚙").clicked() {
                    self.settings.show();
                }
            });

            ui.horizontal(|ui| {
                let mut selected = self.tab;
                for tab in Tab::ALL {
                    ui.selectable_value(&mut selected, tab, tab.title());
                }
                self.switch_tab(selected);
            });
        });

        if show_settings_window(ctx, &mut self.settings) {
            self.monitor.send(MonitorCommand::SetIntervals {
                table: self.settings.refresh_interval(),
                chart: self.settings.chart_interval(),
            });
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let status = self.local_status.as_deref().unwrap_or(&dashboard.status);
            ui.label(status);
        });

        let mut table_events = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::AppHistory => history_view::show_history(ui, &dashboard.history),
            Tab::Performance => performance::show_performance(ui, &dashboard),
            Tab::Processes => {
                ui.label(format!(
                    "{} of {} processes",
                    dashboard.rows.len(),
                    dashboard.process_count
                ));
                process_table::show_action_bar(ui, dashboard.selected, &mut table_events);
                egui::TopBottomPanel::bottom("process_details")
                    .resizable(true)
                    .show_inside(ui, |ui| {
                        process_details::show_process_details(
                            ui,
                            dashboard.details.as_ref(),
                            &dashboard.process_chart,
                        );
                    });
                process_table::show_process_table(
                    ui,
                    &dashboard.rows,
                    dashboard.selected,
                    &mut table_events,
                );
            }
            Tab::Network => {
                if network_view::show_network(ui, &dashboard.network) {
                    self.monitor.send(MonitorCommand::RefreshNetwork);
                }
            }
            Tab::Services => match services_view::show_services(ui, &dashboard.services) {
                Some(ServicesEvent::Refresh) => self.monitor.send(MonitorCommand::RefreshServices),
                Some(ServicesEvent::Export) => self.export_services(&dashboard.services),
                None => {}
            },
            Tab::Users => users_view::show_users(ui, &dashboard.users),
            Tab::SystemDetails => {
                if system_view::show_system(ui, dashboard.summary.as_ref()) {
                    self.monitor.send(MonitorCommand::RefreshSystem);
                }
            }
        });

        for event in table_events {
            self.handle_table_event(ctx, event);
        }

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}

use super::state::TableEvent;
use crate::control::{Priority, ProcessAction};
use crate::metrics::process::ProcessSnapshotRow;
use humansize::{format_size, DECIMAL};

const COLUMNS: [&str; 12] = [
    "PID", "Name", "User", "CPU%", "Mem%", "Threads", "Start", "Status", "Disk Read", "Disk Write",
    "GPU%", "Nice",
];

pub fn show_process_table(
    ui: &mut egui::Ui,
    rows: &[ProcessSnapshotRow],
    selected: Option<u32>,
    events: &mut Vec<TableEvent>,
) {
    egui::ScrollArea::both()
        .id_salt("process_table")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("process_grid")
                .striped(true)
                .num_columns(COLUMNS.len())
                .show(ui, |ui| {
                    for column in COLUMNS {
                        ui.strong(column);
                    }
                    ui.end_row();

                    for row in rows {
                        let is_selected = selected == Some(row.pid);
                        let response = ui.selectable_label(is_selected, row.pid.to_string());
                        if response.clicked() {
                            events.push(TableEvent::Select(row.pid));
                        }
                        response.context_menu(|ui| {
                            context_menu(ui, row, events);
                        });

                        ui.label(&row.name);
                        ui.label(&row.user);
                        ui.label(format!("{:.1}", row.cpu_percent));
                        ui.label(format!("{:.1}", row.memory_percent));
                        ui.label(row.thread_count.to_string());
                        ui.label(row.start_time_label());
                        ui.label(&row.status);
                        ui.label(format_size(row.io_read_bytes, DECIMAL));
                        ui.label(format_size(row.io_write_bytes, DECIMAL));
                        ui.label(format!("{:.1}", row.gpu_percent));
                        ui.label(row.niceness.to_string());
                        ui.end_row();
                    }
                });
        });
}

fn context_menu(ui: &mut egui::Ui, row: &ProcessSnapshotRow, events: &mut Vec<TableEvent>) {
    let pid = row.pid;
    let mut chosen = None;

    for action in [
        ProcessAction::Terminate,
        ProcessAction::Kill,
        ProcessAction::Suspend,
        ProcessAction::Resume,
    ] {
        if ui.button(action.to_string()).clicked() {
            chosen = Some(TableEvent::Apply(action, pid));
        }
    }
    ui.menu_button("Set Priority", |ui| {
        for priority in Priority::ALL {
            if ui.button(priority.label()).clicked() {
                chosen = Some(TableEvent::Apply(ProcessAction::SetPriority(priority), pid));
            }
        }
    });
    ui.separator();
    if ui.button("Open File Location").clicked() {
        chosen = Some(TableEvent::OpenLocation(row.executable_path.clone()));
    }
    if ui.button("Copy PID").clicked() {
        chosen = Some(TableEvent::CopyPid(pid));
    }

    if let Some(event) = chosen {
        events.push(TableEvent::Select(pid));
        events.push(event);
        ui.close_menu();
    }
}

/// Action buttons acting on the selected process.
pub fn show_action_bar(ui: &mut egui::Ui, selected: Option<u32>, events: &mut Vec<TableEvent>) {
    ui.horizontal(|ui| {
        ui.add_enabled_ui(selected.is_some(), |ui| {
            for action in [
                ProcessAction::Terminate,
                ProcessAction::Kill,
                ProcessAction::Suspend,
                ProcessAction::Resume,
            ] {
                if ui.button(action.to_string()).clicked() {
                    if let Some(pid) = selected {
                        events.push(TableEvent::Apply(action, pid));
                    }
                }
            }
            ui.menu_button("Set Priority", |ui| {
                for priority in Priority::ALL {
                    if ui.button(priority.label()).clicked() {
                        if let Some(pid) = selected {
                            events.push(TableEvent::Apply(ProcessAction::SetPriority(priority), pid));
                        }
                        ui.close_menu();
                    }
                }
            });
        });
    });
}

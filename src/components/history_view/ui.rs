use crate::metrics::process::{clock_label, HistoryEntry};

/// Top CPU consumers per tick, newest first.
pub fn show_history(ui: &mut egui::Ui, entries: &[HistoryEntry]) {
    if entries.is_empty() {
        ui.label("No history recorded yet");
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("history_table")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("history_grid")
                .striped(true)
                .num_columns(6)
                .show(ui, |ui| {
                    for column in ["Time", "PID", "Name", "CPU%", "Mem%", "GPU%"] {
                        ui.strong(column);
                    }
                    ui.end_row();

                    for entry in entries.iter().rev() {
                        ui.label(clock_label(entry.timestamp));
                        ui.label(entry.pid.to_string());
                        ui.label(&entry.name);
                        ui.label(format!("{:.1}", entry.cpu_percent));
                        ui.label(format!("{:.1}", entry.memory_percent));
                        ui.label(format!("{:.1}", entry.gpu_percent));
                        ui.end_row();
                    }
                });
        });
}

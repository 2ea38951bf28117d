use crate::metrics::process::{format_timestamp, SystemSummary};
use humansize::{format_size, BINARY};

/// Returns `true` when a refresh was requested.
pub fn show_system(ui: &mut egui::Ui, summary: Option<&SystemSummary>) -> bool {
    let refresh = ui.button("Refresh").clicked();
    ui.separator();

    let Some(summary) = summary else {
        ui.label("System details not available");
        return refresh;
    };

    egui::Grid::new("system_grid")
        .num_columns(2)
        .show(ui, |ui| {
            let mut field = |name: &str, value: String| {
                ui.strong(name);
                ui.label(value);
                ui.end_row();
            };
            field("Platform", summary.platform.clone());
            field("Logical CPUs", summary.cpu_count_logical.to_string());
            field(
                "Physical Cores",
                summary
                    .cpu_count_physical
                    .map_or_else(|| "N/A".to_string(), |n| n.to_string()),
            );
            field("Total Memory", format_size(summary.memory_total, BINARY));
            field("Memory Used", format!("{:.1}%", summary.memory_percent_used));
            field("Disk Total", format_size(summary.disk_total, BINARY));
            field("Disk Used", format!("{:.1}%", summary.disk_percent_used));
            field("Boot Time", format_timestamp(summary.boot_time));
        });

    refresh
}

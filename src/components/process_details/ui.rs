use crate::components::plot::usage_plot;
use crate::metrics::process::{ChartSeriesPoint, ProcessDetails, PROCESS_CHART_CAPACITY};
use humansize::{format_size, DECIMAL};

pub fn show_process_details(
    ui: &mut egui::Ui,
    details: Option<&ProcessDetails>,
    chart: &[Vec<ChartSeriesPoint>; 2],
) {
    ui.group(|ui| {
        let Some(details) = details else {
            ui.label("Select a process to see its details");
            return;
        };
        let row = &details.row;

        ui.heading(format!("{} ({})", row.name, row.pid));
        egui::Grid::new("process_details_grid")
            .num_columns(2)
            .show(ui, |ui| {
                let mut field = |name: &str, value: String| {
                    ui.label(name);
                    ui.label(value);
                    ui.end_row();
                };
                field("User:", row.user.clone());
                field("Status:", row.status.clone());
                field("Started:", row.start_time_label());
                field("Threads:", row.thread_count.to_string());
                field("Nice:", row.niceness.to_string());
                field(
                    "Open files:",
                    details
                        .open_files
                        .map_or_else(|| "N/A".to_string(), |n| n.to_string()),
                );
                field(
                    "Disk I/O:",
                    format!(
                        "{} read / {} written",
                        format_size(row.io_read_bytes, DECIMAL),
                        format_size(row.io_write_bytes, DECIMAL)
                    ),
                );
                field("Path:", row.executable_path.clone());
            });

        ui.collapsing("Command line", |ui| {
            ui.label(egui::RichText::new(&row.command_line).monospace());
        });

        ui.label(format!(
            "CPU Usage: {:.1}%  Memory: {:.1}%",
            row.cpu_percent, row.memory_percent
        ));
        usage_plot(
            ui,
            ("process_chart", row.pid),
            120.0,
            PROCESS_CHART_CAPACITY,
            &[("CPU %", chart[0].as_slice()), ("Mem %", chart[1].as_slice())],
        );
    });
}

use crate::components::plot::usage_plot;
use crate::metrics::process::SYSTEM_CHART_CAPACITY;
use crate::metrics::Dashboard;

pub fn show_performance(ui: &mut egui::Ui, dashboard: &Dashboard) {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(format!("CPU Usage: {:.1}%", dashboard.load.cpu_percent));
            ui.label(format!("Memory Usage: {:.1}%", dashboard.load.memory_percent));
        });

        ui.add_space(32.0);

        ui.vertical(|ui| {
            ui.label(format!("Total Processes: {}", dashboard.process_count));
            ui.label(&dashboard.gpu_label);
        });
    });
    ui.add_space(8.0);

    let [cpu, memory] = &dashboard.system_chart;
    usage_plot(
        ui,
        "system_chart",
        260.0,
        SYSTEM_CHART_CAPACITY,
        &[("CPU %", cpu.as_slice()), ("Mem %", memory.as_slice())],
    );
}

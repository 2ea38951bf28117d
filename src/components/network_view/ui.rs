use crate::metrics::process::NetworkConnectionRow;

/// Returns `true` when a refresh was requested.
pub fn show_network(ui: &mut egui::Ui, connections: &[NetworkConnectionRow]) -> bool {
    let refresh = ui.button("Refresh Connections").clicked();
    ui.label(format!("{} connections", connections.len()));
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("network_table")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("network_grid")
                .striped(true)
                .num_columns(6)
                .show(ui, |ui| {
                    for column in ["Proto", "Local Address", "Remote Address", "Status", "PID", "Process"] {
                        ui.strong(column);
                    }
                    ui.end_row();

                    for conn in connections {
                        ui.label(conn.protocol.to_string());
                        ui.label(&conn.local_address);
                        ui.label(&conn.remote_address);
                        ui.label(&conn.status);
                        ui.label(conn.pid.map(|pid| pid.to_string()).unwrap_or_default());
                        ui.label(conn.process_name.as_deref().unwrap_or(""));
                        ui.end_row();
                    }
                });
        });

    refresh
}

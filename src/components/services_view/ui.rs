use crate::metrics::process::ServiceRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServicesEvent {
    Refresh,
    Export,
}

pub fn show_services(ui: &mut egui::Ui, services: &[ServiceRow]) -> Option<ServicesEvent> {
    let mut event = None;
    ui.horizontal(|ui| {
        if ui.button("Refresh Services").clicked() {
            event = Some(ServicesEvent::Refresh);
        }
        if ui.button("Export Services CSV").clicked() {
            event = Some(ServicesEvent::Export);
        }
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("services_table")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("services_grid")
                .striped(true)
                .num_columns(4)
                .show(ui, |ui| {
                    for column in ["Name", "Display Name", "Status", "PID"] {
                        ui.strong(column);
                    }
                    ui.end_row();

                    for service in services {
                        ui.label(&service.name);
                        ui.label(&service.display_name);
                        ui.label(&service.status);
                        ui.label(service.pid.map(|pid| pid.to_string()).unwrap_or_default());
                        ui.end_row();
                    }
                });
        });

    event
}

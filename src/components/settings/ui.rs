use super::state::Settings;

/// Returns `true` when an update interval was changed.
pub fn show_settings_window(ctx: &egui::Context, settings: &mut Settings) -> bool {
    if !settings.is_visible() {
        return false;
    }

    let mut intervals_changed = false;
    let mut close = false;

    egui::Window::new("⚙ Settings")
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("UI Scale:");
                ui.add(egui::Slider::new(&mut settings.scale, 0.5..=2.0).step_by(0.1));
            });

            ui.horizontal(|ui| {
                ui.label("Font Size:");
                ui.add(egui::Slider::new(&mut settings.font_size, 8.0..=32.0).step_by(1.0));
            });

            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Table refresh (ms):");
                intervals_changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.refresh_interval_ms, 500..=10_000)
                            .step_by(100.0),
                    )
                    .changed();
            });

            ui.horizontal(|ui| {
                ui.label("Chart refresh (ms):");
                intervals_changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.chart_interval_ms, 250..=5_000)
                            .step_by(50.0),
                    )
                    .changed();
            });

            ui.horizontal(|ui| {
                ui.label("Export folder:");
                let mut dir = settings.log_dir.to_string_lossy().into_owned();
                if ui.text_edit_singleline(&mut dir).changed() {
                    settings.log_dir = dir.into();
                }
            });

            ui.separator();

            if ui.button("Close").clicked() {
                close = true;
            }
        });

    if close {
        settings.hide();
    }
    intervals_changed
}

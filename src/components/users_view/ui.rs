use crate::metrics::process::{format_timestamp, UserSessionRow};

pub fn show_users(ui: &mut egui::Ui, users: &[UserSessionRow]) {
    if users.is_empty() {
        ui.label("No logged-in users found");
        return;
    }

    egui::Grid::new("users_grid")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui| {
            for column in ["User", "Terminal", "Login Time"] {
                ui.strong(column);
            }
            ui.end_row();

            for user in users {
                ui.label(&user.username);
                ui.label(&user.terminal);
                ui.label(format_timestamp(user.login_time));
                ui.end_row();
            }
        });
}

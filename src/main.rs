#![warn(clippy::all, rust_2018_idioms)]

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("procwatch")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        "procwatch",
        native_options,
        Box::new(|cc| Ok(Box::new(procwatch::TaskManagerApp::new(cc)))),
    )
}

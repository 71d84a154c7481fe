#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod views;

use app::HumidiflowApp;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args_os().nth(1).map(std::path::PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("Humidiflow"),
        ..Default::default()
    };

    eframe::run_native(
        "Humidiflow",
        options,
        Box::new(|cc| Ok(Box::new(HumidiflowApp::new(cc, config_path)))),
    )
}

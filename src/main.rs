// main.rs
mod app;
mod convert;
mod fit;
mod utils;

use std::path::PathBuf;

use app::App;
use eframe::NativeOptions;

fn main() {
    // Paths passed on the command line open straight into viewer windows.
    let external: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    let native_options = NativeOptions {
        initial_window_size: Some(egui::Vec2::new(600.0, 600.0)),
        resizable: true,
        drag_and_drop_support: true,
        ..Default::default()
    };
    eframe::run_native(
        "WebPow - The easiest way to convert your images to WebP",
        native_options,
        Box::new(move |_cc| Box::new(App::with_external_files(external))),
    );
}

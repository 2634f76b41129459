#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod commands;
mod helpers;
mod media;
mod modules;
mod paths;
mod report;
mod state;
mod theme;

fn main() -> eframe::Result {
    ffmpeg_the_third::init().expect("FFmpeg init failed");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("🎯 FrameSeek")
            .with_inner_size([1120.0, 680.0])
            .with_min_inner_size([860.0, 540.0]),
        ..Default::default()
    };

    eframe::run_native(
        "FrameSeek",
        native_options,
        Box::new(|cc| Ok(Box::new(app::FrameSeekApp::new(cc)))),
    )
}

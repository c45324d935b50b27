mod app;
mod config;
mod constants;
mod error;
mod file_record;
mod file_store;
mod format;
mod gallery;
mod image_loader;
mod input;
mod intake;
mod paths;
mod playback;
mod preview;
mod video_frame;
mod video_player;
mod viewer;

use app::GalleryApp;
use config::GalleryConfig;
use constants::{INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH};
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = GalleryConfig::load_or_default();
    log::info!(
        "starting with max_files={} accept={:?}",
        config.max_files,
        config.accept
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT])
            .with_min_inner_size([480.0, 360.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Temporary File Gallery",
        options,
        Box::new(move |cc| Ok(Box::new(GalleryApp::new(cc, config)))),
    )
}

//! GTK host: main image canvas, picker toolbar and the floating magnifier.

mod paint;
mod pointer;
mod window;
mod worker;

use std::path::PathBuf;

use gtk4::prelude::*;
use gtk4::Application;

use crate::config::CanvasScale;
use crate::error::AppResult;
use crate::geometry::PixelSize;

const APPLICATION_ID: &str = "io.github.pipette";

/// Opens the picker window and blocks until it is closed.
pub fn run(image: PathBuf, base: PixelSize, scale: CanvasScale) -> AppResult<()> {
    tracing::info!(image = %image.display(), scale = scale.factor(), "starting gtk runtime");
    let application = Application::new(
        Some(APPLICATION_ID),
        gtk4::gio::ApplicationFlags::NON_UNIQUE,
    );

    application.connect_activate(move |app| {
        let window = window::build(app, image.clone(), base, scale);
        window.present();
    });

    // Arguments were already consumed by clap.
    let args = ["pipette"];
    let exit = application.run_with_args(&args[..]);
    if exit != gtk4::glib::ExitCode::SUCCESS {
        tracing::warn!(?exit, "gtk runtime exited with failure");
    }
    Ok(())
}

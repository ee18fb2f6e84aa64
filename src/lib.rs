#[cfg(feature = "gtk")]
pub mod app;
pub mod canvas;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod magnifier;
pub mod picker;
pub mod state;
pub mod surface;

pub use color::SampledColor;
pub use error::{AppError, AppResult};
pub use picker::{MoveOutcome, PickerController};
pub use surface::ImageSurface;

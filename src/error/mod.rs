use crate::color::ColorError;
use crate::config::ConfigPathError;
use crate::state::StateError;
use crate::surface::SurfaceError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    ConfigPath(#[from] ConfigPathError),

    #[error("the desktop window requires a build with the `gtk` feature")]
    GtkUnavailable,
}

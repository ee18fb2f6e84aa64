use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::PixelSize;
use crate::surface::DEFAULT_SOURCE_IMAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    MissingHomeDirectory,
}

const APP_DIR: &str = "pipette";
const APP_CONFIG_FILE: &str = "config.json";
const DEFAULT_BASE_WIDTH: u32 = 1280;
const DEFAULT_BASE_HEIGHT: u32 = 720;

/// Discrete display factor of the main canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CanvasScale {
    #[default]
    X1,
    X4,
    X16,
}

impl CanvasScale {
    pub const fn factor(self) -> u32 {
        match self {
            Self::X1 => 1,
            Self::X4 => 4,
            Self::X16 => 16,
        }
    }

    pub const fn from_factor(factor: u32) -> Option<Self> {
        match factor {
            1 => Some(Self::X1),
            4 => Some(Self::X4),
            16 => Some(Self::X16),
            _ => None,
        }
    }

    /// 1x -> 4x -> 16x -> 1x.
    pub const fn next(self) -> Self {
        match self {
            Self::X1 => Self::X4,
            Self::X4 => Self::X16,
            Self::X16 => Self::X1,
        }
    }

    pub fn display_size(self, base: PixelSize) -> PixelSize {
        PixelSize::new(
            base.width.saturating_mul(self.factor()),
            base.height.saturating_mul(self.factor()),
        )
    }

    pub fn label(self) -> String {
        format!("{}x canvas scale", self.factor())
    }
}

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    #[serde(default)]
    pub base_width: Option<u32>,
    #[serde(default)]
    pub base_height: Option<u32>,
    #[serde(default)]
    pub initial_scale: Option<u32>,
}

impl AppConfig {
    pub fn image_path(&self) -> PathBuf {
        self.image_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_IMAGE))
    }

    pub fn base_size(&self) -> PixelSize {
        PixelSize::new(
            self.base_width
                .filter(|width| *width > 0)
                .unwrap_or(DEFAULT_BASE_WIDTH),
            self.base_height
                .filter(|height| *height > 0)
                .unwrap_or(DEFAULT_BASE_HEIGHT),
        )
    }

    pub fn initial_scale(&self) -> CanvasScale {
        match self.initial_scale {
            None => CanvasScale::default(),
            Some(factor) => CanvasScale::from_factor(factor).unwrap_or_else(|| {
                tracing::warn!(factor, "unsupported initial_scale in config; using 1x");
                CanvasScale::default()
            }),
        }
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "pipette",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/pipette/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("pipette", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/pipette/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("pipette", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let config = load_app_config_with(Some(Path::new("/nonexistent/pipette-config")), None);
        assert_eq!(config.image_path(), PathBuf::from("beach.jpg"));
        assert_eq!(config.base_size(), PixelSize::new(1280, 720));
        assert_eq!(config.initial_scale(), CanvasScale::X1);
    }

    #[test]
    fn config_fields_parse_and_invalid_values_fall_back() {
        let config: AppConfig = serde_json::from_str(
            r#"{"image_path": "/tmp/photo.png", "base_width": 0, "base_height": 600, "initial_scale": 4}"#,
        )
        .expect("valid json");
        assert_eq!(config.image_path(), PathBuf::from("/tmp/photo.png"));
        assert_eq!(config.base_size(), PixelSize::new(1280, 600));
        assert_eq!(config.initial_scale(), CanvasScale::X4);

        let odd: AppConfig = serde_json::from_str(r#"{"initial_scale": 3}"#).expect("valid json");
        assert_eq!(odd.initial_scale(), CanvasScale::X1);
    }

    #[test]
    fn canvas_scale_cycles_through_three_factors() {
        let mut scale = CanvasScale::X1;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(scale.factor());
            scale = scale.next();
        }
        assert_eq!(seen, vec![1, 4, 16, 1]);
        assert_eq!(
            CanvasScale::X16.display_size(PixelSize::new(1280, 720)),
            PixelSize::new(20480, 11520)
        );
        assert_eq!(CanvasScale::X4.label(), "4x canvas scale");
    }
}

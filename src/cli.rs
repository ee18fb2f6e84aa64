//! Command-line front end: `run` opens the desktop window, `probe` drives the
//! picker headlessly and prints the committed colour.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use image::RgbaImage;

use crate::canvas::RasterCanvas;
use crate::color::SampledColor;
use crate::config::{load_app_config, AppConfig, CanvasScale};
use crate::error::AppError;
use crate::geometry::{PagePoint, PageRect, PixelPoint, PixelSize, SurfaceBounds};
use crate::magnifier::P_SIZE;
use crate::picker::{ListenerRegistry, MoveOutcome, PickerController};
use crate::surface::{load_source_image, ImageSurface};

/// Magnifier colour picker over a raster image.
#[derive(Parser, Debug)]
#[command(name = "pipette", version, about = "Magnifier colour picker over a raster image")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the picker window (needs the `gtk` feature).
    Run(RunArgs),
    /// Pick the colour under one surface pixel without opening a window.
    Probe(ProbeArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Source image. Defaults to `image_path` from config.json, then beach.jpg.
    #[arg(short, long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Initial canvas scale: 1, 4 or 16.
    #[arg(short, long, value_parser = parse_scale, value_name = "FACTOR")]
    pub scale: Option<CanvasScale>,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[arg(short, long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Surface-local pixel to pick, as `X,Y`.
    #[arg(long, value_parser = parse_point, value_name = "X,Y")]
    pub at: PixelPoint,

    #[arg(short, long, value_parser = parse_scale, value_name = "FACTOR")]
    pub scale: Option<CanvasScale>,

    /// Also write the rendered magnifier tile as PNG.
    #[arg(long, value_name = "OUT.png")]
    pub tile: Option<PathBuf>,
}

fn parse_scale(raw: &str) -> Result<CanvasScale, String> {
    let factor: u32 = raw
        .trim()
        .trim_end_matches(['x', 'X'])
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    CanvasScale::from_factor(factor).ok_or_else(|| format!("scale must be 1, 4 or 16, got {factor}"))
}

fn parse_point(raw: &str) -> Result<PixelPoint, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got `{raw}`"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|_| format!("invalid x coordinate `{x}`"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|_| format!("invalid y coordinate `{y}`"))?;
    Ok(PixelPoint::new(x, y))
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_app_config();
    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run_window(&config, args),
        Command::Probe(args) => run_probe(&config, args),
    }
}

#[cfg(feature = "gtk")]
fn run_window(config: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let image = args.image.unwrap_or_else(|| config.image_path());
    let scale = args.scale.unwrap_or_else(|| config.initial_scale());
    crate::app::run(image, config.base_size(), scale)?;
    Ok(())
}

#[cfg(not(feature = "gtk"))]
fn run_window(_config: &AppConfig, _args: RunArgs) -> anyhow::Result<()> {
    Err(AppError::GtkUnavailable.into())
}

fn run_probe(config: &AppConfig, args: ProbeArgs) -> anyhow::Result<()> {
    let path = args.image.unwrap_or_else(|| config.image_path());
    let scale = args.scale.unwrap_or_else(|| config.initial_scale());
    let source = load_source_image(&path).map_err(AppError::from)?;

    let probe = probe_color(source, config.base_size(), scale, args.at)?;
    println!("{}", probe.color.to_display_hex());

    if let Some(out) = args.tile.as_deref() {
        save_tile(&probe.tile, out)?;
    }
    Ok(())
}

fn save_tile(tile: &RgbaImage, out: &Path) -> anyhow::Result<()> {
    tile.save(out)
        .with_context(|| format!("failed to write magnifier tile to {}", out.display()))?;
    tracing::info!(path = %out.display(), "magnifier tile written");
    Ok(())
}

/// Result of a headless pick.
#[derive(Debug)]
pub struct Probe {
    pub color: SampledColor,
    pub tile: RgbaImage,
}

/// Runs one full tracking session: enter, move the pointer over `at`,
/// commit, exit.
pub fn probe_color(
    source: RgbaImage,
    base: PixelSize,
    scale: CanvasScale,
    at: PixelPoint,
) -> anyhow::Result<Probe> {
    let display = scale.display_size(base);
    if at.x < 0 || at.y < 0 || at.x as u32 >= display.width || at.y as u32 >= display.height {
        bail!(
            "point {},{} lies outside the {}x{} surface",
            at.x,
            at.y,
            display.width,
            display.height
        );
    }

    let mut surface = ImageSurface::with_source(source);
    surface.render(display.width, display.height);

    let mut controller = PickerController::with_overlay(display, RasterCanvas::new(P_SIZE, P_SIZE));
    let mut listeners = ListenerRegistry::new();
    controller
        .enter_tracking(&mut listeners)
        .map_err(AppError::from)?;

    let bounds = SurfaceBounds::new(PageRect::from_origin_size(
        0.0,
        0.0,
        f64::from(display.width),
        f64::from(display.height),
    ));
    let pointer = PagePoint::new(f64::from(at.x) + 0.5, f64::from(at.y) + 0.5);
    let outcome = controller.on_pointer_move(pointer, Some(bounds), &surface);
    tracing::debug!(?outcome, "probe pointer move");
    if !matches!(outcome, MoveOutcome::Rendered { .. }) {
        bail!("magnifier did not render at {},{}", at.x, at.y);
    }

    let color = controller
        .commit()
        .context("magnifier tile has no readable centre pixel")?;
    controller
        .exit_tracking(&mut listeners)
        .map_err(AppError::from)?;

    let tile = controller
        .detach_overlay()
        .map(RasterCanvas::into_image)
        .context("magnifier overlay went missing")?;
    Ok(Probe { color, tile })
}

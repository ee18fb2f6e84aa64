//! The main image surface: the source asset rendered at the current display
//! size, read back by the magnifier.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{imageops, RgbaImage};
use thiserror::Error;

use crate::canvas::{DrawingTarget, RasterCanvas};
use crate::geometry::{PixelRect, PixelSize};

pub const DEFAULT_SOURCE_IMAGE: &str = "beach.jpg";

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to load source image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("source image {path} has no pixels")]
    Empty { path: PathBuf },
}

/// Decodes the source asset. Runs off the UI thread in the gtk host.
pub fn load_source_image(path: &Path) -> SurfaceResult<RgbaImage> {
    let decoded = image::open(path).map_err(|source| SurfaceError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(SurfaceError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(rgba)
}

#[derive(Debug, Clone)]
enum SourceState {
    Loading,
    Ready(Arc<RgbaImage>),
    Failed,
}

/// One frame of the surface still to be drawn. `draw` is pure, so it can run
/// on a worker thread while the UI keeps the previous frame.
#[derive(Debug, Clone)]
pub struct FrameJob {
    source: Arc<RgbaImage>,
    size: PixelSize,
}

impl FrameJob {
    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn draw(&self) -> RasterCanvas {
        let mut canvas = RasterCanvas::new(self.size.width, self.size.height);
        canvas.set_smoothing(true);
        canvas.draw_image_region(
            &self.source,
            PixelRect::new(0, 0, self.source.width(), self.source.height()),
            PixelRect::new(0, 0, self.size.width, self.size.height),
        );
        tracing::debug!(
            width = self.size.width,
            height = self.size.height,
            "image surface frame drawn"
        );
        canvas
    }
}

/// Source image plus its rendering at the requested display size.
///
/// `render` before the source has loaded only records the requested size; the
/// draw happens in `on_source_loaded`. A failed load leaves the surface blank
/// for good.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    source: SourceState,
    requested: Option<PixelSize>,
    canvas: Option<RasterCanvas>,
}

impl ImageSurface {
    /// A surface whose source is still loading.
    pub fn new() -> Self {
        Self {
            source: SourceState::Loading,
            requested: None,
            canvas: None,
        }
    }

    pub fn with_source(source: RgbaImage) -> Self {
        Self {
            source: SourceState::Ready(Arc::new(source)),
            requested: None,
            canvas: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.source, SourceState::Ready(_))
    }

    pub fn load_failed(&self) -> bool {
        matches!(self.source, SourceState::Failed)
    }

    /// Requests the surface at `width × height`. Returns whether a frame was
    /// drawn by this call.
    pub fn render(&mut self, width: u32, height: u32) -> bool {
        match self.request(width, height) {
            Some(job) => self.install_frame(job.draw()),
            None => false,
        }
    }

    /// Records `width × height` as the wanted size and returns the frame to
    /// draw for it, if one is needed and the source is available. The result
    /// goes back through `install_frame`.
    pub fn request(&mut self, width: u32, height: u32) -> Option<FrameJob> {
        let size = PixelSize::new(width, height);
        if size.is_empty() {
            tracing::warn!(width, height, "ignoring empty display size for image surface");
            return None;
        }
        self.requested = Some(size);
        self.pending_job()
    }

    /// Installs a frame drawn from a `FrameJob`. Frames for a size that is no
    /// longer requested are dropped.
    pub fn install_frame(&mut self, frame: RasterCanvas) -> bool {
        let size = frame.size();
        if self.requested != Some(size) || !self.is_loaded() {
            tracing::debug!(
                width = size.width,
                height = size.height,
                "dropping stale image surface frame"
            );
            return false;
        }
        self.canvas = Some(frame);
        true
    }

    /// Size the surface is expected to reach once pending frames land.
    pub fn requested_size(&self) -> Option<PixelSize> {
        self.requested
    }

    /// Completion of the asynchronous source load.
    pub fn on_source_loaded(&mut self, result: SurfaceResult<RgbaImage>) {
        match result {
            Ok(image) => {
                tracing::debug!(
                    width = image.width(),
                    height = image.height(),
                    "source image loaded"
                );
                self.source = SourceState::Ready(Arc::new(image));
                self.canvas = None;
                if let Some(job) = self.pending_job() {
                    self.install_frame(job.draw());
                }
            }
            Err(err) => {
                tracing::warn!(%err, "source image failed to load; surface stays blank");
                self.source = SourceState::Failed;
                self.canvas = None;
            }
        }
    }

    fn pending_job(&self) -> Option<FrameJob> {
        let SourceState::Ready(source) = &self.source else {
            tracing::trace!("image surface render deferred until the source loads");
            return None;
        };
        let size = self.requested?;
        if self.size() == Some(size) {
            return None;
        }
        Some(FrameJob {
            source: Arc::clone(source),
            size,
        })
    }

    /// Size of the rendered raster, `None` until the first frame is drawn.
    pub fn size(&self) -> Option<PixelSize> {
        self.canvas.as_ref().map(DrawingTarget::size)
    }

    pub fn raster(&self) -> Option<&RgbaImage> {
        self.canvas.as_ref().map(RasterCanvas::image)
    }

    /// Rendered pixels of `[x, x + width) × [y, y + height)`, clamped to the
    /// surface. `None` before the first frame or when nothing overlaps.
    pub fn sample_region(&self, x: i32, y: i32, width: u32, height: u32) -> Option<RgbaImage> {
        let raster = self.raster()?;
        let bounds = PixelSize::new(raster.width(), raster.height());
        let region = PixelRect::new(x, y, width, height).clamp_to(bounds)?;
        Some(
            imageops::crop_imm(
                raster,
                region.x as u32,
                region.y as u32,
                region.width,
                region.height,
            )
            .to_image(),
        )
    }
}

impl Default for ImageSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    #[test]
    fn render_before_load_draws_nothing_until_source_arrives() {
        let mut surface = ImageSurface::new();
        assert!(!surface.render(32, 16));
        assert_eq!(surface.size(), None);
        assert!(surface.sample_region(0, 0, 4, 4).is_none());

        surface.on_source_loaded(Ok(gradient(32, 16)));
        assert!(surface.is_loaded());
        assert_eq!(surface.size(), Some(PixelSize::new(32, 16)));
    }

    #[test]
    fn failed_load_never_renders() {
        let mut surface = ImageSurface::new();
        surface.on_source_loaded(Err(SurfaceError::Empty {
            path: PathBuf::from("missing.png"),
        }));
        assert!(surface.load_failed());
        assert!(!surface.render(64, 64));
        assert_eq!(surface.raster(), None);
    }

    #[test]
    fn render_rebuilds_only_when_size_changes() {
        let mut surface = ImageSurface::with_source(gradient(16, 16));
        assert!(surface.render(16, 16));
        assert!(!surface.render(16, 16));
        assert!(surface.render(64, 64));
        assert_eq!(surface.size(), Some(PixelSize::new(64, 64)));
    }

    #[test]
    fn frame_jobs_install_only_for_the_latest_request() {
        let mut surface = ImageSurface::with_source(gradient(16, 16));
        assert!(surface.render(16, 16));

        let x4 = surface.request(64, 64).expect("new size needs a frame");
        assert_eq!(x4.size(), PixelSize::new(64, 64));
        // The previous frame stays readable while the job is out.
        assert_eq!(surface.size(), Some(PixelSize::new(16, 16)));

        let x16 = surface.request(256, 256).expect("newer size needs a frame");
        assert!(!surface.install_frame(x4.draw()));
        assert_eq!(surface.size(), Some(PixelSize::new(16, 16)));

        assert!(surface.install_frame(x16.draw()));
        assert_eq!(surface.size(), Some(PixelSize::new(256, 256)));
        assert_eq!(surface.requested_size(), Some(PixelSize::new(256, 256)));
        assert!(surface.request(256, 256).is_none());
    }

    #[test]
    fn request_before_load_yields_no_job() {
        let mut surface = ImageSurface::new();
        assert!(surface.request(32, 32).is_none());
        assert!(!surface.install_frame(RasterCanvas::new(32, 32)));
        assert_eq!(surface.size(), None);
    }

    #[test]
    fn render_ignores_empty_sizes() {
        let mut surface = ImageSurface::with_source(gradient(4, 4));
        assert!(!surface.render(0, 10));
        assert_eq!(surface.size(), None);
    }

    #[test]
    fn sample_region_reads_rendered_pixels_and_clamps() {
        let mut surface = ImageSurface::with_source(gradient(32, 32));
        surface.render(32, 32);

        let region = surface.sample_region(30, -2, 8, 4).expect("overlaps surface");
        assert_eq!(region.dimensions(), (2, 2));
        assert_eq!(region.get_pixel(0, 0).0, [30, 0, 7, 255]);
        assert_eq!(region.get_pixel(1, 1).0, [31, 1, 7, 255]);
        assert!(surface.sample_region(40, 40, 4, 4).is_none());
    }

    #[test]
    fn load_source_image_reports_missing_file() {
        let err = load_source_image(Path::new("/nonexistent/pipette/beach.jpg"))
            .expect_err("missing file should fail");
        assert!(matches!(err, SurfaceError::Load { .. }));
    }
}

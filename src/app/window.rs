use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{
    graphene, Align, Application, ApplicationWindow, Box as GtkBox, Button, DrawingArea, Fixed,
    GestureClick, Label, Orientation, Overlay, PropagationPhase, ScrolledWindow, ToggleButton,
};

use super::paint::{paint_surface, rgba_to_cairo_surface};
use super::pointer::{MotionHandler, WindowPointerSource};
use super::worker::spawn_background;
use crate::canvas::RasterCanvas;
use crate::color::SampledColor;
use crate::config::CanvasScale;
use crate::geometry::{PagePoint, PageRect, PixelSize, SurfaceBounds};
use crate::magnifier::P_SIZE;
use crate::picker::{MoveOutcome, PickerController};
use crate::surface::{load_source_image, FrameJob, ImageSurface};

const WINDOW_WIDTH: i32 = 1320;
const WINDOW_HEIGHT: i32 = 820;
const SWATCH_SIZE: i32 = 24;

struct PickerRuntime {
    surface: ImageSurface,
    controller: PickerController<RasterCanvas>,
    base: PixelSize,
    scale: CanvasScale,
    picked: Option<SampledColor>,
    surface_paint: Option<gtk4::cairo::ImageSurface>,
}

impl PickerRuntime {
    fn new(base: PixelSize, scale: CanvasScale) -> Self {
        let display = scale.display_size(base);
        let mut surface = ImageSurface::new();
        surface.render(display.width, display.height);
        Self {
            surface,
            controller: PickerController::with_overlay(display, RasterCanvas::new(P_SIZE, P_SIZE)),
            base,
            scale,
            picked: None,
            surface_paint: None,
        }
    }

    /// Returns the frame to draw off the main loop, `None` while the source
    /// is still loading.
    fn apply_scale(&mut self, scale: CanvasScale) -> Option<FrameJob> {
        self.scale = scale;
        let display = scale.display_size(self.base);
        tracing::info!(factor = scale.factor(), "canvas scale changed");
        self.surface.request(display.width, display.height)
    }

    fn install_frame(&mut self, frame: RasterCanvas) -> Option<PixelSize> {
        if !self.surface.install_frame(frame) {
            return None;
        }
        self.sync_display()
    }

    /// Points the controller and the painted copy at the current frame.
    fn sync_display(&mut self) -> Option<PixelSize> {
        let size = self.surface.size()?;
        self.controller.set_display_size(size);
        self.surface_paint = None;
        Some(size)
    }
}

fn set_canvas_size(canvas: &DrawingArea, display: PixelSize) {
    canvas.set_content_width(i32::try_from(display.width).unwrap_or(i32::MAX));
    canvas.set_content_height(i32::try_from(display.height).unwrap_or(i32::MAX));
}

fn page_rect_of(widget: &impl IsA<gtk4::Widget>, window: &ApplicationWindow) -> Option<PageRect> {
    let rect = widget.compute_bounds(window)?;
    Some(PageRect::from_origin_size(
        f64::from(rect.x()),
        f64::from(rect.y()),
        f64::from(rect.width()),
        f64::from(rect.height()),
    ))
}

/// Canvas placement with the pointer-sensitive part limited to the scroller
/// viewport; the canvas extends past it when scrolled.
fn surface_bounds(
    canvas: &DrawingArea,
    scroller: &ScrolledWindow,
    window: &ApplicationWindow,
) -> Option<SurfaceBounds> {
    let canvas_rect = page_rect_of(canvas, window)?;
    let viewport = page_rect_of(scroller, window)?;
    Some(SurfaceBounds::new(canvas_rect).clipped_to(&viewport))
}

fn place_magnifier(
    layer: &Fixed,
    magnifier: &DrawingArea,
    window: &ApplicationWindow,
    top_left: PagePoint,
) {
    let origin = layer
        .compute_point(window, &graphene::Point::new(0.0, 0.0))
        .map(|point| (f64::from(point.x()), f64::from(point.y())))
        .unwrap_or((0.0, 0.0));
    layer.move_(magnifier, top_left.x - origin.0, top_left.y - origin.1);
}

pub(super) fn build(
    app: &Application,
    image: PathBuf,
    base: PixelSize,
    scale: CanvasScale,
) -> ApplicationWindow {
    let runtime = Rc::new(RefCell::new(PickerRuntime::new(base, scale)));

    let window = ApplicationWindow::builder()
        .application(app)
        .title("Pipette")
        .default_width(WINDOW_WIDTH)
        .default_height(WINDOW_HEIGHT)
        .build();

    let scale_button = Button::with_label(&scale.label());
    scale_button.set_focus_on_click(false);
    let picker_toggle = ToggleButton::with_label("Pick colour");
    picker_toggle.set_focus_on_click(false);
    let swatch = DrawingArea::new();
    swatch.set_content_width(SWATCH_SIZE);
    swatch.set_content_height(SWATCH_SIZE);
    swatch.set_can_target(false);
    let color_label = Label::new(Some("No colour picked"));
    color_label.set_selectable(true);
    let status_label = Label::new(Some("Loading image"));
    status_label.set_hexpand(true);
    status_label.set_halign(Align::End);

    let toolbar = GtkBox::new(Orientation::Horizontal, 8);
    toolbar.set_margin_top(6);
    toolbar.set_margin_bottom(6);
    toolbar.set_margin_start(8);
    toolbar.set_margin_end(8);
    toolbar.append(&scale_button);
    toolbar.append(&picker_toggle);
    toolbar.append(&swatch);
    toolbar.append(&color_label);
    toolbar.append(&status_label);

    let canvas = DrawingArea::new();
    canvas.set_halign(Align::Start);
    canvas.set_valign(Align::Start);
    set_canvas_size(&canvas, scale.display_size(base));
    let scroller = ScrolledWindow::new();
    scroller.set_vexpand(true);
    scroller.set_hexpand(true);
    scroller.set_child(Some(&canvas));

    let content = GtkBox::new(Orientation::Vertical, 0);
    content.append(&toolbar);
    content.append(&scroller);

    let magnifier = DrawingArea::new();
    let magnifier_size = i32::try_from(P_SIZE).unwrap_or(i32::MAX);
    magnifier.set_content_width(magnifier_size);
    magnifier.set_content_height(magnifier_size);
    magnifier.set_visible(false);
    let magnifier_layer = Fixed::new();
    magnifier_layer.set_can_target(false);
    magnifier_layer.put(&magnifier, 0.0, 0.0);

    let root = Overlay::new();
    root.set_child(Some(&content));
    root.add_overlay(&magnifier_layer);
    window.set_child(Some(&root));

    {
        let runtime = runtime.clone();
        canvas.set_draw_func(move |_, context, width, height| {
            if width <= 0 || height <= 0 {
                return;
            }
            let mut guard = runtime.borrow_mut();
            let rt = &mut *guard;
            if rt.surface_paint.is_none() {
                rt.surface_paint = rt.surface.raster().and_then(rgba_to_cairo_surface);
            }
            if let Some(paint) = rt.surface_paint.as_ref() {
                paint_surface(context, paint);
            }
        });
    }

    {
        let runtime = runtime.clone();
        magnifier.set_draw_func(move |_, context, _, _| {
            let rt = runtime.borrow();
            let Some(tile) = rt.controller.overlay().target() else {
                return;
            };
            if let Some(paint) = rgba_to_cairo_surface(tile.image()) {
                paint_surface(context, &paint);
            }
        });
    }

    {
        let runtime = runtime.clone();
        swatch.set_draw_func(move |_, context, width, height| {
            let Some(color) = runtime.borrow().picked else {
                return;
            };
            let (r, g, b) = color.to_cairo_rgb();
            context.save().ok();
            context.rectangle(0.0, 0.0, f64::from(width), f64::from(height));
            context.set_source_rgb(r, g, b);
            context.fill().ok();
            context.restore().ok();
        });
    }

    let on_motion: MotionHandler = {
        let runtime = runtime.clone();
        let window = window.downgrade();
        let canvas = canvas.clone();
        let scroller = scroller.clone();
        let magnifier = magnifier.clone();
        let magnifier_layer = magnifier_layer.clone();
        Rc::new(move |x, y| {
            let Some(window) = window.upgrade() else {
                return;
            };
            let bounds = surface_bounds(&canvas, &scroller, &window);
            let (outcome, top_left) = {
                let mut guard = runtime.borrow_mut();
                let rt = &mut *guard;
                let outcome = rt
                    .controller
                    .on_pointer_move(PagePoint::new(x, y), bounds, &rt.surface);
                (outcome, rt.controller.overlay().top_left())
            };
            match outcome {
                MoveOutcome::Rendered { .. } => {
                    place_magnifier(&magnifier_layer, &magnifier, &window, top_left);
                    magnifier.set_visible(true);
                    magnifier.queue_draw();
                }
                MoveOutcome::Unchanged { .. } => {
                    place_magnifier(&magnifier_layer, &magnifier, &window, top_left);
                    magnifier.set_visible(true);
                }
                MoveOutcome::Hidden => magnifier.set_visible(false),
                MoveOutcome::NotTracking | MoveOutcome::Skipped => {}
            }
        })
    };
    let pointer_source = Rc::new(RefCell::new(WindowPointerSource::new(
        window.clone(),
        on_motion,
    )));

    {
        let runtime = runtime.clone();
        let pointer_source = pointer_source.clone();
        let magnifier = magnifier.clone();
        picker_toggle.connect_toggled(move |_| {
            let result = runtime
                .borrow_mut()
                .controller
                .toggle(&mut *pointer_source.borrow_mut());
            match result {
                Ok(state) => {
                    tracing::info!(?state, "picker toggled");
                    if !state.is_tracking() {
                        magnifier.set_visible(false);
                    }
                }
                Err(err) => tracing::warn!(%err, "picker toggle rejected"),
            }
        });
    }

    {
        let runtime = runtime.clone();
        let canvas = canvas.clone();
        let status_label = status_label.clone();
        scale_button.connect_clicked(move |button| {
            let (next, job) = {
                let mut rt = runtime.borrow_mut();
                let next = rt.scale.next();
                (next, rt.apply_scale(next))
            };
            button.set_label(&next.label());
            let Some(job) = job else {
                return;
            };

            status_label.set_text("Rescaling");
            let runtime = runtime.clone();
            let canvas = canvas.clone();
            let status_label = status_label.clone();
            spawn_background(
                "draw-surface-frame",
                move || job.draw(),
                move |frame| {
                    let Some(display) = runtime.borrow_mut().install_frame(frame) else {
                        return;
                    };
                    set_canvas_size(&canvas, display);
                    canvas.queue_draw();
                    status_label.set_text(&format!("{}x{}", display.width, display.height));
                },
            );
        });
    }

    {
        let runtime = runtime.clone();
        let color_label = color_label.clone();
        let swatch = swatch.clone();
        let click = GestureClick::new();
        click.set_propagation_phase(PropagationPhase::Capture);
        click.connect_pressed(move |_, _, _, _| {
            let Some(color) = runtime.borrow().controller.commit() else {
                return;
            };
            runtime.borrow_mut().picked = Some(color);
            color_label.set_text(&color.to_display_hex());
            swatch.queue_draw();
        });
        window.add_controller(click);
    }

    {
        let runtime = runtime.clone();
        let canvas = canvas.clone();
        let status_label = status_label.clone();
        let path = image.clone();
        spawn_background(
            "load-source-image",
            move || load_source_image(&path),
            move |result| {
                let status = match &result {
                    Ok(_) => format!("Loaded {}", image.display()),
                    Err(err) => err.to_string(),
                };
                let display = {
                    let mut rt = runtime.borrow_mut();
                    rt.surface.on_source_loaded(result);
                    rt.sync_display()
                };
                if let Some(display) = display {
                    set_canvas_size(&canvas, display);
                }
                status_label.set_text(&status);
                canvas.queue_draw();
            },
        );
    }

    window
}

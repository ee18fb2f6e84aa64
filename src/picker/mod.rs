//! Pointer tracking loop that keeps the magnifier overlay in sync with the
//! pointer and commits picked colors.

mod listener;

pub use listener::{ListenerId, ListenerRegistry, PointerSource};

use crate::canvas::DrawingTarget;
use crate::color::SampledColor;
use crate::geometry::{PagePoint, PixelPoint, PixelSize, SurfaceBounds};
use crate::magnifier::{self, P_SIZE};
use crate::state::{PickerEvent, PickerState, StateMachine, StateResult};
use crate::surface::ImageSurface;

/// Pointer data owned by the tracking session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub page: Option<PagePoint>,
    pub local: Option<PixelPoint>,
    pub overlay_visible: bool,
}

impl PointerState {
    const fn new() -> Self {
        Self {
            page: None,
            local: None,
            overlay_visible: false,
        }
    }
}

#[derive(Debug)]
struct TrackingSession {
    listener: ListenerId,
    pointer: PointerState,
}

/// The floating magnifier surface and where it sits on the page.
#[derive(Debug)]
pub struct Overlay<T> {
    target: Option<T>,
    visible: bool,
    top_left: PagePoint,
}

impl<T: DrawingTarget> Overlay<T> {
    fn new(target: Option<T>) -> Self {
        Self {
            target,
            visible: false,
            top_left: PagePoint::new(0.0, 0.0),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Page position of the overlay's top-left corner.
    pub fn top_left(&self) -> PagePoint {
        self.top_left
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Centres the overlay on `pointer`.
    fn follow(&mut self, pointer: PagePoint) {
        let half = f64::from(P_SIZE) / 2.0;
        self.top_left = PagePoint::new(pointer.x - half, pointer.y - half);
    }
}

/// What a pointer-move tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// The picker is idle; nothing happened.
    NotTracking,
    /// The surface bounds or the overlay target were not available.
    Skipped,
    /// The pointer left the visible part of the surface; the overlay is
    /// hidden.
    Hidden,
    /// The overlay moved, but the surface has no rendered frame yet, so the
    /// tile still shows its previous content.
    Unchanged { local: PixelPoint },
    /// The overlay was moved and redrawn. `color` is `None` when the tile
    /// could not be completed this tick.
    Rendered {
        local: PixelPoint,
        color: Option<SampledColor>,
    },
}

/// Drives the Idle/Tracking state machine and the overlay it controls.
#[derive(Debug)]
pub struct PickerController<T> {
    machine: StateMachine,
    session: Option<TrackingSession>,
    overlay: Overlay<T>,
    display: PixelSize,
}

impl<T: DrawingTarget> PickerController<T> {
    /// A controller for a surface displayed at `display`, with no overlay
    /// target attached yet.
    pub fn new(display: PixelSize) -> Self {
        Self {
            machine: StateMachine::new(),
            session: None,
            overlay: Overlay::new(None),
            display,
        }
    }

    pub fn with_overlay(display: PixelSize, target: T) -> Self {
        Self {
            overlay: Overlay::new(Some(target)),
            ..Self::new(display)
        }
    }

    pub fn attach_overlay(&mut self, target: T) {
        self.overlay.target = Some(target);
    }

    pub fn detach_overlay(&mut self) -> Option<T> {
        self.overlay.visible = false;
        self.overlay.target.take()
    }

    pub fn state(&self) -> PickerState {
        self.machine.state()
    }

    pub fn overlay(&self) -> &Overlay<T> {
        &self.overlay
    }

    pub fn display_size(&self) -> PixelSize {
        self.display
    }

    /// Updates the displayed surface size after a scale change.
    pub fn set_display_size(&mut self, size: PixelSize) {
        let PixelSize { width, height } = size;
        tracing::debug!(width, height, "picker display size changed");
        self.display = size;
    }

    /// Pointer data of the active session, `None` while idle.
    pub fn pointer_state(&self) -> Option<&PointerState> {
        self.session.as_ref().map(|session| &session.pointer)
    }

    /// Id of the listener registered for the active session.
    pub fn active_listener(&self) -> Option<ListenerId> {
        self.session.as_ref().map(|session| session.listener)
    }

    pub fn enter_tracking<S: PointerSource + ?Sized>(&mut self, source: &mut S) -> StateResult<()> {
        self.machine.transition(PickerEvent::StartTracking)?;
        let listener = source.add_move_listener();
        tracing::debug!(listener = listener.raw(), "pointer tracking started");
        self.session = Some(TrackingSession {
            listener,
            pointer: PointerState::new(),
        });
        Ok(())
    }

    /// Removes the session's listener before returning, so no tick can run
    /// for this session afterwards.
    pub fn exit_tracking<S: PointerSource + ?Sized>(&mut self, source: &mut S) -> StateResult<()> {
        self.machine.transition(PickerEvent::StopTracking)?;
        if let Some(session) = self.session.take() {
            source.remove_move_listener(session.listener);
            tracing::debug!(listener = session.listener.raw(), "pointer tracking stopped");
        }
        self.overlay.visible = false;
        Ok(())
    }

    /// Flips between Idle and Tracking.
    pub fn toggle<S: PointerSource + ?Sized>(&mut self, source: &mut S) -> StateResult<PickerState> {
        match self.state() {
            PickerState::Idle => self.enter_tracking(source)?,
            PickerState::Tracking => self.exit_tracking(source)?,
        }
        Ok(self.state())
    }

    /// Handles one pointer move at page position `pointer`.
    ///
    /// `surface_bounds` is the surface's current on-screen placement, or
    /// `None` when the host cannot resolve it this tick.
    pub fn on_pointer_move(
        &mut self,
        pointer: PagePoint,
        surface_bounds: Option<SurfaceBounds>,
        surface: &ImageSurface,
    ) -> MoveOutcome {
        let Some(session) = self.session.as_mut() else {
            return MoveOutcome::NotTracking;
        };
        session.pointer.page = Some(pointer);

        let Some(bounds) = surface_bounds else {
            tracing::trace!("pointer move skipped: surface bounds unavailable");
            return MoveOutcome::Skipped;
        };
        if self.overlay.target.is_none() {
            tracing::trace!("pointer move skipped: overlay target not attached");
            return MoveOutcome::Skipped;
        }

        if !bounds.contains(pointer) {
            self.overlay.visible = false;
            session.pointer.overlay_visible = false;
            session.pointer.local = None;
            return MoveOutcome::Hidden;
        }

        self.overlay.visible = true;
        session.pointer.overlay_visible = true;
        self.overlay.follow(pointer);

        let local = bounds.to_local(pointer);
        session.pointer.local = Some(local);
        if surface.raster().is_none() {
            tracing::trace!("surface has no frame yet; tile left unchanged");
            return MoveOutcome::Unchanged { local };
        }
        let Some(target) = self.overlay.target.as_mut() else {
            return MoveOutcome::Skipped;
        };
        let color = magnifier::render_tile(target, surface, local, self.display);
        MoveOutcome::Rendered { local, color }
    }

    /// Commit gesture over the overlay: reads back the colour currently shown
    /// under the crosshair.
    pub fn commit(&self) -> Option<SampledColor> {
        if !self.state().is_tracking() || !self.overlay.visible {
            return None;
        }
        let color = magnifier::read_center_color(self.overlay.target.as_ref()?)?;
        tracing::info!(color = %color, "color committed");
        Some(color)
    }
}

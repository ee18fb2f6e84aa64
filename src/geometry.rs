//! Shared geometric primitives for page, surface and tile coordinate spaces.

/// Integer point in surface-local or tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pointer position in page (window) coordinates. Sub-pixel precision is kept
/// until conversion into surface space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePoint {
    pub x: f64,
    pub y: f64,
}

impl PagePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned pixel rectangle `[x, x + width) × [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Intersection with `[0, bounds.width) × [0, bounds.height)`.
    pub fn clamp_to(self, bounds: PixelSize) -> Option<PixelRect> {
        let left = i64::from(self.x).clamp(0, i64::from(bounds.width));
        let top = i64::from(self.y).clamp(0, i64::from(bounds.height));
        let right = self.right().clamp(0, i64::from(bounds.width));
        let bottom = self.bottom().clamp(0, i64::from(bounds.height));
        if right <= left || bottom <= top {
            return None;
        }

        Some(PixelRect::new(
            i32::try_from(left).ok()?,
            i32::try_from(top).ok()?,
            u32::try_from(right - left).ok()?,
            u32::try_from(bottom - top).ok()?,
        ))
    }
}

/// On-screen rectangle of a widget in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PageRect {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_origin_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    /// Edges count as inside.
    pub fn contains(&self, point: PagePoint) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }

    /// Converts a page point into integer coordinates relative to the top-left
    /// corner, flooring fractional positions.
    pub fn to_local(&self, point: PagePoint) -> PixelPoint {
        PixelPoint::new(
            floor_to_i32(point.x - self.left),
            floor_to_i32(point.y - self.top),
        )
    }

    /// Overlap of two rects, `None` when they do not touch.
    pub fn intersect(&self, other: &PageRect) -> Option<PageRect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        (left <= right && top <= bottom).then(|| PageRect::new(left, top, right, bottom))
    }
}

/// On-screen placement of the image surface: its full rect, which anchors
/// local coordinates, and the part of it actually visible to the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    rect: PageRect,
    visible: Option<PageRect>,
}

impl SurfaceBounds {
    pub const fn new(rect: PageRect) -> Self {
        Self {
            rect,
            visible: Some(rect),
        }
    }

    /// Restricts the pointer-sensitive area to `viewport`, e.g. the scrolled
    /// window showing the surface.
    pub fn clipped_to(self, viewport: &PageRect) -> Self {
        Self {
            rect: self.rect,
            visible: self.visible.and_then(|visible| visible.intersect(viewport)),
        }
    }

    pub fn rect(&self) -> PageRect {
        self.rect
    }

    pub fn visible(&self) -> Option<PageRect> {
        self.visible
    }

    pub fn contains(&self, point: PagePoint) -> bool {
        self.visible.is_some_and(|visible| visible.contains(point))
    }

    pub fn to_local(&self, point: PagePoint) -> PixelPoint {
        self.rect.to_local(point)
    }
}

impl From<PageRect> for SurfaceBounds {
    fn from(rect: PageRect) -> Self {
        Self::new(rect)
    }
}

fn floor_to_i32(value: f64) -> i32 {
    let floored = value.floor();
    if floored.is_nan() {
        return 0;
    }
    floored.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_rect_contains_is_inclusive_on_every_edge() {
        let rect = PageRect::from_origin_size(10.0, 20.0, 100.0, 50.0);
        assert!(rect.contains(PagePoint::new(10.0, 20.0)));
        assert!(rect.contains(PagePoint::new(110.0, 70.0)));
        assert!(rect.contains(PagePoint::new(60.0, 45.0)));
        assert!(!rect.contains(PagePoint::new(9.9, 45.0)));
        assert!(!rect.contains(PagePoint::new(110.1, 45.0)));
        assert!(!rect.contains(PagePoint::new(60.0, 19.5)));
        assert!(!rect.contains(PagePoint::new(60.0, 70.5)));
    }

    #[test]
    fn to_local_floors_fractional_offsets() {
        let rect = PageRect::from_origin_size(10.5, 20.25, 100.0, 50.0);
        assert_eq!(rect.to_local(PagePoint::new(15.0, 30.0)), PixelPoint::new(4, 9));
        assert_eq!(rect.to_local(PagePoint::new(10.0, 20.0)), PixelPoint::new(-1, -1));
    }

    #[test]
    fn intersect_keeps_the_overlap_or_nothing() {
        let canvas = PageRect::from_origin_size(0.0, -260.0, 5120.0, 2880.0);
        let viewport = PageRect::new(0.0, 40.0, 1320.0, 820.0);
        assert_eq!(
            canvas.intersect(&viewport),
            Some(PageRect::new(0.0, 40.0, 1320.0, 820.0))
        );

        let beside = PageRect::new(1400.0, 40.0, 1500.0, 820.0);
        assert_eq!(viewport.intersect(&beside), None);

        let touching = PageRect::new(1320.0, 0.0, 1400.0, 40.0);
        assert_eq!(
            viewport.intersect(&touching),
            Some(PageRect::new(1320.0, 40.0, 1320.0, 40.0))
        );
    }

    #[test]
    fn clipped_surface_hits_only_the_visible_part_but_keeps_its_origin() {
        // Canvas scrolled 300px up under a toolbar ending at y = 40.
        let canvas = PageRect::from_origin_size(0.0, -260.0, 5120.0, 2880.0);
        let viewport = PageRect::new(0.0, 40.0, 1320.0, 820.0);
        let bounds = SurfaceBounds::new(canvas).clipped_to(&viewport);

        assert!(!bounds.contains(PagePoint::new(10.0, 20.0)));
        assert!(bounds.contains(PagePoint::new(10.0, 40.0)));
        assert!(!bounds.contains(PagePoint::new(1400.0, 400.0)));
        assert_eq!(bounds.to_local(PagePoint::new(10.5, 100.0)), PixelPoint::new(10, 360));

        let offscreen = SurfaceBounds::new(canvas).clipped_to(&PageRect::new(6000.0, 0.0, 6100.0, 10.0));
        assert_eq!(offscreen.visible(), None);
        assert!(!offscreen.contains(PagePoint::new(6050.0, 5.0)));
    }

    #[test]
    fn clamp_to_trims_rect_to_bounds() {
        let bounds = PixelSize::new(64, 48);
        assert_eq!(
            PixelRect::new(-5, -10, 20, 20).clamp_to(bounds),
            Some(PixelRect::new(0, 0, 15, 10))
        );
        assert_eq!(
            PixelRect::new(60, 40, 20, 20).clamp_to(bounds),
            Some(PixelRect::new(60, 40, 4, 8))
        );
        assert_eq!(PixelRect::new(64, 0, 4, 4).clamp_to(bounds), None);
    }
}

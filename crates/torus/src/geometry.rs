//! Geometry inputs for the interpolation runtime.
//!
//! The runtime never measures anything itself. A host-provided
//! [`GeometryProvider`] hands it pre-measured element bounds, and the
//! viewport/scroll state arrives with each signal frame. Measurements
//! are expected to be refreshed outside the tick path (on a settled
//! resize), so ticks can assume stable geometry.

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A measured element rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Pre-computed bounds for one element, including the extents the
/// self-centered pointer methods need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBounds {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    /// Distance from the document top, scroll-independent.
    pub offset_top: f64,
    pub offset_left: f64,
    pub center_x: f64,
    pub center_y: f64,
    /// Horizontal distance from the element center to the farther
    /// viewport edge.
    pub max_x_side: f64,
    pub max_y_side: f64,
    /// Distance from the element center to the farthest viewport
    /// corner.
    pub max_diagonal: f64,
}

impl ElementBounds {
    /// Derives bounds from a viewport-relative rectangle and the
    /// current scroll offset.
    pub fn from_rect(rect: Rect, viewport: Viewport, scroll: Point) -> Self {
        let center_x = rect.x + rect.width / 2.0;
        let center_y = rect.y + rect.height / 2.0;
        let max_x_side = (viewport.width - center_x).max(center_x);
        let max_y_side = (viewport.height - center_y).max(center_y);
        ElementBounds {
            width: rect.width,
            height: rect.height,
            top: rect.y,
            left: rect.x,
            right: rect.x + rect.width,
            bottom: rect.y + rect.height,
            offset_top: rect.y + scroll.y,
            offset_left: rect.x + scroll.x,
            center_x,
            center_y,
            max_x_side,
            max_y_side,
            max_diagonal: (max_x_side * max_x_side + max_y_side * max_y_side).sqrt(),
        }
    }
}

/// Supplies measured bounds for registered elements on demand.
///
/// Returning `None` means "not measured yet": the runtime skips the
/// element for that tick instead of snapping it to a default.
pub trait GeometryProvider {
    fn bounds(&self, element: crate::runtime::ElementId) -> Option<ElementBounds>;
}

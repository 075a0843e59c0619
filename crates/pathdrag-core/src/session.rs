//! State of one drag gesture, from press to release.

use crate::input::ListenerFamily;
use crate::shape::{Coordinates, ShapeId};
use crate::transform::ScreenTransform;
use kurbo::{Point, Vec2};

/// Everything a drag needs between pointer-down and pointer-up.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// The shape being dragged.
    pub shape_id: ShapeId,
    /// Deep copy of the coordinates at press time.
    snapshot: Coordinates,
    /// Accumulated screen transform, identity at press time.
    transform: ScreenTransform,
    /// Container point of the previous accepted move (press point at first).
    pub last_point: Point,
    /// Container point of the press.
    pub press_point: Point,
    /// Move/up events this session listens to.
    pub family: ListenerFamily,
    /// Whether map panning was enabled before the press.
    pub panning_was_enabled: bool,
}

impl DragSession {
    /// Create a new session at `press_point`.
    pub fn new(
        shape_id: ShapeId,
        snapshot: Coordinates,
        press_point: Point,
        family: ListenerFamily,
        panning_was_enabled: bool,
    ) -> Self {
        Self {
            shape_id,
            snapshot,
            transform: ScreenTransform::identity(),
            last_point: press_point,
            press_point,
            family,
            panning_was_enabled,
        }
    }

    /// The pre-drag coordinates.
    pub fn snapshot(&self) -> &Coordinates {
        &self.snapshot
    }

    pub fn transform(&self) -> &ScreenTransform {
        &self.transform
    }

    /// Delta from the previous accepted move to `point`.
    pub fn delta(&self, point: Point) -> Vec2 {
        point - self.last_point
    }

    /// Straight-line distance from the press to `point`.
    pub fn distance_from_press(&self, point: Point) -> f64 {
        (point - self.press_point).hypot()
    }

    /// Accumulate an accepted move ending at `point`.
    pub fn advance(&mut self, point: Point) -> Vec2 {
        let delta = self.delta(point);
        self.transform.translate_by(delta);
        self.last_point = point;
        delta
    }
}

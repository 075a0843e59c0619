//! Pointer input as seen by the drag engine.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

/// Which move/up events a drag listens to after the press.
///
/// Touch and pen presses (and mouse events synthesized from touches) are
/// followed by touch moves; real mouse presses by mouse moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListenerFamily {
    Mouse,
    Touch,
}

/// A single pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// Position in client coordinates.
    pub position: Point,
    /// Producing device.
    pub kind: PointerKind,
    /// Mouse event synthesized by the platform from a touch.
    #[serde(default)]
    pub simulated: bool,
}

impl PointerInput {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            kind: PointerKind::Mouse,
            simulated: false,
        }
    }

    pub fn touch(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            kind: PointerKind::Touch,
            simulated: false,
        }
    }

    pub fn pen(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            kind: PointerKind::Pen,
            simulated: false,
        }
    }

    /// Mark as synthesized from a touch.
    pub fn simulated(mut self) -> Self {
        self.simulated = true;
        self
    }

    pub fn family(&self) -> ListenerFamily {
        if self.kind == PointerKind::Mouse && !self.simulated {
            ListenerFamily::Mouse
        } else {
            ListenerFamily::Touch
        }
    }

    /// Touch-like input needs the tap tolerance before a drag starts.
    pub fn is_touch(&self) -> bool {
        self.family() == ListenerFamily::Touch
    }
}

/// Whether the host should keep dispatching an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// The engine consumed the event: stop propagation and default action.
    Stop,
    /// The engine ignored the event.
    Continue,
}

impl Propagation {
    pub fn is_stopped(self) -> bool {
        self == Propagation::Stop
    }
}

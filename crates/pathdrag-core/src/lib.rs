//! PathDrag Core Library
//!
//! Drag interaction engine for vector shapes on a projected map. A drag is
//! previewed as a screen-space translation and committed once, on release,
//! by reprojecting the pre-drag coordinates.

pub mod backend;
pub mod drag;
pub mod error;
pub mod geo;
pub mod input;
pub mod map;
pub mod options;
pub mod plugin;
pub mod proxy;
pub mod reproject;
pub mod session;
pub mod shape;
pub mod transform;

pub use backend::{PathElement, RenderBackend, TRANSFORM_ATTRIBUTE};
pub use drag::{DragEvent, DragPhase, PathDrag};
pub use error::{ConfigError, ConfigResult, DragError, DragResult};
pub use geo::{Crs, LatLng, LatLngBounds, Projection, Transformation};
pub use input::{ListenerFamily, PointerInput, PointerKind, Propagation};
pub use map::{MapView, Viewport};
pub use options::DragOptions;
pub use plugin::PathDragPlugin;
pub use proxy::{Accessor, CoordinateProxy};
pub use reproject::{ProjectionContext, commit, reproject};
pub use session::DragSession;
pub use shape::{Coordinates, HitTest, Path, PathKind, PathOptions, ScreenGeometry, ShapeId};
pub use transform::ScreenTransform;

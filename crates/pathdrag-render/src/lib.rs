//! PathDrag Render Library
//!
//! Render backends for drag previews. The vector backend moves one
//! element per shape with a transform attribute; the raster backend
//! repaints a shared bitmap from an off-screen buffer.

pub mod raster;
pub mod vector;

pub use raster::{
    BitmapCanvas, MAX_SURFACE_SIDE, RasterBackend, RasterSurface, RenderError, RenderResult,
    default_color,
};
pub use vector::{SvgElement, VectorBackend, path_data};

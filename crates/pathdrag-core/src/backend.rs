//! Render backend capability used to preview a drag.
//!
//! A backend previews the screen transform of a dragged shape without
//! touching its geometry, and clears the preview once the geometry is
//! committed. Backends that keep one visual element per shape get both
//! operations for free through [`RenderBackend::element_mut`]; backends
//! without per-shape elements (bitmaps) override them.

use crate::error::{DragError, DragResult};
use crate::shape::{Path, ShapeId};
use crate::transform::svg_matrix;

/// Name of the transform attribute written on path elements.
pub const TRANSFORM_ATTRIBUTE: &str = "transform";

/// A per-shape visual element with attributes and classes.
pub trait PathElement {
    fn attribute(&self, name: &str) -> Option<&str>;
    fn set_attribute(&mut self, name: &str, value: String);
    fn remove_attribute(&mut self, name: &str);
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
    fn has_class(&self, class: &str) -> bool;
}

/// A rendering surface able to preview drag transforms.
pub trait RenderBackend {
    /// Visual element of a shape, for backends that keep one.
    fn element_mut(&mut self, _id: ShapeId) -> Option<&mut dyn PathElement> {
        None
    }

    /// Add a class to the backend's container.
    fn add_container_class(&mut self, _class: &str) {}

    /// Redraw a shape from its cached screen geometry.
    fn update_path(&mut self, shape: &Path);

    /// Preview `matrix` (`[a, b, c, d, tx, ty]`) on the shape.
    fn transform_path(&mut self, shape: Option<&mut Path>, matrix: &[f64]) {
        fallback_transform_path(self, shape, matrix);
    }

    /// Clear any previewed transform.
    fn reset_transform_path(&mut self, shape: Option<&mut Path>) {
        fallback_reset_transform_path(self, shape);
    }
}

/// Check that `matrix` has exactly six coefficients.
pub fn validate_matrix(matrix: &[f64]) -> DragResult<[f64; 6]> {
    <[f64; 6]>::try_from(matrix).map_err(|_| DragError::MalformedMatrix(matrix.len()))
}

/// Write the transform attribute straight onto the shape's element.
///
/// Used by backends that provide no transform of their own.
pub fn fallback_transform_path<B: RenderBackend + ?Sized>(
    backend: &mut B,
    shape: Option<&mut Path>,
    matrix: &[f64],
) {
    let Some(shape) = shape else {
        log::warn!("transform_path: {}", DragError::MissingShape);
        return;
    };
    let matrix = match validate_matrix(matrix) {
        Ok(matrix) => matrix,
        Err(e) => {
            log::warn!("transform_path: {}", e);
            return;
        }
    };
    if let Some(element) = backend.element_mut(shape.id()) {
        element.set_attribute(TRANSFORM_ATTRIBUTE, svg_matrix(&matrix));
    }
}

/// Remove the transform attribute from the shape's element.
pub fn fallback_reset_transform_path<B: RenderBackend + ?Sized>(
    backend: &mut B,
    shape: Option<&mut Path>,
) {
    let Some(shape) = shape else {
        return;
    };
    if let Some(element) = backend.element_mut(shape.id()) {
        element.remove_attribute(TRANSFORM_ATTRIBUTE);
    }
}

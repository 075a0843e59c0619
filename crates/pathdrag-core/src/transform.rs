//! Screen-space transform accumulated during a drag.

use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};

/// Affine matrix `[a, b, c, d, tx, ty]` previewing a drag in screen space.
///
/// Only the translation part ever changes; the linear part stays identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenTransform {
    affine: Affine,
}

impl Default for ScreenTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ScreenTransform {
    pub fn identity() -> Self {
        Self {
            affine: Affine::IDENTITY,
        }
    }

    /// Build a pure translation.
    pub fn from_translation(translation: Vec2) -> Self {
        Self {
            affine: Affine::translate(translation),
        }
    }

    /// Add `delta` to the translation.
    pub fn translate_by(&mut self, delta: Vec2) {
        self.affine = self.affine.then_translate(delta);
    }

    pub fn translation(&self) -> Vec2 {
        self.affine.translation()
    }

    pub fn is_identity(&self) -> bool {
        self.affine == Affine::IDENTITY
    }

    pub fn affine(&self) -> Affine {
        self.affine
    }

    /// The six matrix coefficients in `[a, b, c, d, tx, ty]` order.
    pub fn coefficients(&self) -> [f64; 6] {
        self.affine.as_coeffs()
    }

    /// Render as an SVG `transform` attribute value.
    pub fn to_svg_matrix(&self) -> String {
        svg_matrix(&self.coefficients())
    }
}

/// Format six coefficients as `matrix(a b c d tx ty)`.
pub fn svg_matrix(coefficients: &[f64]) -> String {
    let parts: Vec<String> = coefficients.iter().map(|c| c.to_string()).collect();
    format!("matrix({})", parts.join(" "))
}

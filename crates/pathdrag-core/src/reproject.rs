//! Reprojection of a screen-space translation into geographic coordinates.
//!
//! The translation is first turned into an offset in projected units at the
//! current zoom, as the difference between untransforming the translated
//! origin and the origin itself. Every position of the original snapshot is
//! then projected, shifted by that offset and unprojected. The snapshot is
//! never modified, so the result depends only on the snapshot and the
//! accumulated transform, never on intermediate frames.

use crate::geo::{Crs, LatLng};
use crate::map::MapView;
use crate::shape::{Coordinates, Path};
use crate::transform::ScreenTransform;
use kurbo::{Point, Vec2};

/// CRS and zoom a translation is measured against.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    crs: &'a Crs,
    zoom: f64,
}

impl<'a> ProjectionContext<'a> {
    pub fn new(crs: &'a Crs, zoom: f64) -> Self {
        Self { crs, zoom }
    }

    /// Use the map's current CRS and zoom.
    pub fn from_map(map: &'a dyn MapView) -> Self {
        Self::new(map.crs(), map.zoom())
    }

    /// Offset in projected units matching a pixel translation.
    pub fn projected_offset(&self, translation: Vec2) -> Vec2 {
        let scale = self.crs.scale(self.zoom);
        let transformation = &self.crs.transformation;
        transformation.untransform(translation.to_point(), scale)
            - transformation.untransform(Point::ZERO, scale)
    }

    /// Shift a geographic position by an offset in projected units.
    pub fn shift(&self, latlng: LatLng, offset: Vec2) -> LatLng {
        let projection = &self.crs.projection;
        projection.unproject(projection.project(latlng) + offset)
    }
}

/// Compute the coordinates `snapshot` would have after `transform`.
///
/// Returns a fresh structure; `snapshot` is only read.
pub fn reproject(
    snapshot: &Coordinates,
    transform: &ScreenTransform,
    ctx: &ProjectionContext<'_>,
) -> Coordinates {
    let offset = ctx.projected_offset(transform.translation());
    snapshot.map(&mut |latlng| ctx.shift(latlng, offset))
}

/// Reproject `snapshot` and store the result as the shape's geometry.
///
/// The cached screen geometry is shifted by the same translation and the
/// bounds are rebuilt over every new position.
pub fn commit(
    shape: &mut Path,
    snapshot: &Coordinates,
    transform: &ScreenTransform,
    ctx: &ProjectionContext<'_>,
) {
    let coordinates = reproject(snapshot, transform, ctx);
    let bounds = coordinates.bounds();
    log::debug!(
        "committing {} positions of shape {} with translation {:?}",
        coordinates.len(),
        shape.id(),
        transform.translation()
    );
    shape.apply_commit(coordinates, bounds, transform.translation());
}

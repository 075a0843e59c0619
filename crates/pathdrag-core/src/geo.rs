//! Geographic coordinates and coordinate reference systems.
//!
//! A [`Crs`] turns a [`LatLng`] into a pixel position at a given zoom in two
//! steps: the [`Projection`] maps it onto a flat plane in projected units,
//! then the [`Transformation`] scales and offsets that plane into pixels.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Earth radius used by spherical mercator, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of spherical mercator (the square world).
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_6;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check whether two positions are equal within `epsilon` degrees.
    pub fn approx_eq(&self, other: LatLng, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon && (self.lng - other.lng).abs() <= epsilon
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// Geographic bounding box. Empty until the first position is added.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLngBounds {
    south_west: Option<LatLng>,
    north_east: Option<LatLng>,
}

impl LatLngBounds {
    /// Create empty bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the bounds to include `latlng`.
    pub fn extend(&mut self, latlng: LatLng) {
        match (self.south_west.as_mut(), self.north_east.as_mut()) {
            (Some(sw), Some(ne)) => {
                sw.lat = sw.lat.min(latlng.lat);
                sw.lng = sw.lng.min(latlng.lng);
                ne.lat = ne.lat.max(latlng.lat);
                ne.lng = ne.lng.max(latlng.lng);
            }
            _ => {
                self.south_west = Some(latlng);
                self.north_east = Some(latlng);
            }
        }
    }

    pub fn south_west(&self) -> Option<LatLng> {
        self.south_west
    }

    pub fn north_east(&self) -> Option<LatLng> {
        self.north_east
    }

    pub fn is_valid(&self) -> bool {
        self.south_west.is_some() && self.north_east.is_some()
    }

    /// Check if `latlng` lies inside (or on the edge of) the bounds.
    pub fn contains(&self, latlng: LatLng) -> bool {
        match (self.south_west, self.north_east) {
            (Some(sw), Some(ne)) => {
                latlng.lat >= sw.lat
                    && latlng.lat <= ne.lat
                    && latlng.lng >= sw.lng
                    && latlng.lng <= ne.lng
            }
            _ => false,
        }
    }
}

/// Map projection from geographic to projected plane coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Projection {
    /// Web mercator on a sphere, in meters.
    #[default]
    SphericalMercator,
    /// Plate carrée: longitude on x, latitude on y, in degrees.
    LonLat,
}

impl Projection {
    /// Project a geographic position onto the plane.
    pub fn project(&self, latlng: LatLng) -> Point {
        match self {
            Projection::SphericalMercator => {
                let d = PI / 180.0;
                let lat = latlng.lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
                let sin = (lat * d).sin();
                Point::new(
                    EARTH_RADIUS * latlng.lng * d,
                    EARTH_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
                )
            }
            Projection::LonLat => Point::new(latlng.lng, latlng.lat),
        }
    }

    /// Inverse of [`Projection::project`].
    pub fn unproject(&self, point: Point) -> LatLng {
        match self {
            Projection::SphericalMercator => {
                let d = 180.0 / PI;
                LatLng::new(
                    (2.0 * (point.y / EARTH_RADIUS).exp().atan() - PI / 2.0) * d,
                    point.x * d / EARTH_RADIUS,
                )
            }
            Projection::LonLat => LatLng::new(point.y, point.x),
        }
    }
}

/// Affine mapping `(a * x + b, c * y + d)` from projected units to pixels,
/// multiplied by the zoom scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Transformation {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn transform(&self, point: Point, scale: f64) -> Point {
        Point::new(
            scale * (self.a * point.x + self.b),
            scale * (self.c * point.y + self.d),
        )
    }

    pub fn untransform(&self, point: Point, scale: f64) -> Point {
        Point::new(
            (point.x / scale - self.b) / self.a,
            (point.y / scale - self.d) / self.c,
        )
    }
}

/// Coordinate reference system: a projection, a pixel transformation and a
/// zoom-dependent scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    pub projection: Projection,
    pub transformation: Transformation,
    /// Pixel size of the whole world at zoom 0.
    pub base_scale: f64,
}

impl Default for Crs {
    fn default() -> Self {
        Self::epsg3857()
    }
}

impl Crs {
    /// Spherical mercator with 256px tiles.
    pub fn epsg3857() -> Self {
        let scale = 0.5 / (PI * EARTH_RADIUS);
        Self {
            projection: Projection::SphericalMercator,
            transformation: Transformation::new(scale, 0.5, -scale, 0.5),
            base_scale: 256.0,
        }
    }

    /// Equirectangular projection with 256px tiles.
    pub fn epsg4326() -> Self {
        Self {
            projection: Projection::LonLat,
            transformation: Transformation::new(1.0 / 180.0, 1.0, -1.0 / 180.0, 0.5),
            base_scale: 256.0,
        }
    }

    /// Flat plane where one unit is one pixel at zoom 0.
    pub fn simple() -> Self {
        Self {
            projection: Projection::LonLat,
            transformation: Transformation::new(1.0, 0.0, -1.0, 0.0),
            base_scale: 1.0,
        }
    }

    /// Pixel scale factor at `zoom`.
    pub fn scale(&self, zoom: f64) -> f64 {
        self.base_scale * 2f64.powf(zoom)
    }

    /// Project a geographic position to absolute pixel coordinates.
    pub fn latlng_to_point(&self, latlng: LatLng, zoom: f64) -> Point {
        let projected = self.projection.project(latlng);
        self.transformation.transform(projected, self.scale(zoom))
    }

    /// Inverse of [`Crs::latlng_to_point`].
    pub fn point_to_latlng(&self, point: Point, zoom: f64) -> LatLng {
        let projected = self.transformation.untransform(point, self.scale(zoom));
        self.projection.unproject(projected)
    }
}

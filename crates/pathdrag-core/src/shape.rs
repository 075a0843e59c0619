//! Draggable path shapes and their geometry.

use crate::geo::{LatLng, LatLngBounds};
use crate::map::MapView;
use kurbo::{BezPath, Line, ParamCurveNearest, Point, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Default radius of point shapes in pixels.
pub const DEFAULT_MARKER_RADIUS: f64 = 10.0;

/// Kind of path geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathKind {
    /// A single position drawn as a circle.
    Marker,
    /// Open line strings.
    Polyline,
    /// Closed rings, filled.
    Polygon,
}

/// Per-shape configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathOptions {
    /// Whether the shape gets a drag controller attached at creation.
    #[serde(default)]
    pub draggable: bool,
    /// Whether the shape receives pointer events.
    #[serde(default = "default_interactive")]
    pub interactive: bool,
    /// Space separated class list applied to the shape's visual element.
    #[serde(default)]
    pub class_name: String,
    /// Stroke width in pixels.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Radius in pixels, used by markers only.
    #[serde(default = "default_radius")]
    pub radius: f64,
}

fn default_interactive() -> bool {
    true
}

fn default_weight() -> f64 {
    3.0
}

fn default_radius() -> f64 {
    DEFAULT_MARKER_RADIUS
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            draggable: false,
            interactive: default_interactive(),
            class_name: String::new(),
            weight: default_weight(),
            radius: default_radius(),
        }
    }
}

impl PathOptions {
    /// Append `class` to the class list unless already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        if !self.class_name.is_empty() {
            self.class_name.push(' ');
        }
        self.class_name.push_str(class);
    }

    /// Remove every occurrence of `class` from the class list.
    pub fn remove_class(&mut self, class: &str) {
        self.class_name = self
            .class_name
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_name.split_whitespace().any(|c| c == class)
    }
}

/// Geographic coordinates of a shape, possibly nested for multi-part
/// geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    Point(LatLng),
    Ring(Vec<LatLng>),
    Nested(Vec<Coordinates>),
}

impl Coordinates {
    /// Build a new structure of the same shape with `f` applied to every
    /// position. The receiver is left untouched.
    pub fn map(&self, f: &mut impl FnMut(LatLng) -> LatLng) -> Coordinates {
        match self {
            Coordinates::Point(latlng) => Coordinates::Point(f(*latlng)),
            Coordinates::Ring(ring) => Coordinates::Ring(ring.iter().map(|ll| f(*ll)).collect()),
            Coordinates::Nested(parts) => {
                Coordinates::Nested(parts.iter().map(|part| part.map(f)).collect())
            }
        }
    }

    /// Visit every position in order.
    pub fn for_each(&self, f: &mut impl FnMut(LatLng)) {
        match self {
            Coordinates::Point(latlng) => f(*latlng),
            Coordinates::Ring(ring) => ring.iter().for_each(|ll| f(*ll)),
            Coordinates::Nested(parts) => parts.iter().for_each(|part| part.for_each(f)),
        }
    }

    /// Flatten into rings. A point yields one single-position ring.
    pub fn rings(&self) -> Vec<&[LatLng]> {
        match self {
            Coordinates::Point(latlng) => vec![std::slice::from_ref(latlng)],
            Coordinates::Ring(ring) => vec![ring.as_slice()],
            Coordinates::Nested(parts) => parts.iter().flat_map(|part| part.rings()).collect(),
        }
    }

    /// Total number of positions.
    pub fn len(&self) -> usize {
        let mut count = 0;
        self.for_each(&mut |_| count += 1);
        count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounds covering every position.
    pub fn bounds(&self) -> LatLngBounds {
        let mut bounds = LatLngBounds::new();
        self.for_each(&mut |ll| bounds.extend(ll));
        bounds
    }

    /// Structural comparison with a per-component tolerance in degrees.
    pub fn approx_eq(&self, other: &Coordinates, epsilon: f64) -> bool {
        match (self, other) {
            (Coordinates::Point(a), Coordinates::Point(b)) => a.approx_eq(*b, epsilon),
            (Coordinates::Ring(a), Coordinates::Ring(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.approx_eq(*y, epsilon))
            }
            (Coordinates::Nested(a), Coordinates::Nested(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.approx_eq(y, epsilon))
            }
            _ => false,
        }
    }
}

/// Cached layer-pixel geometry of a shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScreenGeometry {
    /// Not projected yet.
    #[default]
    Empty,
    Point(Point),
    Rings(Vec<Vec<Point>>),
}

impl ScreenGeometry {
    /// Shift every pixel position by `offset`.
    pub fn translate(&mut self, offset: Vec2) {
        match self {
            ScreenGeometry::Empty => {}
            ScreenGeometry::Point(p) => *p += offset,
            ScreenGeometry::Rings(rings) => {
                for p in rings.iter_mut().flatten() {
                    *p += offset;
                }
            }
        }
    }

    /// Build a path outline, closing rings when `closed`.
    pub fn to_bez_path(&self, closed: bool) -> BezPath {
        let mut path = BezPath::new();
        if let ScreenGeometry::Rings(rings) = self {
            for ring in rings {
                let mut points = ring.iter();
                let Some(first) = points.next() else {
                    continue;
                };
                path.move_to(*first);
                for p in points {
                    path.line_to(*p);
                }
                if closed {
                    path.close_path();
                }
            }
        }
        path
    }
}

/// Hit-test behaviour of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitTest {
    /// Test against the cached screen geometry.
    #[default]
    Geometry,
    /// Every point hits (screen geometry is stale).
    Always,
    /// No point hits.
    Never,
}

/// A draggable vector shape on the map.
#[derive(Debug, Clone)]
pub struct Path {
    id: ShapeId,
    kind: PathKind,
    coordinates: Coordinates,
    /// Configuration.
    pub options: PathOptions,
    screen: ScreenGeometry,
    bounds: LatLngBounds,
    hit_test: HitTest,
}

impl Path {
    /// Create a shape of `kind` from raw coordinates.
    pub fn new(kind: PathKind, coordinates: Coordinates) -> Self {
        let bounds = coordinates.bounds();
        Self {
            id: Uuid::new_v4(),
            kind,
            coordinates,
            options: PathOptions::default(),
            screen: ScreenGeometry::Empty,
            bounds,
            hit_test: HitTest::Geometry,
        }
    }

    /// Create a point shape.
    pub fn marker(latlng: LatLng) -> Self {
        Self::new(PathKind::Marker, Coordinates::Point(latlng))
    }

    /// Create an open line.
    pub fn polyline(latlngs: Vec<LatLng>) -> Self {
        Self::new(PathKind::Polyline, Coordinates::Ring(latlngs))
    }

    /// Create a polygon from an outer ring followed by optional holes.
    pub fn polygon(mut rings: Vec<Vec<LatLng>>) -> Self {
        let coordinates = if rings.len() == 1 {
            Coordinates::Ring(rings.remove(0))
        } else {
            Coordinates::Nested(rings.into_iter().map(Coordinates::Ring).collect())
        };
        Self::new(PathKind::Polygon, coordinates)
    }

    /// Set options (builder style).
    pub fn with_options(mut self, options: PathOptions) -> Self {
        self.options = options;
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    /// The committed coordinates.
    ///
    /// While a drag is in flight this is still the pre-drag position; ask
    /// the drag controller for the live preview.
    pub fn lat_lngs(&self) -> &Coordinates {
        &self.coordinates
    }

    /// Replace the coordinates. Call [`Path::project`] afterwards to refresh
    /// the screen geometry.
    pub fn set_lat_lngs(&mut self, coordinates: Coordinates) {
        self.bounds = coordinates.bounds();
        self.coordinates = coordinates;
    }

    /// Mutable access for hosts editing vertices in place.
    pub fn lat_lngs_mut(&mut self) -> &mut Coordinates {
        &mut self.coordinates
    }

    pub fn bounds(&self) -> LatLngBounds {
        self.bounds
    }

    pub fn screen(&self) -> &ScreenGeometry {
        &self.screen
    }

    /// Recompute the cached layer-pixel geometry and bounds from the
    /// committed coordinates.
    pub fn project(&mut self, map: &dyn MapView) {
        self.bounds = self.coordinates.bounds();
        self.screen = match &self.coordinates {
            Coordinates::Point(latlng) => ScreenGeometry::Point(map.latlng_to_layer_point(*latlng)),
            coordinates => ScreenGeometry::Rings(
                coordinates
                    .rings()
                    .into_iter()
                    .map(|ring| ring.iter().map(|ll| map.latlng_to_layer_point(*ll)).collect())
                    .collect(),
            ),
        };
    }

    /// Store committed geometry produced by reprojection.
    pub(crate) fn apply_commit(
        &mut self,
        coordinates: Coordinates,
        bounds: LatLngBounds,
        pixel_offset: Vec2,
    ) {
        self.coordinates = coordinates;
        self.bounds = bounds;
        self.screen.translate(pixel_offset);
    }

    pub fn hit_test(&self) -> HitTest {
        self.hit_test
    }

    pub fn set_hit_test(&mut self, hit_test: HitTest) {
        self.hit_test = hit_test;
    }

    /// Check whether a layer-pixel point hits the shape.
    pub fn contains_point(&self, point: Point) -> bool {
        match self.hit_test {
            HitTest::Always => return true,
            HitTest::Never => return false,
            HitTest::Geometry => {}
        }

        match &self.screen {
            ScreenGeometry::Empty => false,
            ScreenGeometry::Point(center) => {
                (point - *center).hypot() <= self.options.radius + self.options.weight / 2.0
            }
            ScreenGeometry::Rings(rings) => {
                if self.kind == PathKind::Polygon
                    && self.screen.to_bez_path(true).winding(point) % 2 != 0
                {
                    return true;
                }
                let half_width = self.options.weight / 2.0;
                let closed = self.kind == PathKind::Polygon;
                rings.iter().any(|ring| {
                    ring_segments(ring, closed).any(|segment| {
                        segment.nearest(point, 1e-9).distance_sq <= half_width * half_width
                    })
                })
            }
        }
    }
}

fn ring_segments(ring: &[Point], closed: bool) -> impl Iterator<Item = Line> + '_ {
    let closing = if closed && ring.len() > 2 {
        Some(Line::new(ring[ring.len() - 1], ring[0]))
    } else {
        None
    };
    ring.windows(2)
        .map(|pair| Line::new(pair[0], pair[1]))
        .chain(closing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rings() -> Coordinates {
        Coordinates::Nested(vec![
            Coordinates::Ring(vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0)]),
            Coordinates::Nested(vec![Coordinates::Ring(vec![LatLng::new(2.0, 2.0)])]),
        ])
    }

    #[test]
    fn test_coordinates_map_is_deep_copy() {
        let original = sample_rings();
        let shifted = original.map(&mut |ll| LatLng::new(ll.lat + 1.0, ll.lng));
        assert_eq!(original, sample_rings());
        assert!(shifted.approx_eq(
            &Coordinates::Nested(vec![
                Coordinates::Ring(vec![LatLng::new(1.0, 0.0), LatLng::new(1.0, 1.0)]),
                Coordinates::Nested(vec![Coordinates::Ring(vec![LatLng::new(3.0, 2.0)])]),
            ]),
            1e-12
        ));
    }

    #[test]
    fn test_coordinates_rings_flatten() {
        let coords = sample_rings();
        let rings = coords.rings();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].len(), 2);
        assert_eq!(rings[1], &[LatLng::new(2.0, 2.0)]);
        assert_eq!(coords.len(), 3);
    }

    #[test]
    fn test_coordinates_json_shape() {
        let coords: Coordinates =
            serde_json::from_str(r#"[{"lat":0.0,"lng":0.0},{"lat":1.0,"lng":1.0}]"#).unwrap();
        assert!(matches!(coords, Coordinates::Ring(ref r) if r.len() == 2));
    }

    #[test]
    fn test_polygon_single_ring_is_flat() {
        let path = Path::polygon(vec![vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)]]);
        assert!(matches!(path.lat_lngs(), Coordinates::Ring(_)));
        let holed = Path::polygon(vec![vec![LatLng::new(0.0, 0.0)], vec![LatLng::new(1.0, 1.0)]]);
        assert!(matches!(holed.lat_lngs(), Coordinates::Nested(p) if p.len() == 2));
    }

    #[test]
    fn test_class_list() {
        let mut options = PathOptions::default();
        options.add_class("a");
        options.add_class("draggable");
        options.add_class("draggable");
        assert_eq!(options.class_name, "a draggable");
        options.remove_class("draggable");
        assert_eq!(options.class_name, "a");
        assert!(!options.has_class("draggable"));
    }

    #[test]
    fn test_screen_translate() {
        let mut screen = ScreenGeometry::Rings(vec![vec![Point::new(1.0, 2.0)]]);
        screen.translate(Vec2::new(10.0, 20.0));
        assert_eq!(screen, ScreenGeometry::Rings(vec![vec![Point::new(11.0, 22.0)]]));
    }

    #[test]
    fn test_hit_test_overrides() {
        let mut path = Path::marker(LatLng::new(0.0, 0.0));
        assert!(!path.contains_point(Point::ZERO));
        path.set_hit_test(HitTest::Always);
        assert!(path.contains_point(Point::new(1e6, 1e6)));
        path.set_hit_test(HitTest::Never);
        assert!(!path.contains_point(Point::ZERO));
    }

    #[test]
    fn test_polygon_contains_interior() {
        let mut path = Path::polygon(vec![vec![LatLng::new(0.0, 0.0)]]);
        path.screen = ScreenGeometry::Rings(vec![vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ]]);
        assert!(path.contains_point(Point::new(50.0, 50.0)));
        assert!(path.contains_point(Point::new(101.0, 50.0)));
        assert!(!path.contains_point(Point::new(150.0, 50.0)));
    }

    #[test]
    fn test_polyline_hit_uses_stroke_width() {
        let mut path = Path::polyline(vec![LatLng::new(0.0, 0.0)]);
        path.screen = ScreenGeometry::Rings(vec![vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]]);
        assert!(path.contains_point(Point::new(50.0, 1.0)));
        assert!(!path.contains_point(Point::new(50.0, 10.0)));
    }
}

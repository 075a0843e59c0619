//! Host map capabilities and a headless viewport implementing them.

use crate::geo::{Crs, LatLng};
use crate::shape::ShapeId;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// What the drag engine needs from the map hosting a shape.
///
/// Coordinate spaces: *client* points come straight from pointer events,
/// *container* points are relative to the map's top-left corner, *layer*
/// points are relative to the origin the shapes were projected against.
pub trait MapView {
    /// Coordinate reference system in use.
    fn crs(&self) -> &Crs;

    /// Current zoom level.
    fn zoom(&self) -> f64;

    /// Absolute pixel position of the layer origin at the current zoom.
    fn pixel_origin(&self) -> Point;

    /// Convert a client-space pointer position to container space.
    fn container_point(&self, client: Point) -> Point;

    /// Whether the map pans on drag.
    fn panning_enabled(&self) -> bool;

    /// Enable or disable map panning.
    fn set_panning_enabled(&mut self, enabled: bool);

    /// Flag the map's own pan gesture as moved so it suppresses its click.
    fn mark_pan_moved(&mut self) {}

    /// Move a shape to the top of the draw order.
    fn bring_to_front(&mut self, id: ShapeId);

    /// Close the popup bound to a shape, if any.
    fn close_popup(&mut self, id: ShapeId);

    /// Ask for a callback on the next render frame.
    fn request_frame(&mut self);

    /// Project a geographic position into layer pixels.
    fn latlng_to_layer_point(&self, latlng: LatLng) -> Point {
        let absolute = self.crs().latlng_to_point(latlng, self.zoom());
        (absolute - self.pixel_origin()).to_point()
    }

    /// Inverse of [`MapView::latlng_to_layer_point`].
    fn layer_point_to_latlng(&self, point: Point) -> LatLng {
        let absolute = point + self.pixel_origin().to_vec2();
        self.crs().point_to_latlng(absolute, self.zoom())
    }
}

/// Headless map viewport.
///
/// Keeps the pan offset of the map pane, panning lock, draw order, open
/// popups and pending frame requests in memory. Used by the demo shell and
/// tests, and a reasonable base for hosts without their own map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub crs: Crs,
    zoom: f64,
    /// Container size in pixels.
    pub size: Size,
    /// Client-space position of the container's top-left corner.
    pub container_origin: Point,
    /// Offset of the layer pane inside the container (pan).
    pub pan_offset: Vec2,
    pixel_origin: Point,
    panning_enabled: bool,
    pan_moved: bool,
    /// Shape ids back to front.
    z_order: Vec<ShapeId>,
    open_popups: Vec<ShapeId>,
    frame_requested: bool,
}

impl Viewport {
    /// Create a viewport of `size` centered on `center`.
    pub fn new(crs: Crs, center: LatLng, zoom: f64, size: Size) -> Self {
        let mut viewport = Self {
            crs,
            zoom,
            size,
            container_origin: Point::ZERO,
            pan_offset: Vec2::ZERO,
            pixel_origin: Point::ZERO,
            panning_enabled: true,
            pan_moved: false,
            z_order: Vec::new(),
            open_popups: Vec::new(),
            frame_requested: false,
        };
        viewport.set_view(center, zoom);
        viewport
    }

    /// Re-center on `center` at `zoom`. Shapes must be re-projected.
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.zoom = zoom;
        self.pan_offset = Vec2::ZERO;
        let half = Vec2::new(self.size.width / 2.0, self.size.height / 2.0);
        self.pixel_origin = self.crs.latlng_to_point(center, zoom) - half;
    }

    /// Pan the layer pane by a delta in container pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.pan_offset += delta;
    }

    /// Convert a container point to layer space.
    pub fn container_to_layer(&self, container: Point) -> Point {
        container - self.pan_offset
    }

    /// Convert a layer point to container space.
    pub fn layer_to_container(&self, layer: Point) -> Point {
        layer + self.pan_offset
    }

    /// Geographic position under a container point.
    pub fn container_point_to_latlng(&self, container: Point) -> LatLng {
        self.layer_point_to_latlng(self.container_to_layer(container))
    }

    /// Register a shape in the draw order (on top).
    pub fn add_shape(&mut self, id: ShapeId) {
        if !self.z_order.contains(&id) {
            self.z_order.push(id);
        }
    }

    /// Shape ids back to front.
    pub fn z_order(&self) -> &[ShapeId] {
        &self.z_order
    }

    pub fn open_popup(&mut self, id: ShapeId) {
        if !self.open_popups.contains(&id) {
            self.open_popups.push(id);
        }
    }

    pub fn is_popup_open(&self, id: ShapeId) -> bool {
        self.open_popups.contains(&id)
    }

    pub fn pan_moved(&self) -> bool {
        self.pan_moved
    }

    /// Consume the pan gesture moved flag (at the end of a map click cycle).
    pub fn reset_pan_moved(&mut self) {
        self.pan_moved = false;
    }

    /// Consume a pending frame request.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }
}

impl MapView for Viewport {
    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn pixel_origin(&self) -> Point {
        self.pixel_origin
    }

    fn container_point(&self, client: Point) -> Point {
        (client - self.container_origin).to_point()
    }

    fn panning_enabled(&self) -> bool {
        self.panning_enabled
    }

    fn set_panning_enabled(&mut self, enabled: bool) {
        self.panning_enabled = enabled;
    }

    fn mark_pan_moved(&mut self) {
        self.pan_moved = true;
    }

    fn bring_to_front(&mut self, id: ShapeId) {
        self.z_order.retain(|&shape_id| shape_id != id);
        self.z_order.push(id);
    }

    fn close_popup(&mut self, id: ShapeId) {
        self.open_popups.retain(|&shape_id| shape_id != id);
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }
}

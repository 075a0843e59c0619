//! Raster backend: every shape painted onto one shared bitmap.
//!
//! A shared bitmap cannot move a single shape, so the first preview of a
//! drag paints everything except the dragged shape into an off-screen
//! buffer. Each preview then clears the surface, blits the buffer and
//! paints the dragged shape with the drag transform on top.

use image::{Rgba, RgbaImage};
use kurbo::{Affine, Point, Size};
use pathdrag_core::backend::{RenderBackend, validate_matrix};
use pathdrag_core::shape::{HitTest, Path, PathKind, ScreenGeometry, ShapeId};
use std::collections::HashMap;
use thiserror::Error;
use tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Stroke,
    Transform,
};

/// Raster errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("Invalid pixel ratio: {0}")]
    InvalidPixelRatio(f64),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for raster operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Largest surface side in device pixels.
pub const MAX_SURFACE_SIDE: u32 = 16_384;

/// Default color for painted shapes.
pub fn default_color() -> Color {
    Color::from_rgba8(51, 136, 255, 255)
}

/// Drawing surface shared by every shape of a raster renderer.
pub trait RasterSurface {
    /// Size in layer pixels.
    fn size(&self) -> Size;

    /// Device pixels per layer pixel.
    fn pixel_ratio(&self) -> f64;

    /// Copy of the current device pixels.
    fn snapshot(&self) -> Pixmap;

    /// Add a shape to the paint list, on top.
    fn init_path(&mut self, shape: &Path);

    /// Take a shape out of the paint list.
    fn remove_path(&mut self, id: ShapeId);

    /// Refresh a shape's geometry and repaint.
    fn update_path(&mut self, shape: &Path);

    /// Repaint every shape in the paint list.
    fn redraw(&mut self);

    fn clear(&mut self);

    /// Composite a device-sized pixmap at the origin.
    fn draw_image(&mut self, image: &Pixmap);

    /// Paint one shape with `transform` applied to its layer geometry.
    fn draw_path(&mut self, shape: &Path, transform: Affine);
}

/// Paint-list entry: what a shape looked like when last updated.
#[derive(Debug, Clone)]
struct Layer {
    id: ShapeId,
    kind: PathKind,
    geometry: ScreenGeometry,
    weight: f64,
    radius: f64,
}

impl Layer {
    fn from_path(shape: &Path) -> Self {
        Self {
            id: shape.id(),
            kind: shape.kind(),
            geometry: shape.screen().clone(),
            weight: shape.options.weight,
            radius: shape.options.radius,
        }
    }
}

/// In-memory bitmap surface.
#[derive(Debug, Clone)]
pub struct BitmapCanvas {
    size: Size,
    pixel_ratio: f64,
    /// Layer point painted at the top-left device pixel.
    origin: Point,
    pixmap: Pixmap,
    layers: Vec<Layer>,
    colors: HashMap<ShapeId, Color>,
}

impl BitmapCanvas {
    /// Create a transparent canvas of `size` layer pixels.
    pub fn new(size: Size, pixel_ratio: f64) -> RenderResult<Self> {
        if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
            return Err(RenderError::InvalidPixelRatio(pixel_ratio));
        }
        let invalid = || RenderError::InvalidSize {
            width: size.width,
            height: size.height,
        };
        let (width, height) = device_size(size, pixel_ratio).ok_or_else(invalid)?;
        let pixmap = Pixmap::new(width, height).ok_or_else(invalid)?;
        Ok(Self {
            size,
            pixel_ratio,
            origin: Point::ZERO,
            pixmap,
            layers: Vec::new(),
            colors: HashMap::new(),
        })
    }

    /// Set the layer point shown at the top-left corner.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Paint a shape with `color` instead of the default.
    pub fn set_color(&mut self, id: ShapeId, color: Color) {
        self.colors.insert(id, color);
    }

    /// Device pixel under a layer point.
    pub fn pixel(&self, point: Point) -> Option<PremultipliedColorU8> {
        let device = (point - self.origin) * self.pixel_ratio;
        if device.x < 0.0 || device.y < 0.0 {
            return None;
        }
        self.pixmap.pixel(device.x as u32, device.y as u32)
    }

    /// Whether anything is painted under a layer point.
    pub fn is_painted(&self, point: Point) -> bool {
        self.pixel(point).is_some_and(|p| p.alpha() > 0)
    }

    /// Shape ids in paint order, back to front.
    pub fn paint_order(&self) -> Vec<ShapeId> {
        self.layers.iter().map(|layer| layer.id).collect()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Convert the device pixels to a straight-alpha image.
    pub fn to_image(&self) -> RgbaImage {
        let width = self.pixmap.width();
        let pixels = self.pixmap.pixels();
        RgbaImage::from_fn(width, self.pixmap.height(), |x, y| {
            let color = pixels[(y * width + x) as usize].demultiply();
            Rgba([color.red(), color.green(), color.blue(), color.alpha()])
        })
    }

    /// Write the device pixels to a PNG file.
    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> RenderResult<()> {
        self.to_image().save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Layer-to-device transform for geometry already shifted by `-origin`.
    fn device_transform(&self, transform: Affine) -> Transform {
        let origin = self.origin.to_vec2();
        let affine = Affine::scale(self.pixel_ratio)
            * Affine::translate(-origin)
            * transform
            * Affine::translate(origin);
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
    }

    fn paint(&mut self, layer: &Layer, transform: Affine) {
        let transform = self.device_transform(transform);
        let color = self.colors.get(&layer.id).copied().unwrap_or_else(default_color);
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        // Geometry is built relative to the origin to keep f32 precision.
        let origin = self.origin.to_vec2();
        let local = |p: Point| {
            let p = p - origin;
            (p.x as f32, p.y as f32)
        };

        match &layer.geometry {
            ScreenGeometry::Empty => {}
            ScreenGeometry::Point(center) => {
                let (x, y) = local(*center);
                let radius = (layer.radius + layer.weight / 2.0) as f32;
                if let Some(circle) = PathBuilder::from_circle(x, y, radius) {
                    self.pixmap
                        .fill_path(&circle, &paint, FillRule::Winding, transform, None);
                }
            }
            ScreenGeometry::Rings(rings) => {
                let closed = layer.kind == PathKind::Polygon;
                let mut pb = PathBuilder::new();
                for ring in rings {
                    let mut points = ring.iter().map(|p| local(*p));
                    let Some((x, y)) = points.next() else {
                        continue;
                    };
                    pb.move_to(x, y);
                    for (x, y) in points {
                        pb.line_to(x, y);
                    }
                    if closed {
                        pb.close();
                    }
                }
                let Some(path) = pb.finish() else {
                    return;
                };

                if closed {
                    let mut fill = paint.clone();
                    let mut fill_color = color;
                    fill_color.apply_opacity(1.0 / 3.0);
                    fill.set_color(fill_color);
                    self.pixmap
                        .fill_path(&path, &fill, FillRule::EvenOdd, transform, None);
                }
                let stroke = Stroke {
                    width: layer.weight as f32,
                    ..Default::default()
                };
                self.pixmap.stroke_path(&path, &paint, &stroke, transform, None);
            }
        }
    }
}

impl RasterSurface for BitmapCanvas {
    fn size(&self) -> Size {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn snapshot(&self) -> Pixmap {
        self.pixmap.clone()
    }

    fn init_path(&mut self, shape: &Path) {
        self.layers.retain(|layer| layer.id != shape.id());
        self.layers.push(Layer::from_path(shape));
    }

    fn remove_path(&mut self, id: ShapeId) {
        self.layers.retain(|layer| layer.id != id);
    }

    fn update_path(&mut self, shape: &Path) {
        if let Some(layer) = self.layers.iter_mut().find(|layer| layer.id == shape.id()) {
            *layer = Layer::from_path(shape);
        }
        self.redraw();
    }

    fn redraw(&mut self) {
        self.clear();
        let layers = std::mem::take(&mut self.layers);
        for layer in &layers {
            self.paint(layer, Affine::IDENTITY);
        }
        self.layers = layers;
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    fn draw_image(&mut self, image: &Pixmap) {
        self.pixmap.draw_pixmap(
            0,
            0,
            image.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_path(&mut self, shape: &Path, transform: Affine) {
        self.paint(&Layer::from_path(shape), transform);
    }
}

/// Device dimensions for a layer size, if within the surface limit.
fn device_size(size: Size, pixel_ratio: f64) -> Option<(u32, u32)> {
    if !size.is_finite() || size.width <= 0.0 || size.height <= 0.0 {
        return None;
    }
    let side = |length: f64| {
        let device = (length * pixel_ratio).ceil().max(1.0);
        (device <= f64::from(MAX_SURFACE_SIDE)).then_some(device as u32)
    };
    Some((side(size.width)?, side(size.height)?))
}

/// Pixels captured when a drag preview starts.
#[derive(Debug, Clone)]
struct OffscreenBuffer {
    shape_id: ShapeId,
    image: Pixmap,
    saved_hit_test: HitTest,
}

/// Render backend over a shared raster surface.
#[derive(Debug)]
pub struct RasterBackend<S> {
    surface: S,
    buffer: Option<OffscreenBuffer>,
}

impl<S: RasterSurface> RasterBackend<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            buffer: None,
        }
    }

    /// Add a shape and repaint.
    pub fn add_path(&mut self, shape: &Path) {
        self.surface.init_path(shape);
        self.surface.redraw();
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Whether a drag preview buffer is held.
    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    /// Device dimensions of the preview buffer, if held.
    pub fn buffer_dimensions(&self) -> Option<(u32, u32)> {
        self.buffer
            .as_ref()
            .map(|buffer| (buffer.image.width(), buffer.image.height()))
    }

    fn capture(&mut self, shape: &mut Path) {
        self.surface.remove_path(shape.id());
        self.surface.redraw();
        let image = self.surface.snapshot();
        self.surface.init_path(shape);

        let saved_hit_test = shape.hit_test();
        // Cached geometry no longer matches what is on screen.
        shape.set_hit_test(HitTest::Always);

        log::debug!(
            "captured {}x{} preview buffer for {}",
            image.width(),
            image.height(),
            shape.id()
        );
        self.buffer = Some(OffscreenBuffer {
            shape_id: shape.id(),
            image,
            saved_hit_test,
        });
    }
}

impl<S: RasterSurface> RenderBackend for RasterBackend<S> {
    fn update_path(&mut self, shape: &Path) {
        self.surface.update_path(shape);
    }

    fn transform_path(&mut self, shape: Option<&mut Path>, matrix: &[f64]) {
        let Some(shape) = shape else {
            return;
        };
        let matrix = match validate_matrix(matrix) {
            Ok(matrix) => matrix,
            Err(e) => {
                log::warn!("raster transform skipped: {}", e);
                return;
            }
        };

        match self.buffer.as_ref().map(|buffer| buffer.shape_id) {
            Some(owner) if owner != shape.id() => {
                log::warn!("raster transform skipped: {} is already being previewed", owner);
                return;
            }
            Some(_) => {}
            None => self.capture(shape),
        }

        if let Some(buffer) = &self.buffer {
            self.surface.clear();
            self.surface.draw_image(&buffer.image);
            self.surface.draw_path(shape, Affine::new(matrix));
        }
    }

    fn reset_transform_path(&mut self, shape: Option<&mut Path>) {
        let Some(shape) = shape else {
            return;
        };
        let Some(buffer) = self.buffer.take_if(|buffer| buffer.shape_id == shape.id()) else {
            return;
        };
        shape.set_hit_test(buffer.saved_hit_test);
        self.surface.redraw();
    }
}

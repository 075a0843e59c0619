//! Vector backend: one element per shape with attributes and classes.
//!
//! Previewing a drag only writes a `transform` attribute on the dragged
//! shape's element; compositing is left to whatever displays the elements.

use kurbo::{Circle, Shape as KurboShape};
use pathdrag_core::backend::{PathElement, RenderBackend, TRANSFORM_ATTRIBUTE, validate_matrix};
use pathdrag_core::shape::{Path, PathKind, ScreenGeometry, ShapeId};
use pathdrag_core::transform::svg_matrix;
use std::collections::{BTreeMap, HashMap};

/// Tolerance used when flattening marker circles into path data.
const CIRCLE_TOLERANCE: f64 = 0.1;

/// An SVG-like element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgElement {
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
}

impl SvgElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classes in insertion order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Path data (`d` attribute).
    pub fn path_data(&self) -> Option<&str> {
        self.attribute("d")
    }
}

impl PathElement for SvgElement {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        self.attributes.insert(name.to_string(), value);
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Vector render backend keeping an element per shape.
#[derive(Debug, Clone, Default)]
pub struct VectorBackend {
    elements: HashMap<ShapeId, SvgElement>,
    container: SvgElement,
}

impl VectorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the element for a shape and draw it.
    pub fn add_path(&mut self, shape: &Path) {
        let mut element = SvgElement::new();
        for class in shape.options.class_name.split_whitespace() {
            element.add_class(class);
        }
        self.elements.insert(shape.id(), element);
        self.update_path(shape);
    }

    /// Drop a shape's element.
    pub fn remove_path(&mut self, id: ShapeId) -> Option<SvgElement> {
        self.elements.remove(&id)
    }

    pub fn element(&self, id: ShapeId) -> Option<&SvgElement> {
        self.elements.get(&id)
    }

    /// The element holding every path.
    pub fn container(&self) -> &SvgElement {
        &self.container
    }
}

/// Build SVG path data for a shape's cached screen geometry.
pub fn path_data(shape: &Path) -> String {
    match shape.screen() {
        ScreenGeometry::Empty => String::new(),
        ScreenGeometry::Point(center) => Circle::new(*center, shape.options.radius)
            .to_path(CIRCLE_TOLERANCE)
            .to_svg(),
        screen @ ScreenGeometry::Rings(_) => {
            screen.to_bez_path(shape.kind() == PathKind::Polygon).to_svg()
        }
    }
}

impl RenderBackend for VectorBackend {
    fn element_mut(&mut self, id: ShapeId) -> Option<&mut dyn PathElement> {
        self.elements
            .get_mut(&id)
            .map(|element| element as &mut dyn PathElement)
    }

    fn add_container_class(&mut self, class: &str) {
        self.container.add_class(class);
    }

    fn update_path(&mut self, shape: &Path) {
        let data = path_data(shape);
        if let Some(element) = self.elements.get_mut(&shape.id()) {
            element.set_attribute("d", data);
        }
    }

    fn transform_path(&mut self, shape: Option<&mut Path>, matrix: &[f64]) {
        let Some(shape) = shape else {
            return;
        };
        let matrix = match validate_matrix(matrix) {
            Ok(matrix) => matrix,
            Err(e) => {
                log::warn!("vector transform skipped: {}", e);
                return;
            }
        };
        if let Some(element) = self.elements.get_mut(&shape.id()) {
            element.set_attribute(TRANSFORM_ATTRIBUTE, svg_matrix(&matrix));
        }
    }

    fn reset_transform_path(&mut self, shape: Option<&mut Path>) {
        let Some(shape) = shape else {
            return;
        };
        if let Some(element) = self.elements.get_mut(&shape.id()) {
            element.remove_attribute(TRANSFORM_ATTRIBUTE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use pathdrag_core::geo::{Crs, LatLng};
    use pathdrag_core::map::Viewport;

    fn projected_line() -> Path {
        let view = Viewport::new(Crs::simple(), LatLng::new(0.0, 0.0), 0.0, Size::new(100.0, 100.0));
        let mut path = Path::polyline(vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 10.0)]);
        path.options.class_name = "route primary".to_string();
        path.project(&view);
        path
    }

    #[test]
    fn test_add_path_writes_data_and_classes() {
        let path = projected_line();
        let mut backend = VectorBackend::new();
        backend.add_path(&path);

        let element = backend.element(path.id()).unwrap();
        let data = element.path_data().unwrap();
        assert!(data.starts_with('M'));
        assert!(data.contains('L'));
        assert_eq!(data, path_data(&path));
        assert_eq!(element.classes(), &["route".to_string(), "primary".to_string()]);
    }

    #[test]
    fn test_transform_and_reset() {
        let mut path = projected_line();
        let mut backend = VectorBackend::new();
        backend.add_path(&path);

        backend.transform_path(Some(&mut path), &[1.0, 0.0, 0.0, 1.0, 50.0, 20.0]);
        assert_eq!(
            backend.element(path.id()).unwrap().attribute(TRANSFORM_ATTRIBUTE),
            Some("matrix(1 0 0 1 50 20)")
        );
        // Geometry untouched by the preview.
        assert_eq!(
            backend.element(path.id()).unwrap().path_data(),
            Some(path_data(&path).as_str())
        );

        backend.reset_transform_path(Some(&mut path));
        assert_eq!(backend.element(path.id()).unwrap().attribute(TRANSFORM_ATTRIBUTE), None);
    }

    #[test]
    fn test_bad_input_is_ignored() {
        let mut path = projected_line();
        let mut backend = VectorBackend::new();
        backend.add_path(&path);

        backend.transform_path(None, &[1.0, 0.0, 0.0, 1.0, 50.0, 20.0]);
        backend.transform_path(Some(&mut path), &[50.0, 20.0]);
        backend.reset_transform_path(None);
        assert_eq!(backend.element(path.id()).unwrap().attribute(TRANSFORM_ATTRIBUTE), None);
    }

    #[test]
    fn test_unknown_shape_is_ignored() {
        let mut path = projected_line();
        let mut backend = VectorBackend::new();
        backend.transform_path(Some(&mut path), &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert!(backend.element(path.id()).is_none());
    }

    #[test]
    fn test_marker_path_data_is_closed_circle() {
        let view = Viewport::new(Crs::simple(), LatLng::new(0.0, 0.0), 0.0, Size::new(100.0, 100.0));
        let mut marker = Path::marker(LatLng::new(0.0, 0.0));
        marker.project(&view);
        let data = path_data(&marker);
        assert!(data.starts_with('M'));
        assert!(data.ends_with('Z'));
    }

    #[test]
    fn test_container_class() {
        let mut backend = VectorBackend::new();
        backend.add_container_class("leaflet-interactive");
        backend.add_container_class("leaflet-interactive");
        assert_eq!(backend.container().classes(), &["leaflet-interactive".to_string()]);
    }
}

//! One-time setup of path dragging for a host application.

use crate::backend::RenderBackend;
use crate::drag::PathDrag;
use crate::error::{DragError, DragResult};
use crate::options::DragOptions;
use crate::shape::Path;

/// Factory for drag controllers, created once at startup.
#[derive(Debug, Clone)]
pub struct PathDragPlugin {
    options: DragOptions,
    host_version: Option<String>,
}

impl PathDragPlugin {
    /// Set up dragging for a host reporting `host_version`.
    ///
    /// An old, missing or unreadable version only logs a warning.
    pub fn enable(host_version: Option<&str>, options: DragOptions) -> Self {
        if let Err(e) = check_host_version(host_version, &options.min_host_version) {
            log::warn!("path dragging may not work with this host: {}", e);
        }
        Self {
            options,
            host_version: host_version.map(str::to_string),
        }
    }

    pub fn options(&self) -> &DragOptions {
        &self.options
    }

    pub fn host_version(&self) -> Option<&str> {
        self.host_version.as_deref()
    }

    /// Create a controller for `shape` and attach it.
    pub fn make_draggable(&self, shape: &mut Path, backend: &mut dyn RenderBackend) -> PathDrag {
        let mut drag = PathDrag::new(shape, self.options.clone());
        drag.attach(shape, backend);
        drag
    }

    /// Create the controller for a newly added shape, attached only when
    /// the shape's options ask for it. Draggable shapes are made
    /// interactive.
    pub fn init_path(&self, shape: &mut Path, backend: &mut dyn RenderBackend) -> PathDrag {
        if shape.options.draggable {
            shape.options.interactive = true;
            self.make_draggable(shape, backend)
        } else {
            PathDrag::new(shape, self.options.clone())
        }
    }
}

/// Parse the `major.minor` prefix of a version string.
pub fn parse_version(version: &str) -> DragResult<(u32, u32)> {
    let invalid = || DragError::InvalidVersion(version.to_string());
    let mut parts = version.trim().trim_start_matches('v').split('.');
    let major: u32 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    let minor: u32 = match parts.next() {
        Some(p) => {
            let digits: String = p.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().map_err(|_| invalid())?
        }
        None => 0,
    };
    Ok((major, minor))
}

/// Check that `found` is at least `required`.
pub fn check_host_version(found: Option<&str>, required: &str) -> DragResult<()> {
    let unsupported = |found: &str| DragError::UnsupportedHostVersion {
        found: found.to_string(),
        required: required.to_string(),
    };
    let found = found.ok_or_else(|| unsupported("unknown"))?;
    if parse_version(found)? < parse_version(required)? {
        return Err(unsupported(found));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;
    use crate::options::DRAGGABLE_CLASS;
    use crate::shape::PathOptions;

    struct NullBackend;

    impl RenderBackend for NullBackend {
        fn update_path(&mut self, _shape: &Path) {}
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("1.9.4"), Ok((1, 9)));
        assert_eq!(parse_version("v2.0"), Ok((2, 0)));
        assert_eq!(parse_version("1.10-beta"), Ok((1, 10)));
        assert_eq!(parse_version("3"), Ok((3, 0)));
        assert!(parse_version("abc").is_err());
    }

    #[test]
    fn test_check_host_version() {
        assert!(check_host_version(Some("1.7"), "1.7").is_ok());
        assert!(check_host_version(Some("1.10.0"), "1.7").is_ok());
        assert!(matches!(
            check_host_version(Some("1.6.0"), "1.7"),
            Err(DragError::UnsupportedHostVersion { .. })
        ));
        assert!(check_host_version(None, "1.7").is_err());
        assert_eq!(
            check_host_version(Some("x.y"), "1.7"),
            Err(DragError::InvalidVersion("x.y".to_string()))
        );
    }

    #[test]
    fn test_old_host_still_enables() {
        let plugin = PathDragPlugin::enable(Some("0.7"), DragOptions::default());
        assert_eq!(plugin.host_version(), Some("0.7"));
    }

    #[test]
    fn test_init_path_respects_draggable_option() {
        let plugin = PathDragPlugin::enable(Some("1.9"), DragOptions::default());
        let mut backend = NullBackend;

        let mut plain = Path::marker(LatLng::new(0.0, 0.0));
        let drag = plugin.init_path(&mut plain, &mut backend);
        assert!(!drag.is_attached());

        let mut draggable = Path::marker(LatLng::new(0.0, 0.0)).with_options(PathOptions {
            draggable: true,
            interactive: false,
            ..PathOptions::default()
        });
        let drag = plugin.init_path(&mut draggable, &mut backend);
        assert!(drag.is_attached());
        assert!(draggable.options.interactive);
        assert!(draggable.options.has_class(DRAGGABLE_CLASS));
        assert_eq!(drag.shape_id(), draggable.id());
    }
}

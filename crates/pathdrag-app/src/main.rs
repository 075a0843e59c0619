//! Headless drag demonstration.
//!
//! Usage: `pathdrag [OPTIONS_JSON] [OUTPUT_PNG]`
//!
//! Drags a polygon across a small map with a scripted mouse gesture and
//! prints the committed coordinates as JSON. When an output path is given
//! the final canvas is written there.

use kurbo::{Point, Size};
use pathdrag_core::{
    ConfigError, Crs, DragEvent, DragOptions, LatLng, Path, PathDragPlugin, PathOptions,
    PointerInput, Viewport,
};
use pathdrag_render::{BitmapCanvas, RasterBackend, RenderError};
use thiserror::Error;

/// Host version reported to the plugin.
const HOST_VERSION: &str = "1.9.4";

#[derive(Debug, Error)]
enum AppError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid options: {0}")]
    Config(#[from] ConfigError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn load_options(path: Option<&str>) -> Result<DragOptions, AppError> {
    let Some(path) = path else {
        return Ok(DragOptions::default());
    };
    let json = std::fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_string(),
        source,
    })?;
    Ok(DragOptions::from_json(&json)?)
}

fn run(options_path: Option<&str>, output: Option<&str>) -> Result<(), AppError> {
    let options = load_options(options_path)?;
    let size = Size::new(400.0, 300.0);
    let mut map = Viewport::new(Crs::epsg3857(), LatLng::new(48.85, 2.35), 12.0, size);

    let mut backend = RasterBackend::new(BitmapCanvas::new(size, 2.0)?);
    let mut polygon = Path::polygon(vec![vec![
        LatLng::new(48.86, 2.33),
        LatLng::new(48.86, 2.36),
        LatLng::new(48.84, 2.36),
        LatLng::new(48.84, 2.33),
    ]])
    .with_options(PathOptions {
        draggable: true,
        ..PathOptions::default()
    });
    let mut marker = Path::marker(LatLng::new(48.855, 2.38));
    for shape in [&mut polygon, &mut marker] {
        shape.project(&map);
        map.add_shape(shape.id());
        backend.add_path(shape);
    }

    let plugin = PathDragPlugin::enable(Some(HOST_VERSION), options);
    let mut drag = plugin.init_path(&mut polygon, &mut backend);

    let press = map.layer_to_container(Point::new(200.0, 150.0));
    let gesture = [(0.0, 0.0), (12.0, 4.0), (30.0, 18.0), (60.0, 40.0)];
    drag.pointer_down(&mut polygon, &mut map, &mut backend, PointerInput::mouse(press.x, press.y));
    for (dx, dy) in gesture {
        let input = PointerInput::mouse(press.x + dx, press.y + dy);
        drag.pointer_move(&mut polygon, &mut map, &mut backend, input);
    }
    let (dx, dy) = gesture[gesture.len() - 1];
    drag.pointer_up(
        &mut polygon,
        &mut map,
        &mut backend,
        PointerInput::mouse(press.x + dx, press.y + dy),
    );
    if map.take_frame_request() {
        drag.on_frame(&mut polygon);
    }

    for event in drag.poll_events() {
        if let DragEvent::DragEnd { distance } = event {
            log::info!("Dropped polygon after {:.1}px", distance);
        }
    }

    println!("{}", serde_json::to_string_pretty(polygon.lat_lngs())?);

    if let Some(output) = output {
        backend.surface().save_png(output)?;
        log::info!("Wrote {}", output);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Starting PathDrag");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(
        args.first().map(String::as_str),
        args.get(1).map(String::as_str),
    ) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

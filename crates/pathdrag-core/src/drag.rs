//! Drag controller: the per-shape gesture state machine.
//!
//! ```text
//! Idle --down--> Armed --move past tolerance--> Dragging --move--> Dragging
//!   ^              |                                |
//!   +------up------+---------------up---------------+
//! ```
//!
//! While a gesture is active the shape's geometry is left alone. Moves only
//! accumulate a screen translation that the render backend previews. On
//! release the original coordinates are reprojected through that
//! translation and committed in one step.

use crate::backend::RenderBackend;
use crate::error::{DragError, DragResult};
use crate::input::{PointerInput, Propagation};
use crate::map::MapView;
use crate::options::DragOptions;
use crate::proxy::CoordinateProxy;
use crate::reproject::{ProjectionContext, commit};
use crate::session::DragSession;
use crate::shape::{Coordinates, HitTest, Path, ShapeId};
use crate::transform::ScreenTransform;
use kurbo::Vec2;

/// Gesture phase of a drag controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No gesture.
    Idle,
    /// Pressed, not moved past the tolerance yet.
    Armed,
    /// Moving.
    Dragging,
}

/// Gesture state with the session it owns.
#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Armed(DragSession),
    Dragging(DragSession),
}

impl DragState {
    fn session(&self) -> Option<&DragSession> {
        match self {
            DragState::Idle => None,
            DragState::Armed(session) | DragState::Dragging(session) => Some(session),
        }
    }

    fn session_mut(&mut self) -> Option<&mut DragSession> {
        match self {
            DragState::Idle => None,
            DragState::Armed(session) | DragState::Dragging(session) => Some(session),
        }
    }
}

/// Notification emitted by a drag controller.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    /// The gesture moved past the tolerance.
    DragStart { pointer: PointerInput },
    /// A new transform is about to be previewed.
    PreDrag { pointer: PointerInput },
    /// A new transform has been previewed.
    Drag {
        pointer: PointerInput,
        transform: ScreenTransform,
    },
    /// Geometry was committed. `distance` is the straight-line pixel
    /// distance from the press to the release.
    DragEnd { distance: f64 },
}

/// Work deferred to the frame after a drag end.
#[derive(Debug, Clone, Copy)]
struct PendingRestore {
    hit_test: HitTest,
}

/// Drag controller for one shape.
#[derive(Debug, Clone)]
pub struct PathDrag {
    shape_id: ShapeId,
    options: DragOptions,
    attached: bool,
    state: DragState,
    proxy: CoordinateProxy,
    moved: bool,
    pending_restore: Option<PendingRestore>,
    /// Notifications of the current or most recent gesture.
    events: Vec<DragEvent>,
}

impl PathDrag {
    /// Create a detached controller for `shape`.
    pub fn new(shape: &Path, options: DragOptions) -> Self {
        Self {
            shape_id: shape.id(),
            options,
            attached: false,
            state: DragState::Idle,
            proxy: CoordinateProxy::new(),
            moved: false,
            pending_restore: None,
            events: Vec::new(),
        }
    }

    pub fn shape_id(&self) -> ShapeId {
        self.shape_id
    }

    pub fn options(&self) -> &DragOptions {
        &self.options
    }

    /// Start listening for presses on the shape and mark it draggable.
    ///
    /// Returns false if the controller was already attached.
    pub fn attach(&mut self, shape: &mut Path, backend: &mut dyn RenderBackend) -> bool {
        if self.attached {
            return false;
        }
        self.attached = true;
        shape.options.add_class(&self.options.draggable_class);
        if let Some(element) = backend.element_mut(shape.id()) {
            element.add_class(&self.options.draggable_class);
        }
        log::debug!("drag attached to shape {}", self.shape_id);
        true
    }

    /// Stop listening for presses and drop the draggable marker.
    ///
    /// A gesture already in flight still completes on release.
    pub fn detach(&mut self, shape: &mut Path, backend: &mut dyn RenderBackend) {
        self.attached = false;
        shape.options.remove_class(&self.options.draggable_class);
        if let Some(element) = backend.element_mut(shape.id()) {
            element.remove_class(&self.options.draggable_class);
        }
        log::debug!("drag detached from shape {}", self.shape_id);
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether the current or most recent gesture moved past the tolerance.
    ///
    /// Stays true until the frame after the drag end, so the click fired
    /// by the release can be recognised.
    pub fn is_moved(&self) -> bool {
        self.moved
    }

    /// Whether a click on the shape should be swallowed because it ends a
    /// drag of the shape or of the map.
    pub fn should_suppress_click(&self, map_pan_moved: bool) -> bool {
        self.moved || map_pan_moved
    }

    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Armed(_) => DragPhase::Armed,
            DragState::Dragging(_) => DragPhase::Dragging,
        }
    }

    /// The active session, if a gesture is in flight.
    pub fn session(&self) -> Option<&DragSession> {
        self.state.session()
    }

    /// The previewed transform, if a gesture is in flight.
    pub fn transform(&self) -> Option<&ScreenTransform> {
        self.session().map(DragSession::transform)
    }

    /// Whether coordinate reads currently return the drag preview.
    pub fn is_proxy_installed(&self) -> bool {
        self.proxy.is_installed()
    }

    /// Whether a deferred restore waits for the next frame.
    pub fn has_pending_restore(&self) -> bool {
        self.pending_restore.is_some()
    }

    /// Read the shape's coordinates. During a drag this is the uncommitted
    /// preview position; otherwise the stored coordinates.
    pub fn lat_lngs(&self, shape: &Path, map: &dyn MapView) -> Coordinates {
        self.proxy
            .read(shape, self.session(), &ProjectionContext::from_map(map))
    }

    /// Take the notifications emitted since the last poll.
    ///
    /// Hosts should poll after each gesture. A new press drops whatever the
    /// previous gesture left unpolled.
    pub fn poll_events(&mut self) -> Vec<DragEvent> {
        std::mem::take(&mut self.events)
    }

    /// Handle a press on the shape.
    pub fn pointer_down(
        &mut self,
        shape: &mut Path,
        map: &mut dyn MapView,
        backend: &mut dyn RenderBackend,
        input: PointerInput,
    ) -> Propagation {
        if !self.attached || !shape.options.interactive {
            return Propagation::Continue;
        }
        if shape.id() != self.shape_id {
            log::warn!("press on shape {} routed to drag of {}", shape.id(), self.shape_id);
            return Propagation::Continue;
        }
        if self.phase() != DragPhase::Idle {
            log::debug!("ignoring second press on shape {} during a drag", self.shape_id);
            return Propagation::Continue;
        }

        // Leftovers of an earlier gesture.
        backend.reset_transform_path(Some(shape));
        self.proxy.uninstall();
        if !self.events.is_empty() {
            log::debug!(
                "dropping {} unpolled events of shape {}",
                self.events.len(),
                self.shape_id
            );
            self.events.clear();
        }

        let press_point = map.container_point(input.position);
        let panning_was_enabled = map.panning_enabled();
        let session = DragSession::new(
            self.shape_id,
            shape.lat_lngs().clone(),
            press_point,
            input.family(),
            panning_was_enabled,
        );
        self.proxy.install();

        backend.add_container_class(&self.options.interactive_class);
        if panning_was_enabled {
            map.set_panning_enabled(false);
        }
        self.moved = false;
        map.close_popup(self.shape_id);

        self.state = DragState::Armed(session);
        log::debug!("shape {} armed at {:?}", self.shape_id, press_point);
        Propagation::Stop
    }

    /// Handle a document-level pointer move.
    pub fn pointer_move(
        &mut self,
        shape: &mut Path,
        map: &mut dyn MapView,
        backend: &mut dyn RenderBackend,
        input: PointerInput,
    ) -> Propagation {
        match self.try_move(shape, map, backend, input) {
            Ok(propagation) => propagation,
            Err(e) => {
                log::warn!("drag skipped: {}", e);
                Propagation::Continue
            }
        }
    }

    fn try_move(
        &mut self,
        shape: &mut Path,
        map: &mut dyn MapView,
        backend: &mut dyn RenderBackend,
        input: PointerInput,
    ) -> DragResult<Propagation> {
        let tap_tolerance = self.options.tap_tolerance;
        let moved = self.moved;
        let session = self.state.session_mut().ok_or(DragError::NoActiveSession)?;
        if input.family() != session.family {
            return Ok(Propagation::Continue);
        }

        let point = map.container_point(input.position);
        if input.is_touch() && !moved && session.distance_from_press(point) <= tap_tolerance {
            return Ok(Propagation::Stop);
        }
        if session.delta(point) == Vec2::ZERO {
            return Ok(Propagation::Stop);
        }

        if !moved {
            self.start_dragging(shape, map, input);
        }

        let session = self.state.session_mut().ok_or(DragError::NoActiveSession)?;
        let delta = session.advance(point);
        let transform = *session.transform();
        log::trace!("shape {} moved by {:?}, now {:?}", self.shape_id, delta, transform.translation());

        self.events.push(DragEvent::PreDrag { pointer: input });
        backend.transform_path(Some(shape), &transform.coefficients());
        self.events.push(DragEvent::Drag {
            pointer: input,
            transform,
        });
        Ok(Propagation::Stop)
    }

    /// Armed to Dragging.
    fn start_dragging(&mut self, shape: &mut Path, map: &mut dyn MapView, input: PointerInput) {
        self.moved = true;
        shape.options.interactive = false;
        map.mark_pan_moved();
        self.events.push(DragEvent::DragStart { pointer: input });
        map.bring_to_front(self.shape_id);

        self.state = match std::mem::take(&mut self.state) {
            DragState::Armed(session) => DragState::Dragging(session),
            other => other,
        };
        log::debug!("shape {} dragging", self.shape_id);
    }

    /// Handle a document-level pointer release.
    pub fn pointer_up(
        &mut self,
        shape: &mut Path,
        map: &mut dyn MapView,
        backend: &mut dyn RenderBackend,
        input: PointerInput,
    ) -> Propagation {
        match self.state.session() {
            None => {
                log::warn!("release ignored: {}", DragError::NoActiveSession);
                return Propagation::Continue;
            }
            Some(session) if session.family != input.family() => return Propagation::Continue,
            Some(_) => {}
        }
        let session = match std::mem::take(&mut self.state) {
            DragState::Armed(session) | DragState::Dragging(session) => session,
            DragState::Idle => return Propagation::Continue,
        };

        let release_point = map.container_point(input.position);
        let moved = self.moved;

        if moved {
            commit(
                shape,
                session.snapshot(),
                session.transform(),
                &ProjectionContext::from_map(&*map),
            );
        }
        backend.reset_transform_path(Some(shape));
        if moved {
            shape.project(&*map);
            backend.update_path(shape);

            let distance = session.distance_from_press(release_point);
            self.events.push(DragEvent::DragEnd { distance });
            log::debug!("shape {} dropped after {:.2}px", self.shape_id, distance);

            let hit_test = shape.hit_test();
            shape.set_hit_test(HitTest::Never);
            self.schedule_restore(map, hit_test);
        }

        self.proxy.uninstall();
        if session.panning_was_enabled {
            map.set_panning_enabled(true);
        }
        drop(session);

        backend.update_path(shape);
        if moved {
            Propagation::Stop
        } else {
            Propagation::Continue
        }
    }

    /// Queue the interactivity restore for the next frame. Only one restore
    /// is ever in flight; it keeps the hit test saved first.
    fn schedule_restore(&mut self, map: &mut dyn MapView, hit_test: HitTest) {
        if self.pending_restore.is_none() {
            self.pending_restore = Some(PendingRestore { hit_test });
            map.request_frame();
        }
    }

    /// Run deferred work on a render frame. Returns true if anything ran.
    pub fn on_frame(&mut self, shape: &mut Path) -> bool {
        let Some(restore) = self.pending_restore.take() else {
            return false;
        };
        self.moved = false;
        shape.options.interactive = true;
        shape.set_hit_test(restore.hit_test);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Crs, LatLng};
    use crate::map::Viewport;
    use crate::options::DRAGGABLE_CLASS;
    use kurbo::Size;

    const EPSILON: f64 = 1e-9;

    #[derive(Debug, Default)]
    struct RecordingBackend {
        transforms: Vec<Vec<f64>>,
        resets: usize,
        updates: usize,
        container_classes: Vec<String>,
    }

    impl RenderBackend for RecordingBackend {
        fn add_container_class(&mut self, class: &str) {
            self.container_classes.push(class.to_string());
        }
        fn update_path(&mut self, _shape: &Path) {
            self.updates += 1;
        }
        fn transform_path(&mut self, shape: Option<&mut Path>, matrix: &[f64]) {
            if shape.is_some() {
                self.transforms.push(matrix.to_vec());
            }
        }
        fn reset_transform_path(&mut self, _shape: Option<&mut Path>) {
            self.resets += 1;
        }
    }

    struct Fixture {
        map: Viewport,
        backend: RecordingBackend,
        shape: Path,
        drag: PathDrag,
    }

    impl Fixture {
        fn new(crs: Crs) -> Self {
            let map = Viewport::new(crs, LatLng::new(0.5, 0.5), 6.0, Size::new(400.0, 400.0));
            let mut shape = Path::polygon(vec![vec![
                LatLng::new(0.0, 0.0),
                LatLng::new(0.0, 1.0),
                LatLng::new(1.0, 1.0),
            ]]);
            shape.project(&map);
            let mut backend = RecordingBackend::default();
            let mut drag = PathDrag::new(&shape, DragOptions::default());
            drag.attach(&mut shape, &mut backend);
            Self {
                map,
                backend,
                shape,
                drag,
            }
        }

        fn down(&mut self, input: PointerInput) -> Propagation {
            self.drag
                .pointer_down(&mut self.shape, &mut self.map, &mut self.backend, input)
        }

        fn moved(&mut self, input: PointerInput) -> Propagation {
            self.drag
                .pointer_move(&mut self.shape, &mut self.map, &mut self.backend, input)
        }

        fn up(&mut self, input: PointerInput) -> Propagation {
            self.drag
                .pointer_up(&mut self.shape, &mut self.map, &mut self.backend, input)
        }
    }

    fn triangle() -> Coordinates {
        Coordinates::Ring(vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(1.0, 1.0),
        ])
    }

    #[test]
    fn test_drag_scenario() {
        let mut f = Fixture::new(Crs::epsg3857());

        assert_eq!(f.down(PointerInput::mouse(100.0, 100.0)), Propagation::Stop);
        assert_eq!(f.drag.phase(), DragPhase::Armed);
        f.moved(PointerInput::mouse(150.0, 120.0));
        assert_eq!(f.drag.phase(), DragPhase::Dragging);
        assert_eq!(f.up(PointerInput::mouse(150.0, 120.0)), Propagation::Stop);
        assert_eq!(f.drag.phase(), DragPhase::Idle);

        let events = f.drag.poll_events();
        let starts = events.iter().filter(|e| matches!(e, DragEvent::DragStart { .. })).count();
        let drags: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                DragEvent::Drag { transform, .. } => Some(transform.coefficients()),
                _ => None,
            })
            .collect();
        assert_eq!(starts, 1);
        assert_eq!(drags, vec![[1.0, 0.0, 0.0, 1.0, 50.0, 20.0]]);
        let Some(DragEvent::DragEnd { distance }) = events.last() else {
            panic!("expected dragend last, got {:?}", events);
        };
        assert!((distance - 53.851_648_071_345_04).abs() < 1e-9);

        let crs = Crs::epsg3857();
        let ctx = ProjectionContext::new(&crs, 6.0);
        let expected = reproject_expected(&ctx, &triangle(), Vec2::new(50.0, 20.0));
        assert!(f.shape.lat_lngs().approx_eq(&expected, EPSILON));
        assert_eq!(f.backend.transforms, vec![vec![1.0, 0.0, 0.0, 1.0, 50.0, 20.0]]);
    }

    fn reproject_expected(ctx: &ProjectionContext<'_>, coords: &Coordinates, px: Vec2) -> Coordinates {
        let offset = ctx.projected_offset(px);
        coords.map(&mut |ll| ctx.shift(ll, offset))
    }

    #[test]
    fn test_consecutive_drags_start_from_identity() {
        let mut f = Fixture::new(Crs::epsg3857());

        f.down(PointerInput::mouse(100.0, 100.0));
        f.moved(PointerInput::mouse(110.0, 100.0));
        f.up(PointerInput::mouse(110.0, 100.0));
        assert!(f.drag.on_frame(&mut f.shape));
        f.drag.poll_events();

        f.down(PointerInput::mouse(200.0, 200.0));
        assert_eq!(f.drag.transform().map(ScreenTransform::coefficients), Some([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
        f.moved(PointerInput::mouse(200.0, 210.0));
        f.up(PointerInput::mouse(200.0, 210.0));

        let drags: Vec<_> = f
            .drag
            .poll_events()
            .iter()
            .filter_map(|e| match e {
                DragEvent::Drag { transform, .. } => Some(transform.coefficients()),
                _ => None,
            })
            .collect();
        assert_eq!(drags, vec![[1.0, 0.0, 0.0, 1.0, 0.0, 10.0]]);

        let crs = Crs::epsg3857();
        let ctx = ProjectionContext::new(&crs, 6.0);
        let first = reproject_expected(&ctx, &triangle(), Vec2::new(10.0, 0.0));
        let second = reproject_expected(&ctx, &first, Vec2::new(0.0, 10.0));
        assert!(f.shape.lat_lngs().approx_eq(&second, EPSILON));
        assert_eq!(
            f.backend.transforms,
            vec![vec![1.0, 0.0, 0.0, 1.0, 10.0, 0.0], vec![1.0, 0.0, 0.0, 1.0, 0.0, 10.0]]
        );
    }

    #[test]
    fn test_press_drops_unpolled_events() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::mouse(0.0, 0.0));
        f.moved(PointerInput::mouse(5.0, 0.0));
        f.up(PointerInput::mouse(5.0, 0.0));
        f.drag.on_frame(&mut f.shape);

        f.down(PointerInput::mouse(0.0, 0.0));
        assert!(f.drag.poll_events().is_empty());
    }

    #[test]
    fn test_event_order() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::mouse(0.0, 0.0));
        f.moved(PointerInput::mouse(1.0, 0.0));
        f.moved(PointerInput::mouse(2.0, 0.0));
        f.up(PointerInput::mouse(2.0, 0.0));
        let kinds: Vec<&str> = f
            .drag
            .poll_events()
            .iter()
            .map(|e| match e {
                DragEvent::DragStart { .. } => "dragstart",
                DragEvent::PreDrag { .. } => "predrag",
                DragEvent::Drag { .. } => "drag",
                DragEvent::DragEnd { .. } => "dragend",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["dragstart", "predrag", "drag", "predrag", "drag", "dragend"]
        );
        assert!(f.drag.poll_events().is_empty());
    }

    #[test]
    fn test_zero_delta_move_is_noop() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::mouse(10.0, 10.0));
        f.moved(PointerInput::mouse(10.0, 10.0));
        assert_eq!(f.drag.phase(), DragPhase::Armed);
        assert!(f.drag.poll_events().is_empty());

        f.moved(PointerInput::mouse(15.0, 10.0));
        f.drag.poll_events();
        let before = *f.drag.transform().unwrap();
        f.moved(PointerInput::mouse(15.0, 10.0));
        assert!(f.drag.poll_events().is_empty());
        assert_eq!(*f.drag.transform().unwrap(), before);
        assert_eq!(f.backend.transforms.len(), 1);
    }

    #[test]
    fn test_snapshot_isolation() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::mouse(0.0, 0.0));
        f.moved(PointerInput::mouse(4.0, 0.0));

        // Somebody else edits the live coordinates mid-drag.
        *f.shape.lat_lngs_mut() = Coordinates::Ring(vec![LatLng::new(40.0, 40.0)]);

        f.up(PointerInput::mouse(4.0, 0.0));
        let crs = Crs::simple();
        let expected = reproject_expected(&ProjectionContext::new(&crs, 6.0), &triangle(), Vec2::new(4.0, 0.0));
        assert!(f.shape.lat_lngs().approx_eq(&expected, EPSILON));
    }

    #[test]
    fn test_round_trip_restores_coordinates() {
        let mut f = Fixture::new(Crs::epsg3857());
        f.down(PointerInput::mouse(100.0, 100.0));
        f.moved(PointerInput::mouse(137.0, 81.0));
        f.moved(PointerInput::mouse(100.0, 100.0));
        f.up(PointerInput::mouse(100.0, 100.0));

        assert!(f.drag.is_moved());
        assert!(f.shape.lat_lngs().approx_eq(&triangle(), 1e-9));
        let Some(DragEvent::DragEnd { distance }) = f.drag.poll_events().pop() else {
            panic!("expected dragend");
        };
        assert!(distance.abs() < EPSILON);
    }

    #[test]
    fn test_touch_tolerance_gating() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::touch(100.0, 100.0));

        assert_eq!(f.moved(PointerInput::touch(115.0, 100.0)), Propagation::Stop);
        assert_eq!(f.drag.phase(), DragPhase::Armed);
        assert!(f.drag.poll_events().is_empty());

        f.moved(PointerInput::touch(116.0, 100.0));
        assert_eq!(f.drag.phase(), DragPhase::Dragging);
        assert_eq!(f.drag.transform().unwrap().translation(), Vec2::new(16.0, 0.0));

        // Once moving, small moves count.
        f.moved(PointerInput::touch(117.0, 100.0));
        assert_eq!(f.drag.transform().unwrap().translation(), Vec2::new(17.0, 0.0));
    }

    #[test]
    fn test_mouse_has_no_tolerance() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::mouse(100.0, 100.0));
        f.moved(PointerInput::mouse(101.0, 100.0));
        assert_eq!(f.drag.phase(), DragPhase::Dragging);
    }

    #[test]
    fn test_moves_of_other_family_are_ignored() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::mouse(0.0, 0.0));
        assert_eq!(f.moved(PointerInput::touch(50.0, 0.0)), Propagation::Continue);
        assert_eq!(f.up(PointerInput::touch(50.0, 0.0)), Propagation::Continue);
        assert_eq!(f.drag.phase(), DragPhase::Armed);

        assert_eq!(f.moved(PointerInput::mouse(0.0, 0.0).simulated()), Propagation::Continue);
        assert!(f.drag.transform().unwrap().is_identity());
    }

    #[test]
    fn test_pen_press_listens_to_touch_moves() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::pen(0.0, 0.0));
        assert_eq!(f.moved(PointerInput::mouse(40.0, 0.0)), Propagation::Continue);
        assert_eq!(f.moved(PointerInput::touch(40.0, 0.0)), Propagation::Stop);
        assert_eq!(f.drag.phase(), DragPhase::Dragging);
    }

    #[test]
    fn test_release_without_move_cleans_up() {
        let mut f = Fixture::new(Crs::simple());
        f.map.open_popup(f.shape.id());
        f.down(PointerInput::mouse(10.0, 10.0));
        assert!(!f.map.panning_enabled());
        assert!(!f.map.is_popup_open(f.shape.id()));
        assert!(f.drag.is_proxy_installed());

        assert_eq!(f.up(PointerInput::mouse(10.0, 10.0)), Propagation::Continue);
        assert!(f.drag.poll_events().is_empty());
        assert!(!f.drag.is_moved());
        assert!(!f.drag.is_proxy_installed());
        assert!(f.drag.session().is_none());
        assert!(f.map.panning_enabled());
        assert!(!f.drag.has_pending_restore());
        assert_eq!(f.shape.lat_lngs(), &triangle());
        assert!(f.shape.options.interactive);
    }

    #[test]
    fn test_panning_left_disabled_if_it_was() {
        let mut f = Fixture::new(Crs::simple());
        f.map.set_panning_enabled(false);
        f.down(PointerInput::mouse(0.0, 0.0));
        f.moved(PointerInput::mouse(3.0, 3.0));
        f.up(PointerInput::mouse(3.0, 3.0));
        assert!(!f.map.panning_enabled());
    }

    #[test]
    fn test_second_press_is_ignored() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::mouse(0.0, 0.0));
        f.moved(PointerInput::mouse(5.0, 0.0));
        assert_eq!(f.down(PointerInput::mouse(50.0, 50.0)), Propagation::Continue);
        assert_eq!(f.drag.session().unwrap().press_point, kurbo::Point::new(0.0, 0.0));
        assert_eq!(f.drag.transform().unwrap().translation(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_move_without_session_is_noop() {
        let mut f = Fixture::new(Crs::simple());
        assert_eq!(f.moved(PointerInput::mouse(5.0, 5.0)), Propagation::Continue);
        assert_eq!(f.up(PointerInput::mouse(5.0, 5.0)), Propagation::Continue);
        assert!(f.drag.poll_events().is_empty());
        assert_eq!(f.shape.lat_lngs(), &triangle());
    }

    #[test]
    fn test_dragstart_side_effects() {
        let mut f = Fixture::new(Crs::simple());
        let other = uuid::Uuid::new_v4();
        f.map.add_shape(f.shape.id());
        f.map.add_shape(other);

        f.down(PointerInput::mouse(0.0, 0.0));
        assert_eq!(f.backend.container_classes, vec!["leaflet-interactive".to_string()]);
        f.moved(PointerInput::mouse(3.0, 0.0));
        assert!(!f.shape.options.interactive);
        assert!(f.map.pan_moved());
        assert_eq!(f.map.z_order().last(), Some(&f.shape.id()));
    }

    #[test]
    fn test_deferred_restore() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::mouse(0.0, 0.0));
        f.moved(PointerInput::mouse(3.0, 0.0));
        f.up(PointerInput::mouse(3.0, 0.0));

        assert!(f.drag.is_moved());
        assert!(f.drag.should_suppress_click(false));
        assert_eq!(f.shape.hit_test(), HitTest::Never);
        assert!(!f.shape.options.interactive);
        assert!(f.map.take_frame_request());

        // Pressing again before the frame does nothing.
        assert_eq!(f.down(PointerInput::mouse(3.0, 0.0)), Propagation::Continue);

        assert!(f.drag.on_frame(&mut f.shape));
        assert!(!f.drag.on_frame(&mut f.shape));
        assert!(!f.drag.is_moved());
        assert!(!f.drag.should_suppress_click(false));
        assert!(f.drag.should_suppress_click(true));
        assert_eq!(f.shape.hit_test(), HitTest::Geometry);
        assert!(f.shape.options.interactive);
    }

    #[test]
    fn test_cleanup_after_dragend() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::mouse(0.0, 0.0));
        f.moved(PointerInput::mouse(8.0, 8.0));
        let resets_before = f.backend.resets;
        let updates_before = f.backend.updates;
        f.up(PointerInput::mouse(8.0, 8.0));

        assert!(!f.drag.is_proxy_installed());
        assert!(f.drag.session().is_none());
        assert!(f.drag.transform().is_none());
        assert_eq!(f.backend.resets, resets_before + 1);
        assert_eq!(f.backend.updates, updates_before + 2);
        assert!(f.map.panning_enabled());
    }

    #[test]
    fn test_preview_coordinates_during_drag() {
        let mut f = Fixture::new(Crs::simple());
        f.down(PointerInput::mouse(0.0, 0.0));
        f.moved(PointerInput::mouse(64.0, 0.0));

        let preview = f.drag.lat_lngs(&f.shape, &f.map);
        // Zoom 6 on the simple CRS: 64px is one unit.
        let expected = triangle().map(&mut |ll| LatLng::new(ll.lat, ll.lng + 1.0));
        assert!(preview.approx_eq(&expected, EPSILON));
        assert_eq!(f.shape.lat_lngs(), &triangle());

        f.up(PointerInput::mouse(64.0, 0.0));
        assert_eq!(f.drag.lat_lngs(&f.shape, &f.map), *f.shape.lat_lngs());
        assert!(f.shape.lat_lngs().approx_eq(&expected, EPSILON));
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut f = Fixture::new(Crs::simple());
        assert!(f.drag.is_attached());
        assert!(!f.drag.attach(&mut f.shape, &mut f.backend));
        assert_eq!(f.shape.options.class_name, DRAGGABLE_CLASS);

        f.drag.detach(&mut f.shape, &mut f.backend);
        assert!(!f.drag.is_attached());
        assert!(!f.shape.options.has_class(DRAGGABLE_CLASS));
        assert_eq!(f.down(PointerInput::mouse(0.0, 0.0)), Propagation::Continue);

        // Safe to repeat.
        f.drag.detach(&mut f.shape, &mut f.backend);
    }

    #[test]
    fn test_marker_drag() {
        let mut map = Viewport::new(Crs::simple(), LatLng::new(0.0, 0.0), 0.0, Size::new(100.0, 100.0));
        let mut shape = Path::marker(LatLng::new(0.0, 0.0));
        shape.project(&map);
        let mut backend = RecordingBackend::default();
        let mut drag = PathDrag::new(&shape, DragOptions::default());
        drag.attach(&mut shape, &mut backend);

        drag.pointer_down(&mut shape, &mut map, &mut backend, PointerInput::mouse(50.0, 50.0));
        drag.pointer_move(&mut shape, &mut map, &mut backend, PointerInput::mouse(60.0, 45.0));
        drag.pointer_up(&mut shape, &mut map, &mut backend, PointerInput::mouse(60.0, 45.0));

        assert_eq!(shape.lat_lngs(), &Coordinates::Point(LatLng::new(5.0, 10.0)));
        assert_eq!(*shape.screen(), crate::shape::ScreenGeometry::Point(kurbo::Point::new(60.0, 45.0)));
    }
}

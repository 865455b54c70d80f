//! The three views: Earth globe, single planet and orbital scene.
//!
//! A view owns its camera, hover and load state. The host drives it from
//! the display callback ([`View::frame`]) and from pointer events, and
//! drains [`ViewEvent`]s after each callback. All mutation happens on the
//! host's UI thread, so pointer input always lands between two paints.

use std::collections::BTreeMap;

use formats::TravelStatus;
use foundation::bounds::Aabb2;
use foundation::color::Color;
use foundation::ids::{BodyId, MarkerId};
use foundation::math::{GeoPoint, Vec2};
use foundation::time::Time;
use layers::{
    GlobeTheme, MarkerSet, RegionIndex, RingBand, SurfaceDot, UNKNOWN_REGION_NAME, adaptive_spacing,
    coarse_ring_bands, saturn_ring_bands,
};
use render::{
    Canvas, GlobeFrame, PlanetFrame, RenderStats, SceneBody, SolarFrame, graticule_lines, paint_globe,
    paint_planet, paint_solar_system,
};
use runtime::{Event, EventBus, FramePacer, Metrics};
use streaming::{BoundarySource, LoadError, LoadGuard, LoadPhase, LoadToken, load_region_index};
use tracing::{debug, info, warn};

use crate::bodies::{self, BodySpec, region_surface};
use crate::camera::CameraController;
use crate::config::{PacingConfig, SurfaceConfig, ViewConfig};
use crate::orbit::SolarScene;
use crate::picking::{Cursor, HoverChange, HoverState, HoverTarget, cursor_for, hit_test_globe};

/// Background behind a single planet.
pub const PLANET_BACKGROUND: Color = Color::hex(0x050810);
/// Background behind the orbital scene.
pub const SCENE_BACKGROUND: Color = Color::BLACK;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// A new target is hovered. `detail` is the region code or the
    /// destination's country, empty for bodies.
    HoverChanged {
        target: HoverTarget,
        name: String,
        detail: String,
    },
    /// The hovered target is unchanged; only the pointer moved.
    HoverMoved { anchor: Vec2 },
    HoverCleared,
    Selected(HoverTarget),
}

pub trait View {
    fn resize(&mut self, viewport: Aabb2);

    /// One display callback. Advances and paints when the pacer allows;
    /// returns the paint statistics of a painted frame.
    fn frame(&mut self, now: Time, canvas: &mut dyn Canvas) -> Option<RenderStats>;

    /// Paints the current state without advancing it.
    fn paint(&self, canvas: &mut dyn Canvas) -> RenderStats;

    /// Returns whether the press was captured (a drag started).
    fn pointer_down(&mut self, p: Vec2) -> bool;
    fn pointer_move(&mut self, p: Vec2);
    fn pointer_up(&mut self, now: Time);
    fn pointer_leave(&mut self, now: Time);

    /// Returns whether the wheel event was consumed.
    fn wheel(&mut self, p: Vec2, delta_y: f64) -> bool;
    fn click(&mut self, p: Vec2);
    fn double_click(&mut self, p: Vec2);

    /// Whether a drag or pan is in progress.
    fn is_dragging(&self) -> bool;
    fn cursor(&self) -> Cursor;
    fn hover(&self) -> &HoverTarget;
    fn drain_events(&mut self) -> Vec<Event<ViewEvent>>;
    fn metrics(&self) -> &Metrics;
}

/// Pacing, hover tracking, the event outbox and metrics shared by all views.
#[derive(Debug)]
struct ViewCore {
    pacer: FramePacer,
    events: EventBus<ViewEvent>,
    metrics: Metrics,
    hover: HoverState,
    frame_index: u64,
    pointer: Option<Vec2>,
}

impl ViewCore {
    fn new(pacing: &PacingConfig) -> Self {
        Self {
            pacer: FramePacer::new(pacing.frame_rate_hz),
            events: EventBus::new(),
            metrics: Metrics::new(),
            hover: HoverState::default(),
            frame_index: 0,
            pointer: None,
        }
    }

    fn poll(&mut self, now: Time) -> bool {
        match self.pacer.poll(now) {
            Some(frame) => {
                self.frame_index = frame.index;
                true
            }
            None => {
                self.metrics.inc_counter("frames_skipped", 1);
                false
            }
        }
    }

    fn record(&mut self, stats: RenderStats) {
        let m = &mut self.metrics;
        m.inc_counter("frames_painted", 1);
        m.set_gauge("dots_drawn", stats.dots_drawn as i64);
        m.set_gauge("dots_culled", stats.dots_culled as i64);
        m.set_gauge("color_batches", stats.color_batches as i64);
        m.set_gauge("markers_drawn", stats.markers_drawn as i64);
        m.record_histogram("frame_dots", stats.dots_drawn as i64);
    }

    fn emit(&mut self, event: ViewEvent) {
        self.events.emit(self.frame_index, event);
    }

    fn apply_hover(&mut self, target: HoverTarget, describe: impl FnOnce(&HoverTarget) -> (String, String)) {
        match self.hover.update(target) {
            HoverChange::Unchanged => {}
            HoverChange::Changed(target) => {
                let (name, detail) = describe(&target);
                self.emit(ViewEvent::HoverChanged { target, name, detail });
            }
            HoverChange::Moved(anchor) => self.emit(ViewEvent::HoverMoved { anchor }),
            HoverChange::Cleared => self.emit(ViewEvent::HoverCleared),
        }
    }

    fn clear_hover(&mut self) {
        self.pointer = None;
        self.apply_hover(HoverTarget::None, |_| Default::default());
    }
}

fn describe(target: &HoverTarget, regions: Option<&RegionIndex>, markers: Option<&MarkerSet>) -> (String, String) {
    match target {
        HoverTarget::None => Default::default(),
        HoverTarget::Region { id, .. } => regions
            .and_then(|index| index.get(*id))
            .map(|f| (f.name.clone(), f.code.clone()))
            .unwrap_or_else(|| (UNKNOWN_REGION_NAME.to_string(), String::new())),
        HoverTarget::Marker { id, .. } => markers
            .and_then(|set| set.get(id))
            .map(|pin| (pin.name.clone(), pin.country.clone()))
            .unwrap_or_else(|| (id.to_string(), String::new())),
        HoverTarget::Body { id, .. } => (
            bodies::body(id.as_str()).map_or_else(|| id.to_string(), |b| b.name.to_string()),
            String::new(),
        ),
    }
}

/// Requested spacing. The point budget is applied when dots are generated,
/// since region-backed bodies only keep the samples that fall on land.
fn resolve_spacing(surface: &SurfaceConfig, derived: f64) -> f64 {
    surface.spacing_deg.unwrap_or(derived)
}

/// Outcome of handing a finished load to a view.
#[derive(Debug)]
enum Settled {
    Stale,
    Failed,
    Ready(RegionIndex),
}

/// Generation and phase of a view's boundary load.
#[derive(Debug, Default)]
struct RegionLoad {
    guard: LoadGuard,
    phase: LoadPhase,
}

impl RegionLoad {
    fn begin(&mut self, metrics: &mut Metrics) -> LoadToken {
        let token = self.guard.begin();
        self.phase = LoadPhase::Pending;
        metrics.inc_counter("loads_started", 1);
        info!(token = token.0, "boundary load started");
        token
    }

    fn settle(&mut self, token: LoadToken, result: Result<RegionIndex, LoadError>, metrics: &mut Metrics) -> Settled {
        if !self.guard.is_current(token) {
            metrics.inc_counter("loads_stale", 1);
            debug!(token = token.0, "dropping stale boundary load");
            return Settled::Stale;
        }
        match result {
            Ok(index) => {
                self.phase = LoadPhase::Ready;
                debug!(token = token.0, regions = index.len(), "boundary load applied");
                Settled::Ready(index)
            }
            Err(e) => {
                self.phase = LoadPhase::Unavailable;
                metrics.inc_counter("loads_failed", 1);
                warn!(token = token.0, error = %e, "boundary data unavailable");
                Settled::Failed
            }
        }
    }
}

/// Earth globe backed by boundary data, with destination pins.
#[derive(Debug)]
pub struct GlobeView {
    config: ViewConfig,
    camera: CameraController,
    theme: GlobeTheme,
    graticule: Vec<Vec<GeoPoint>>,
    load: RegionLoad,
    regions: Option<RegionIndex>,
    dots: Option<Vec<SurfaceDot>>,
    spacing: f64,
    markers: MarkerSet,
    show_markers: bool,
    highlighted: Option<MarkerId>,
    core: ViewCore,
}

impl GlobeView {
    pub fn new(config: ViewConfig, viewport: Aabb2) -> Self {
        let camera = CameraController::new(config.camera.clone(), viewport);
        let theme = GlobeTheme::default();
        let spacing = resolve_spacing(&config.surface, adaptive_spacing(camera.base_radius()));
        Self {
            graticule: graticule_lines(theme.graticule_step_deg),
            core: ViewCore::new(&config.pacing),
            show_markers: config.pick.markers_enabled,
            config,
            camera,
            theme,
            load: RegionLoad::default(),
            regions: None,
            dots: None,
            spacing,
            markers: MarkerSet::default(),
            highlighted: None,
        }
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn phase(&self) -> LoadPhase {
        self.load.phase
    }

    pub fn regions(&self) -> Option<&RegionIndex> {
        self.regions.as_ref()
    }

    /// Surface dots, or `None` until boundary data is ready.
    pub fn dots(&self) -> Option<&[SurfaceDot]> {
        self.dots.as_deref()
    }

    /// Requested lattice spacing. Dots are coarser only when the regions
    /// would keep more than the point budget.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn set_markers(&mut self, markers: MarkerSet) {
        self.markers = markers;
    }

    pub fn set_statuses(&mut self, statuses: &BTreeMap<String, TravelStatus>) {
        self.markers.apply_statuses(statuses);
    }

    pub fn set_show_markers(&mut self, show: bool) {
        self.show_markers = show;
        if !show && self.core.hover.current().marker().is_some() {
            self.core.clear_hover();
        }
    }

    pub fn show_markers(&self) -> bool {
        self.show_markers
    }

    /// Emphasises one destination and holds auto-rotation while it is set.
    pub fn highlight(&mut self, id: Option<MarkerId>) {
        self.camera.set_highlight_pause(id.is_some());
        self.highlighted = id;
    }

    /// Starts a new load generation. Any in-flight load becomes stale.
    pub fn begin_load(&mut self) -> LoadToken {
        self.load.begin(&mut self.core.metrics)
    }

    /// Applies a finished load. Returns `false` when the result was stale.
    pub fn finish_load(&mut self, token: LoadToken, result: Result<RegionIndex, LoadError>) -> bool {
        match self.load.settle(token, result, &mut self.core.metrics) {
            Settled::Stale => false,
            Settled::Failed => {
                self.regions = None;
                self.dots = None;
                if self.core.hover.current().region().is_some() {
                    self.core.clear_hover();
                }
                true
            }
            Settled::Ready(index) => {
                self.dots = Some(region_surface(&index, self.spacing, self.config.surface.max_points).1);
                self.regions = Some(index);
                true
            }
        }
    }

    /// Loads from `source` in one generation.
    pub async fn load_from<S: BoundarySource>(&mut self, source: &S) -> LoadPhase {
        let token = self.begin_load();
        let result = load_region_index(source, None).await;
        self.finish_load(token, result);
        self.phase()
    }

    fn hit_test(&self, p: Vec2) -> HoverTarget {
        let projection = self.camera.projection();
        let markers = self.show_markers.then_some(&self.markers);
        hit_test_globe(&projection, p, markers, self.regions.as_ref(), &self.config.pick)
    }
}

impl View for GlobeView {
    fn resize(&mut self, viewport: Aabb2) {
        self.camera.set_viewport(viewport);
        let spacing = resolve_spacing(&self.config.surface, adaptive_spacing(self.camera.base_radius()));
        if spacing != self.spacing {
            self.spacing = spacing;
            if let Some(index) = &self.regions {
                self.dots = Some(region_surface(index, spacing, self.config.surface.max_points).1);
            }
        }
    }

    fn frame(&mut self, now: Time, canvas: &mut dyn Canvas) -> Option<RenderStats> {
        if !self.core.poll(now) {
            return None;
        }
        self.camera.tick(now);
        let stats = self.paint(canvas);
        self.core.record(stats);
        Some(stats)
    }

    fn paint(&self, canvas: &mut dyn Canvas) -> RenderStats {
        let projection = self.camera.projection();
        let hover = self.core.hover.current();
        let frame = GlobeFrame {
            projection: &projection,
            viewport: self.camera.viewport(),
            zoom: self.camera.zoom(),
            theme: &self.theme,
            graticule: &self.graticule,
            dots: self.dots.as_deref(),
            hovered_region: hover.region(),
            markers: self.show_markers.then_some(&self.markers),
            hovered_marker: hover.marker(),
            highlighted_marker: self.highlighted.as_ref(),
        };
        paint_globe(canvas, &frame)
    }

    fn pointer_down(&mut self, p: Vec2) -> bool {
        self.camera.on_pointer_down(p)
    }

    fn pointer_move(&mut self, p: Vec2) {
        self.core.pointer = Some(p);
        self.camera.on_pointer_move(p);
        let target = self.hit_test(p);
        let regions = self.regions.as_ref();
        let markers = Some(&self.markers);
        self.core.apply_hover(target, |t| describe(t, regions, markers));
    }

    fn pointer_up(&mut self, now: Time) {
        self.camera.on_pointer_up(now);
    }

    /// The drag itself continues through document-level listeners.
    fn pointer_leave(&mut self, _now: Time) {
        self.core.clear_hover();
    }

    fn wheel(&mut self, p: Vec2, delta_y: f64) -> bool {
        self.camera.on_wheel(p, delta_y)
    }

    fn click(&mut self, p: Vec2) {
        let target = self.hit_test(p);
        if !target.is_none() {
            self.core.emit(ViewEvent::Selected(target));
        }
    }

    fn double_click(&mut self, _p: Vec2) {}

    fn is_dragging(&self) -> bool {
        self.camera.is_dragging()
    }

    fn cursor(&self) -> Cursor {
        let on_disc = self.core.pointer.is_some_and(|p| self.camera.on_disc(p, 1.0));
        cursor_for(self.core.hover.current(), self.camera.is_dragging(), on_disc)
    }

    fn hover(&self) -> &HoverTarget {
        self.core.hover.current()
    }

    fn drain_events(&mut self) -> Vec<Event<ViewEvent>> {
        self.core.events.drain()
    }

    fn metrics(&self) -> &Metrics {
        &self.core.metrics
    }
}

/// One catalogue body filling the surface.
#[derive(Debug)]
pub struct PlanetView {
    spec: &'static BodySpec,
    config: ViewConfig,
    camera: CameraController,
    rings: Vec<RingBand>,
    /// `None` while a region-backed body has no data.
    dots: Option<Vec<SurfaceDot>>,
    spacing: f64,
    load: RegionLoad,
    core: ViewCore,
}

impl PlanetView {
    pub fn new(spec: &'static BodySpec, config: ViewConfig, viewport: Aabb2) -> Self {
        let spacing = resolve_spacing(&config.surface, spec.planet_spacing());
        let dots = spec.budgeted_surface(None, spacing, config.surface.seed, config.surface.max_points);
        let rings = if spec.capabilities.has_rings {
            saturn_ring_bands()
        } else {
            Vec::new()
        };
        Self {
            camera: CameraController::new(config.camera.clone(), viewport),
            core: ViewCore::new(&config.pacing),
            spec,
            config,
            rings,
            dots,
            spacing,
            load: RegionLoad::default(),
        }
    }

    pub fn spec(&self) -> &'static BodySpec {
        self.spec
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn dots(&self) -> Option<&[SurfaceDot]> {
        self.dots.as_deref()
    }

    pub fn phase(&self) -> LoadPhase {
        self.load.phase
    }

    /// Starts a boundary load. `None` when the body's surface is procedural.
    pub fn begin_load(&mut self) -> Option<LoadToken> {
        self.spec
            .is_region_backed()
            .then(|| self.load.begin(&mut self.core.metrics))
    }

    /// Applies a finished load. Returns `false` when the result was stale.
    pub fn finish_load(&mut self, token: LoadToken, result: Result<RegionIndex, LoadError>) -> bool {
        let index = match self.load.settle(token, result, &mut self.core.metrics) {
            Settled::Stale => return false,
            Settled::Failed => None,
            Settled::Ready(index) => Some(index),
        };
        let surface = &self.config.surface;
        self.dots = self
            .spec
            .budgeted_surface(index.as_ref(), self.spacing, surface.seed, surface.max_points);
        true
    }

    pub async fn load_from<S: BoundarySource>(&mut self, source: &S) -> LoadPhase {
        if let Some(token) = self.begin_load() {
            let result = load_region_index(source, None).await;
            self.finish_load(token, result);
        }
        self.phase()
    }
}

impl View for PlanetView {
    fn resize(&mut self, viewport: Aabb2) {
        self.camera.set_viewport(viewport);
    }

    fn frame(&mut self, now: Time, canvas: &mut dyn Canvas) -> Option<RenderStats> {
        if !self.core.poll(now) {
            return None;
        }
        self.camera.tick(now);
        let stats = self.paint(canvas);
        self.core.record(stats);
        Some(stats)
    }

    fn paint(&self, canvas: &mut dyn Canvas) -> RenderStats {
        let projection = self.camera.projection();
        let frame = PlanetFrame {
            projection: &projection,
            viewport: self.camera.viewport(),
            background: PLANET_BACKGROUND,
            palette: &self.spec.palette,
            effects: self.spec.capabilities.effects(),
            rings: &self.rings,
            dots: self.dots.as_deref().unwrap_or(&[]),
        };
        paint_planet(canvas, &frame)
    }

    fn pointer_down(&mut self, p: Vec2) -> bool {
        self.camera.on_pointer_down(p)
    }

    fn pointer_move(&mut self, p: Vec2) {
        self.core.pointer = Some(p);
        self.camera.on_pointer_move(p);
    }

    fn pointer_up(&mut self, now: Time) {
        self.camera.on_pointer_up(now);
    }

    fn pointer_leave(&mut self, now: Time) {
        self.camera.on_pointer_leave(now);
        self.core.clear_hover();
    }

    fn wheel(&mut self, p: Vec2, delta_y: f64) -> bool {
        self.camera.on_wheel(p, delta_y)
    }

    fn click(&mut self, _p: Vec2) {}

    fn double_click(&mut self, _p: Vec2) {
        let on = self.camera.toggle_auto_rotate();
        debug!(body = %self.spec.id, auto_rotate = on, "toggled auto-rotation");
    }

    fn is_dragging(&self) -> bool {
        self.camera.is_dragging()
    }

    fn cursor(&self) -> Cursor {
        cursor_for(&HoverTarget::None, self.camera.is_dragging(), true)
    }

    fn hover(&self) -> &HoverTarget {
        self.core.hover.current()
    }

    fn drain_events(&mut self) -> Vec<Event<ViewEvent>> {
        self.core.events.drain()
    }

    fn metrics(&self) -> &Metrics {
        &self.core.metrics
    }
}

/// Every catalogue body on its orbit.
#[derive(Debug)]
pub struct SolarSystemView {
    config: ViewConfig,
    scene: SolarScene,
    /// Per body, in catalogue order. `None` while unavailable.
    surfaces: Vec<Option<Vec<SurfaceDot>>>,
    rings: Vec<RingBand>,
    orbit_guide: Color,
    load: RegionLoad,
    selected: Option<BodyId>,
    core: ViewCore,
}

impl SolarSystemView {
    pub fn new(config: ViewConfig, viewport: Aabb2) -> Self {
        let scene = SolarScene::new(viewport, config.surface.seed);
        let surfaces = scene
            .bodies()
            .iter()
            .map(|b| {
                let spacing = resolve_spacing(&config.surface, b.spec.scene_spacing());
                b.spec.budgeted_surface(None, spacing, config.surface.seed, config.surface.max_points)
            })
            .collect();
        Self {
            core: ViewCore::new(&config.pacing),
            config,
            scene,
            surfaces,
            rings: coarse_ring_bands(),
            orbit_guide: GlobeTheme::default().orbit_guide,
            load: RegionLoad::default(),
            selected: None,
        }
    }

    pub fn scene(&self) -> &SolarScene {
        &self.scene
    }

    pub fn phase(&self) -> LoadPhase {
        self.load.phase
    }

    pub fn surface(&self, id: BodyId) -> Option<&[SurfaceDot]> {
        let i = self.scene.bodies().iter().position(|b| b.id() == id)?;
        self.surfaces[i].as_deref()
    }

    pub fn selected(&self) -> Option<BodyId> {
        self.selected
    }

    pub fn begin_load(&mut self) -> LoadToken {
        self.load.begin(&mut self.core.metrics)
    }

    /// Applies a finished load to region-backed bodies. Returns `false`
    /// when the result was stale.
    pub fn finish_load(&mut self, token: LoadToken, result: Result<RegionIndex, LoadError>) -> bool {
        let index = match self.load.settle(token, result, &mut self.core.metrics) {
            Settled::Stale => return false,
            Settled::Failed => None,
            Settled::Ready(index) => Some(index),
        };
        for (body, surface) in self.scene.bodies().iter().zip(&mut self.surfaces) {
            if body.spec.is_region_backed() {
                let spacing = resolve_spacing(&self.config.surface, body.spec.scene_spacing());
                let config = &self.config.surface;
                *surface = body.spec.budgeted_surface(index.as_ref(), spacing, config.seed, config.max_points);
            }
        }
        true
    }

    pub async fn load_from<S: BoundarySource>(&mut self, source: &S) -> LoadPhase {
        let token = self.begin_load();
        let result = load_region_index(source, None).await;
        self.finish_load(token, result);
        self.phase()
    }
}

impl View for SolarSystemView {
    fn resize(&mut self, viewport: Aabb2) {
        self.scene.set_viewport(viewport);
    }

    fn frame(&mut self, now: Time, canvas: &mut dyn Canvas) -> Option<RenderStats> {
        if !self.core.poll(now) {
            return None;
        }
        self.scene.tick();
        let stats = self.paint(canvas);
        self.core.record(stats);
        Some(stats)
    }

    fn paint(&self, canvas: &mut dyn Canvas) -> RenderStats {
        let hovered = self.core.hover.current().body();
        let bodies = self
            .scene
            .layout()
            .iter()
            .map(|placed| {
                let spec = self.scene.bodies()[placed.index].spec;
                SceneBody {
                    name: spec.name,
                    palette: &spec.palette,
                    effects: spec.capabilities.effects(),
                    projection: self.scene.body_projection(placed),
                    rings: &self.rings,
                    dots: self.surfaces[placed.index].as_deref(),
                    emphasized: hovered == Some(spec.id) || self.selected == Some(spec.id),
                }
            })
            .collect();
        let frame = SolarFrame {
            viewport: self.scene.viewport(),
            background: SCENE_BACKGROUND,
            orbit_guide: self.orbit_guide,
            zoom: self.scene.zoom(),
            camera: self.scene.camera(),
            stars: self.scene.stars(),
            orbits: self.scene.orbit_radii(),
            bodies,
        };
        paint_solar_system(canvas, &frame)
    }

    fn pointer_down(&mut self, p: Vec2) -> bool {
        self.scene.on_pointer_down(p);
        true
    }

    fn pointer_move(&mut self, p: Vec2) {
        self.core.pointer = Some(p);
        self.scene.on_pointer_move(p);
        let target = self.scene.hit_test(p);
        self.core.apply_hover(target, |t| describe(t, None, None));
    }

    fn pointer_up(&mut self, _now: Time) {
        self.scene.on_pointer_up();
    }

    fn pointer_leave(&mut self, _now: Time) {
        self.scene.on_pointer_up();
        self.core.clear_hover();
    }

    fn wheel(&mut self, _p: Vec2, delta_y: f64) -> bool {
        self.scene.on_wheel(delta_y);
        true
    }

    fn click(&mut self, p: Vec2) {
        let target = self.scene.hit_test(p);
        if let Some(id) = target.body() {
            self.selected = Some(id);
            self.core.emit(ViewEvent::Selected(target));
        }
    }

    fn double_click(&mut self, p: Vec2) {
        if let Some(id) = self.scene.hit_test(p).body() {
            self.scene.focus_on(id);
        }
    }

    fn is_dragging(&self) -> bool {
        self.scene.is_panning()
    }

    fn cursor(&self) -> Cursor {
        cursor_for(self.core.hover.current(), self.scene.is_panning(), true)
    }

    fn hover(&self) -> &HoverTarget {
        self.core.hover.current()
    }

    fn drain_events(&mut self) -> Vec<Event<ViewEvent>> {
        self.core.events.drain()
    }

    fn metrics(&self) -> &Metrics {
        &self.core.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use formats::Category;
    use foundation::ids::RegionId;
    use layers::{MarkerPin, MarkerStatus, RegionFeature};
    use render::RecordingCanvas;
    use streaming::Resource;

    struct FailingSource;

    impl BoundarySource for FailingSource {
        async fn fetch_boundaries(&self) -> Result<String, String> {
            Err("network unreachable".to_string())
        }

        async fn fetch_names(&self) -> Result<String, String> {
            Ok("[]".to_string())
        }
    }

    /// Identity rotation, scale 200, centred in a 400 x 400 surface.
    fn globe() -> GlobeView {
        let config = ViewConfig {
            camera: CameraConfig {
                radius_divisor: 2.0,
                start_pitch_deg: 0.0,
                auto_rotate: false,
                ..CameraConfig::earth()
            },
            ..ViewConfig::earth()
        };
        let mut view = GlobeView::new(config, Aabb2::from_size(400.0, 400.0));
        view.set_markers(MarkerSet::from_pins(vec![MarkerPin {
            id: MarkerId::new("origin"),
            point: GeoPoint::new(0.0, 0.0),
            category: Category::Beach,
            status: MarkerStatus::None,
            name: "Null Island".to_string(),
            country: "Nowhere".to_string(),
        }]));
        view
    }

    fn square_index() -> RegionIndex {
        let ring = vec![
            GeoPoint::new(10.0, -20.0),
            GeoPoint::new(30.0, -20.0),
            GeoPoint::new(30.0, 20.0),
            GeoPoint::new(10.0, 20.0),
            GeoPoint::new(10.0, -20.0),
        ];
        let rings = vec![ring];
        RegionIndex::from_features(vec![RegionFeature::new(
            RegionId(0),
            "404",
            "Squareland",
            "SQ",
            &[rings.as_slice()],
        )])
    }

    fn fetch_error() -> LoadError {
        LoadError::Fetch {
            resource: Resource::Boundaries,
            message: "timeout".to_string(),
        }
    }

    #[test]
    fn marker_at_center_is_hovered() {
        let mut view = globe();
        assert_eq!(view.camera().scale(), 200.0);
        view.pointer_move(Vec2::new(200.0, 200.0));
        let events = view.drain_events();
        assert_eq!(events.len(), 1);
        match &events[0].payload {
            ViewEvent::HoverChanged { target, name, detail } => {
                assert_eq!(target.marker(), Some(&MarkerId::new("origin")));
                assert_eq!(name, "Null Island");
                assert_eq!(detail, "Nowhere");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(view.cursor(), Cursor::Pointer);
    }

    #[test]
    fn pointer_off_disc_clears_hover() {
        let mut view = globe();
        view.pointer_move(Vec2::new(200.0, 200.0));
        view.pointer_move(Vec2::new(450.0, 200.0));
        let events = view.drain_events();
        assert_eq!(events.last().map(|e| &e.payload), Some(&ViewEvent::HoverCleared));
        assert!(view.hover().is_none());
        assert_eq!(view.cursor(), Cursor::Default);
    }

    #[test]
    fn region_hover_moves_without_re_resolving() {
        let mut view = globe();
        let token = view.begin_load();
        assert!(view.finish_load(token, Ok(square_index())));
        // 20 deg east of the centre, inside the square.
        view.pointer_move(Vec2::new(268.4, 200.0));
        view.pointer_move(Vec2::new(270.0, 201.0));
        let events: Vec<ViewEvent> = view.drain_events().into_iter().map(|e| e.payload).collect();
        assert!(matches!(
            &events[0],
            ViewEvent::HoverChanged { name, detail, .. } if name == "Squareland" && detail == "SQ"
        ));
        assert_eq!(events[1], ViewEvent::HoverMoved { anchor: Vec2::new(270.0, 201.0) });
        assert_eq!(view.hover().region(), Some(RegionId(0)));
    }

    #[test]
    fn failed_fetch_settles_unavailable_and_keeps_painting() {
        let mut view = globe();
        let phase = pollster::block_on(view.load_from(&FailingSource));
        assert_eq!(phase, LoadPhase::Unavailable);
        assert!(view.dots().is_none());

        let mut canvas = RecordingCanvas::new();
        let stats = view.frame(Time(0.0), &mut canvas).unwrap();
        assert_eq!(stats.dots_drawn, 0);
        assert_eq!(stats.markers_drawn, 1);
        assert_eq!(view.metrics().counter("loads_failed"), 1);
        assert_eq!(view.metrics().counter("frames_painted"), 1);
    }

    #[test]
    fn stale_result_leaves_newer_index_untouched() {
        let mut view = globe();
        let first = view.begin_load();
        let second = view.begin_load();
        assert!(view.finish_load(second, Ok(square_index())));
        let dots = view.dots().map(<[SurfaceDot]>::len);
        assert!(dots.is_some_and(|n| n > 0));

        assert!(!view.finish_load(first, Err(fetch_error())));
        assert_eq!(view.phase(), LoadPhase::Ready);
        assert_eq!(view.dots().map(<[SurfaceDot]>::len), dots);
        assert_eq!(view.metrics().counter("loads_stale"), 1);
    }

    #[test]
    fn ready_globe_paints_dots_and_records_metrics() {
        let mut view = globe();
        let token = view.begin_load();
        view.finish_load(token, Ok(square_index()));
        let mut canvas = RecordingCanvas::new();
        let stats = view.frame(Time(0.0), &mut canvas).unwrap();
        assert!(stats.dots_drawn > 0);
        assert_eq!(view.metrics().gauge("dots_drawn"), Some(stats.dots_drawn as i64));
    }

    #[test]
    fn frames_are_paced() {
        let mut view = globe();
        let mut canvas = RecordingCanvas::new();
        assert!(view.frame(Time(1.0), &mut canvas).is_some());
        assert!(view.frame(Time(1.005), &mut canvas).is_none());
        assert!(view.frame(Time(1.017), &mut canvas).is_some());
        assert_eq!(view.metrics().counter("frames_skipped"), 1);
    }

    #[test]
    fn hidden_markers_are_not_hit() {
        let mut view = globe();
        view.set_show_markers(false);
        view.pointer_move(Vec2::new(200.0, 200.0));
        assert!(view.hover().is_none());
        assert!(view.drain_events().is_empty());
    }

    #[test]
    fn highlight_pauses_auto_rotation() {
        let mut view = GlobeView::new(ViewConfig::earth(), Aabb2::from_size(460.0, 460.0));
        let mut canvas = RecordingCanvas::new();
        view.highlight(Some(MarkerId::new("x")));
        view.frame(Time(0.0), &mut canvas);
        assert_eq!(view.camera().rotation().yaw_deg, 0.0);
        view.highlight(None);
        view.frame(Time(0.1), &mut canvas);
        assert!(view.camera().rotation().yaw_deg > 0.0);
    }

    #[test]
    fn planet_double_click_toggles_rotation() {
        let mars = bodies::body("mars").unwrap();
        let mut view = PlanetView::new(mars, ViewConfig::planet(mars), Aabb2::from_size(500.0, 500.0));
        assert!(view.dots().is_some_and(|d| !d.is_empty()));
        let mut canvas = RecordingCanvas::new();
        view.double_click(Vec2::new(250.0, 250.0));
        view.frame(Time(0.0), &mut canvas);
        assert_eq!(view.camera().rotation().yaw_deg, 0.0);
        view.double_click(Vec2::new(250.0, 250.0));
        let stats = view.frame(Time(0.1), &mut canvas).unwrap();
        assert!((view.camera().rotation().yaw_deg - 4.5).abs() < 1e-9);
        assert!(stats.dots_drawn > 0);
    }

    #[test]
    fn earth_planet_waits_for_regions() {
        let earth = bodies::body("earth").unwrap();
        let mut view = PlanetView::new(earth, ViewConfig::planet(earth), Aabb2::from_size(500.0, 500.0));
        assert!(view.dots().is_none());
        let token = view.begin_load().unwrap();
        assert!(view.finish_load(token, Ok(square_index())));
        assert!(view.dots().is_some_and(|d| !d.is_empty()));

        let mars = bodies::body("mars").unwrap();
        let mut view = PlanetView::new(mars, ViewConfig::planet(mars), Aabb2::from_size(500.0, 500.0));
        assert!(view.begin_load().is_none());
        assert_eq!(pollster::block_on(view.load_from(&FailingSource)), LoadPhase::Idle);
    }

    #[test]
    fn planet_leave_ends_drag() {
        let mars = bodies::body("mars").unwrap();
        let mut view = PlanetView::new(mars, ViewConfig::planet(mars), Aabb2::from_size(500.0, 500.0));
        assert!(view.pointer_down(Vec2::new(250.0, 250.0)));
        assert_eq!(view.cursor(), Cursor::Grabbing);
        view.pointer_leave(Time(0.0));
        assert!(!view.is_dragging());
        assert_eq!(view.cursor(), Cursor::Grab);
    }

    #[test]
    fn scene_click_selects_body() {
        let mut view = SolarSystemView::new(ViewConfig::default(), Aabb2::from_size(1600.0, 1000.0));
        view.click(Vec2::new(800.0, 500.0));
        assert_eq!(view.selected(), Some(BodyId::SUN));
        let events = view.drain_events();
        assert!(matches!(&events[0].payload, ViewEvent::Selected(t) if t.body() == Some(BodyId::SUN)));

        view.pointer_move(Vec2::new(810.0, 510.0));
        assert_eq!(view.cursor(), Cursor::Pointer);
        let events = view.drain_events();
        assert!(matches!(&events[0].payload, ViewEvent::HoverChanged { name, .. } if name == "Sun"));
    }

    #[test]
    fn scene_load_failure_only_blanks_earth() {
        let mut view = SolarSystemView::new(ViewConfig::default(), Aabb2::from_size(1600.0, 1000.0));
        assert!(view.surface(BodyId::EARTH).is_none());
        assert!(view.surface(BodyId("mars")).is_some());
        let phase = pollster::block_on(view.load_from(&FailingSource));
        assert_eq!(phase, LoadPhase::Unavailable);
        assert!(view.surface(BodyId::EARTH).is_none());

        let token = view.begin_load();
        assert!(view.finish_load(token, Ok(square_index())));
        assert!(view.surface(BodyId::EARTH).is_some_and(|d| !d.is_empty()));

        let mut canvas = RecordingCanvas::new();
        let stats = view.frame(Time(0.0), &mut canvas).unwrap();
        assert!(stats.dots_drawn > 0);
    }
}

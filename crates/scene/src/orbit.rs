//! Multi-body orbital scene: orbit angles, spins, a pannable camera and the
//! back-to-front paint order.

use foundation::bounds::Aabb2;
use foundation::ids::BodyId;
use foundation::math::{Orthographic, Rotation, StableF64, Vec2, wrap_degrees_360};
use layers::noise;
use render::Star;

use crate::bodies::{BodySpec, CATALOGUE};
use crate::picking::HoverTarget;

/// World units per unit of catalogue orbit radius.
pub const ORBIT_SCALE: f64 = 2.5;
/// On-screen pixels per unit of catalogue radius at zoom 1.
pub const BODY_SCALE: f64 = 3.0;
pub const MIN_ZOOM: f64 = 0.3;
pub const MAX_ZOOM: f64 = 5.0;
pub const ZOOM_IN_FACTOR: f64 = 1.1;
pub const ZOOM_OUT_FACTOR: f64 = 0.9;
/// Zoom applied when focusing a body.
pub const FOCUS_ZOOM: f64 = 1.5;
pub const STAR_COUNT: usize = 500;
/// Stars are scattered over `[-STAR_EXTENT, STAR_EXTENT]` on both axes.
pub const STAR_EXTENT: f64 = 2000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitingBody {
    pub spec: &'static BodySpec,
    pub angle_deg: f64,
    pub spin_deg: f64,
}

impl OrbitingBody {
    pub fn id(&self) -> BodyId {
        self.spec.id
    }

    pub fn world_position(&self) -> Vec2 {
        let r = self.spec.orbit_radius * ORBIT_SCALE;
        let a = self.angle_deg.to_radians();
        Vec2::new(r * a.cos(), r * a.sin())
    }

    /// Sine of the orbital position; larger is nearer the viewer.
    pub fn depth(&self) -> f64 {
        self.angle_deg.to_radians().sin() * self.spec.orbit_radius
    }

    fn advance(&mut self) {
        self.angle_deg = wrap_degrees_360(self.angle_deg + self.spec.orbit_speed);
        self.spin_deg = wrap_degrees_360(self.spin_deg + self.spec.spin_step_deg());
    }
}

/// A body placed on screen for the current frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlacedBody {
    /// Index into [`SolarScene::bodies`].
    pub index: usize,
    pub center: Vec2,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub struct SolarScene {
    bodies: Vec<OrbitingBody>,
    stars: Vec<Star>,
    viewport: Aabb2,
    camera: Vec2,
    zoom: f64,
    pan_from: Option<Vec2>,
}

impl SolarScene {
    /// Builds the full catalogue with seeded orbit angles and starfield.
    pub fn new(viewport: Aabb2, seed: f64) -> Self {
        let bodies = CATALOGUE
            .iter()
            .enumerate()
            .map(|(i, spec)| OrbitingBody {
                spec,
                angle_deg: noise(i as f64, 0.5, seed) * 360.0,
                spin_deg: 0.0,
            })
            .collect();
        Self {
            bodies,
            stars: starfield(seed),
            viewport,
            camera: Vec2::new(0.0, 0.0),
            zoom: 1.0,
            pan_from: None,
        }
    }

    pub fn bodies(&self) -> &[OrbitingBody] {
        &self.bodies
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn viewport(&self) -> Aabb2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Aabb2) {
        self.viewport = viewport;
    }

    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn is_panning(&self) -> bool {
        self.pan_from.is_some()
    }

    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        self.viewport.center() + (world - self.camera) * self.zoom
    }

    /// Orbit guide radii in world units, for bodies that orbit.
    pub fn orbit_radii(&self) -> Vec<f64> {
        self.bodies
            .iter()
            .filter(|b| b.spec.orbit_radius > 0.0)
            .map(|b| b.spec.orbit_radius * ORBIT_SCALE)
            .collect()
    }

    /// Advances every orbit angle and spin by one tick.
    pub fn tick(&mut self) {
        for body in &mut self.bodies {
            body.advance();
        }
    }

    /// Visible bodies, back to front.
    pub fn layout(&self) -> Vec<PlacedBody> {
        let mut order: Vec<usize> = (0..self.bodies.len()).collect();
        order.sort_by_key(|&i| StableF64(self.bodies[i].depth()));
        order
            .into_iter()
            .filter_map(|index| {
                let body = &self.bodies[index];
                let center = self.to_screen(body.world_position());
                let radius = body.spec.radius * BODY_SCALE * self.zoom;
                self.viewport
                    .intersects_circle(center, radius)
                    .then_some(PlacedBody { index, center, radius })
            })
            .collect()
    }

    /// Projection centred on a placed body, spun by its rotation.
    pub fn body_projection(&self, placed: &PlacedBody) -> Orthographic {
        let spin = self.bodies[placed.index].spin_deg;
        Orthographic::new(Rotation::yaw_pitch(spin, 0.0), placed.radius, placed.center)
    }

    /// Topmost body whose screen circle contains `p`.
    pub fn hit_test(&self, p: Vec2) -> HoverTarget {
        self.layout()
            .iter()
            .rev()
            .find(|placed| p.distance_squared(placed.center) <= placed.radius * placed.radius)
            .map_or(HoverTarget::None, |placed| HoverTarget::Body {
                id: self.bodies[placed.index].id(),
                anchor: p,
            })
    }

    pub fn on_pointer_down(&mut self, p: Vec2) {
        self.pan_from = Some(p);
    }

    /// Pans the camera opposite to the drag. Returns whether a pan is active.
    pub fn on_pointer_move(&mut self, p: Vec2) -> bool {
        let Some(from) = self.pan_from else {
            return false;
        };
        self.camera = self.camera - (p - from) * (1.0 / self.zoom);
        self.pan_from = Some(p);
        true
    }

    pub fn on_pointer_up(&mut self) {
        self.pan_from = None;
    }

    pub fn on_wheel(&mut self, delta_y: f64) {
        let factor = if delta_y > 0.0 { ZOOM_OUT_FACTOR } else { ZOOM_IN_FACTOR };
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Centres the camera on `id` and zooms in. Returns `false` for unknown ids.
    pub fn focus_on(&mut self, id: BodyId) -> bool {
        let Some(body) = self.bodies.iter().find(|b| b.id() == id) else {
            return false;
        };
        self.camera = body.world_position();
        self.zoom = FOCUS_ZOOM;
        true
    }
}

fn starfield(seed: f64) -> Vec<Star> {
    (0..STAR_COUNT)
        .map(|i| {
            let k = i as f64;
            let channel = |c: f64| noise(k, c, seed);
            Star {
                at: Vec2::new(
                    channel(1.0) * 2.0 * STAR_EXTENT - STAR_EXTENT,
                    channel(2.0) * 2.0 * STAR_EXTENT - STAR_EXTENT,
                ),
                size: channel(3.0) * 1.5 + 0.3,
                opacity: channel(4.0) * 0.6 + 0.2,
            }
        })
        .collect()
}

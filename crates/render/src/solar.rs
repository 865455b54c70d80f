//! Orbital scene painter: starfield, orbit guides and depth-sorted bodies.

use foundation::bounds::Aabb2;
use foundation::color::Color;
use foundation::math::{Orthographic, Vec2};
use layers::{BodyPalette, RingBand, SurfaceDot};

use crate::body::{
    BodyEffects, GlowStyle, paint_atmosphere, paint_glow, paint_label, paint_rings,
    paint_selection_ring, paint_silhouette,
};
use crate::canvas::Canvas;
use crate::dots::{DotBatches, DotCull, RenderStats};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Star {
    /// World position, in orbit units.
    pub at: Vec2,
    pub size: f64,
    pub opacity: f64,
}

/// One body, already placed on screen. `projection` is centred on the body
/// and scaled to its on-screen radius.
#[derive(Debug, Clone, Copy)]
pub struct SceneBody<'a> {
    pub name: &'a str,
    pub palette: &'a BodyPalette,
    pub effects: BodyEffects,
    pub projection: Orthographic,
    pub rings: &'a [RingBand],
    /// `None` while the body's surface is unavailable.
    pub dots: Option<&'a [SurfaceDot]>,
    pub emphasized: bool,
}

#[derive(Debug, Clone)]
pub struct SolarFrame<'a> {
    pub viewport: Aabb2,
    pub background: Color,
    pub orbit_guide: Color,
    pub zoom: f64,
    /// World point under the viewport centre.
    pub camera: Vec2,
    pub stars: &'a [Star],
    /// Orbit guide radii in world units.
    pub orbits: Vec<f64>,
    /// Bodies in paint order, back to front.
    pub bodies: Vec<SceneBody<'a>>,
}

impl SolarFrame<'_> {
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        self.viewport.center() + (world - self.camera) * self.zoom
    }
}

pub fn scene_glow(zoom: f64) -> GlowStyle {
    GlowStyle {
        blur: 40.0 * zoom,
        alpha: 0.4,
        offset: 10.0 * zoom,
        width: 15.0 * zoom,
    }
}

/// Dot radius for a body drawn at `radius` px inside the scene.
pub fn scene_dot_radius(radius: f64) -> f64 {
    (radius / 80.0).clamp(0.8, 2.0)
}

pub fn paint_solar_system(canvas: &mut dyn Canvas, frame: &SolarFrame<'_>) -> RenderStats {
    let mut stats = RenderStats::default();
    let viewport = frame.viewport;

    canvas.set_fill(frame.background.into());
    canvas.fill_rect(viewport.min[0], viewport.min[1], viewport.width(), viewport.height());

    let star_box = viewport.inflate(10.0);
    for star in frame.stars {
        let at = frame.to_screen(star.at);
        if !star_box.contains(at) {
            continue;
        }
        canvas.set_fill(Color::WHITE.with_alpha(star.opacity as f32).into());
        canvas.begin_path();
        canvas.arc(at.x, at.y, star.size * frame.zoom, 0.0, std::f64::consts::TAU, false);
        canvas.fill();
    }

    let origin = frame.to_screen(Vec2::new(0.0, 0.0));
    canvas.set_stroke(frame.orbit_guide.into());
    canvas.set_line_width(1.0);
    for &radius in &frame.orbits {
        canvas.begin_path();
        canvas.arc(origin.x, origin.y, radius * frame.zoom, 0.0, std::f64::consts::TAU, false);
        canvas.stroke();
    }

    for body in &frame.bodies {
        stats.merge(paint_scene_body(canvas, body, viewport, frame.zoom));
        stats.markers_drawn += 1;
    }
    stats
}

fn paint_scene_body(canvas: &mut dyn Canvas, body: &SceneBody<'_>, viewport: Aabb2, zoom: f64) -> RenderStats {
    let mut stats = RenderStats::default();
    let center = body.projection.translate();
    let radius = body.projection.scale();

    if body.emphasized {
        paint_selection_ring(canvas, center, radius, body.palette.light, zoom);
    }
    paint_silhouette(canvas, center, radius, body.palette.dark);

    if let Some(dots) = body.dots {
        let cull = DotCull::new(viewport, 10.0, radius, 1.0);
        let mut batches = DotBatches::new();
        for dot in dots {
            match cull.project(&body.projection, dot.point) {
                Some(at) => batches.push(dot.color, at),
                None => stats.dots_culled += 1,
            }
        }
        stats.dots_drawn = batches.point_count();
        stats.color_batches = batches.paint(canvas, scene_dot_radius(radius));
    }

    if body.effects.glow {
        paint_glow(canvas, center, radius, body.palette, scene_glow(zoom));
    }
    if body.effects.rings {
        paint_rings(canvas, center, radius, body.rings, body.projection.rotation().pitch_deg);
    }
    if body.effects.atmosphere {
        paint_atmosphere(canvas, center, radius, body.palette.base, 1.08);
    }
    paint_label(canvas, body.name, center, radius, zoom);
    stats
}

#[cfg(test)]
mod tests {
    use super::{SceneBody, SolarFrame, Star, paint_solar_system, scene_dot_radius};
    use crate::body::BodyEffects;
    use crate::recording::{DrawCommand, RecordingCanvas};
    use foundation::bounds::Aabb2;
    use foundation::color::Color;
    use foundation::math::{Orthographic, Rotation, Vec2};
    use layers::BodyPalette;

    const SUN: BodyPalette = BodyPalette::new(
        Color::hex(0xfdb813),
        Color::hex(0xfff4e0),
        Color::hex(0xff8c00),
    );

    #[test]
    fn offscreen_stars_are_skipped() {
        let stars = [
            Star { at: Vec2::new(0.0, 0.0), size: 1.0, opacity: 0.5 },
            Star { at: Vec2::new(900.0, 0.0), size: 1.0, opacity: 0.5 },
        ];
        let frame = SolarFrame {
            viewport: Aabb2::from_size(400.0, 400.0),
            background: Color::BLACK,
            orbit_guide: Color::rgba(59, 130, 246, 0.15),
            zoom: 1.0,
            camera: Vec2::new(0.0, 0.0),
            stars: &stars,
            orbits: vec![375.0, 525.0],
            bodies: Vec::new(),
        };
        let mut canvas = RecordingCanvas::new();
        paint_solar_system(&mut canvas, &frame);
        assert_eq!(canvas.solid_fills().len(), 1);
        assert_eq!(canvas.count(|c| matches!(c, DrawCommand::Stroke { .. })), 2);
    }

    #[test]
    fn sun_gets_glow_and_label() {
        let frame = SolarFrame {
            viewport: Aabb2::from_size(800.0, 800.0),
            background: Color::BLACK,
            orbit_guide: Color::rgba(59, 130, 246, 0.15),
            zoom: 1.0,
            camera: Vec2::new(0.0, 0.0),
            stars: &[],
            orbits: Vec::new(),
            bodies: vec![SceneBody {
                name: "Sun",
                palette: &SUN,
                effects: BodyEffects { glow: true, rings: false, atmosphere: false },
                projection: Orthographic::new(Rotation::IDENTITY, 240.0, Vec2::new(400.0, 400.0)),
                rings: &[],
                dots: None,
                emphasized: false,
            }],
        };
        let mut canvas = RecordingCanvas::new();
        let stats = paint_solar_system(&mut canvas, &frame);
        assert_eq!(stats.markers_drawn, 1);
        assert_eq!(canvas.texts(), vec!["Sun"]);
        assert!(canvas.commands.iter().any(|c| matches!(
            c,
            DrawCommand::Stroke { width, shadow_blur, .. } if *width == 15.0 && *shadow_blur == 40.0
        )));
        assert_eq!(scene_dot_radius(240.0), 2.0);
    }
}

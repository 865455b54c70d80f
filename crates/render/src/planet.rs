//! Single-body globe painter.

use foundation::bounds::Aabb2;
use foundation::color::Color;
use foundation::math::Orthographic;
use layers::{BodyPalette, RingBand, SurfaceDot};

use crate::body::{
    BodyEffects, GlowStyle, paint_atmosphere, paint_depth_cue, paint_glow, paint_rings,
    paint_silhouette,
};
use crate::canvas::Canvas;
use crate::dots::{DotBatches, DotCull, RenderStats};

pub const PLANET_GLOW: GlowStyle = GlowStyle {
    blur: 60.0,
    alpha: 0.3,
    offset: 20.0,
    width: 20.0,
};

#[derive(Debug, Clone, Copy)]
pub struct PlanetFrame<'a> {
    pub projection: &'a Orthographic,
    pub viewport: Aabb2,
    pub background: Color,
    pub palette: &'a BodyPalette,
    pub effects: BodyEffects,
    pub rings: &'a [RingBand],
    pub dots: &'a [SurfaceDot],
}

/// Dot radius for a body drawn at `radius` px.
pub fn planet_dot_radius(radius: f64) -> f64 {
    (radius / 150.0).clamp(1.2, 2.5)
}

pub fn paint_planet(canvas: &mut dyn Canvas, frame: &PlanetFrame<'_>) -> RenderStats {
    let mut stats = RenderStats::default();
    let projection = frame.projection;
    let center = projection.translate();
    let radius = projection.scale();
    let palette = frame.palette;

    canvas.set_fill(frame.background.into());
    canvas.fill_rect(
        frame.viewport.min[0],
        frame.viewport.min[1],
        frame.viewport.width(),
        frame.viewport.height(),
    );

    paint_silhouette(canvas, center, radius, palette.dark);
    paint_depth_cue(
        canvas,
        center,
        radius,
        palette.light.with_alpha(0x22 as f32 / 255.0),
        Color::TRANSPARENT,
    );

    let cull = DotCull::new(frame.viewport, 0.0, radius, 1.0);
    let mut batches = DotBatches::new();
    for dot in frame.dots {
        match cull.project(projection, dot.point) {
            Some(at) => batches.push(dot.color, at),
            None => stats.dots_culled += 1,
        }
    }
    stats.dots_drawn = batches.point_count();
    stats.color_batches = batches.paint(canvas, planet_dot_radius(radius));

    if frame.effects.glow {
        paint_glow(canvas, center, radius, palette, PLANET_GLOW);
    }
    if frame.effects.rings {
        paint_rings(canvas, center, radius, frame.rings, projection.rotation().pitch_deg);
    }
    if frame.effects.atmosphere {
        paint_atmosphere(canvas, center, radius, palette.base, 1.05);
    }
    stats
}

//! Per-body decoration: glow, rings, atmosphere and labels.

use foundation::color::Color;
use foundation::math::Vec2;
use layers::{BodyPalette, RingBand};

use crate::canvas::{Canvas, RadialGradient, TextAlign};

/// Which decorations a body gets. Resolved once per body.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct BodyEffects {
    pub glow: bool,
    pub rings: bool,
    pub atmosphere: bool,
}

/// Halo stroked around a glowing body.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlowStyle {
    pub blur: f64,
    pub alpha: f64,
    /// Gap between the body edge and the ring centre line.
    pub offset: f64,
    pub width: f64,
}

pub fn paint_silhouette(canvas: &mut dyn Canvas, center: Vec2, radius: f64, color: Color) {
    canvas.begin_path();
    canvas.arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU, false);
    canvas.set_fill(color.into());
    canvas.fill();
}

/// Soft highlight offset toward the upper left.
pub fn paint_depth_cue(canvas: &mut dyn Canvas, center: Vec2, radius: f64, inner: Color, outer: Color) {
    let gradient = RadialGradient::new(
        (center.x - radius * 0.3, center.y - radius * 0.3, 0.0),
        (center.x, center.y, radius),
    )
    .stop(0.0, inner)
    .stop(1.0, outer);
    canvas.begin_path();
    canvas.arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU, false);
    canvas.set_fill(gradient.into());
    canvas.fill();
}

pub fn paint_glow(canvas: &mut dyn Canvas, center: Vec2, radius: f64, palette: &BodyPalette, style: GlowStyle) {
    canvas.set_shadow(style.blur, palette.base);
    canvas.set_global_alpha(style.alpha);
    canvas.begin_path();
    canvas.arc(center.x, center.y, radius + style.offset, 0.0, std::f64::consts::TAU, false);
    canvas.set_stroke(palette.light.into());
    canvas.set_line_width(style.width);
    canvas.stroke();
    canvas.set_shadow(0.0, Color::TRANSPARENT);
    canvas.set_global_alpha(1.0);
}

/// Flat annuli squashed vertically by the viewing tilt.
pub fn paint_rings(canvas: &mut dyn Canvas, center: Vec2, radius: f64, bands: &[RingBand], tilt_deg: f64) {
    let squash = tilt_deg.to_radians().cos() * 0.5 + 0.3;
    canvas.save();
    canvas.translate(center.x, center.y);
    canvas.scale(1.0, squash);
    for band in bands {
        canvas.begin_path();
        canvas.arc(0.0, 0.0, radius * band.outer, 0.0, std::f64::consts::TAU, false);
        canvas.arc(0.0, 0.0, radius * band.inner, std::f64::consts::TAU, 0.0, true);
        canvas.set_fill(band.color.into());
        canvas.fill();
    }
    canvas.restore();
}

/// Rim glow from `0.95 * radius` out to `outer * radius`.
pub fn paint_atmosphere(canvas: &mut dyn Canvas, center: Vec2, radius: f64, color: Color, outer: f64) {
    let gradient = RadialGradient::new((center.x, center.y, radius * 0.95), (center.x, center.y, radius * outer))
        .stop(0.0, Color::TRANSPARENT)
        .stop(1.0, color.with_alpha(0x40 as f32 / 255.0));
    canvas.begin_path();
    canvas.arc(center.x, center.y, radius * outer, 0.0, std::f64::consts::TAU, false);
    canvas.set_fill(gradient.into());
    canvas.fill();
}

/// Name under bodies larger than 20 px.
pub fn paint_label(canvas: &mut dyn Canvas, name: &str, center: Vec2, radius: f64, zoom: f64) -> bool {
    if radius <= 20.0 {
        return false;
    }
    canvas.set_fill(Color::rgba(255, 255, 255, 0.9).into());
    canvas.set_font(&format!("{}px monospace", (radius / 5.0).max(10.0)));
    canvas.set_text_align(TextAlign::Center);
    canvas.fill_text(name, center.x, center.y + radius + 15.0 * zoom);
    true
}

pub fn paint_selection_ring(canvas: &mut dyn Canvas, center: Vec2, radius: f64, color: Color, zoom: f64) {
    canvas.set_shadow(20.0 * zoom, color);
    canvas.begin_path();
    canvas.arc(center.x, center.y, radius + 4.0, 0.0, std::f64::consts::TAU, false);
    canvas.set_stroke(color.into());
    canvas.set_line_width(2.0);
    canvas.stroke();
    canvas.set_shadow(0.0, Color::TRANSPARENT);
}

#[cfg(test)]
mod tests {
    use super::{paint_label, paint_rings};
    use crate::recording::{DrawCommand, RecordingCanvas};
    use foundation::math::Vec2;
    use layers::saturn_ring_bands;

    #[test]
    fn rings_are_isolated_in_a_saved_state() {
        let mut canvas = RecordingCanvas::new();
        paint_rings(&mut canvas, Vec2::new(10.0, 20.0), 50.0, &saturn_ring_bands(), 0.0);
        assert_eq!(canvas.commands.first(), Some(&DrawCommand::Save));
        assert_eq!(canvas.commands.last(), Some(&DrawCommand::Restore));
        assert!(canvas.commands.contains(&DrawCommand::Scale { x: 1.0, y: 0.8 }));
        assert_eq!(canvas.solid_fills().len(), 8);
        assert!(canvas.solid_fills().iter().all(|&(_, arcs)| arcs == 2));
    }

    #[test]
    fn labels_only_for_large_bodies() {
        let mut canvas = RecordingCanvas::new();
        assert!(!paint_label(&mut canvas, "Mercury", Vec2::new(0.0, 0.0), 15.0, 1.0));
        assert!(paint_label(&mut canvas, "Jupiter", Vec2::new(0.0, 0.0), 180.0, 1.0));
        assert_eq!(canvas.texts(), vec!["Jupiter"]);
        match &canvas.commands[0] {
            DrawCommand::Text { font, y, .. } => {
                assert_eq!(font, "36px monospace");
                assert_eq!(*y, 195.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

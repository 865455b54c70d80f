//! Earth globe painter: ocean disc, graticule, region dots and pins.

use std::f64::consts::{PI, TAU};

use foundation::bounds::Aabb2;
use foundation::color::Color;
use foundation::ids::{MarkerId, RegionId};
use foundation::math::{GeoPoint, Orthographic};
use layers::{GlobeTheme, MarkerSet, SurfaceDot};

use crate::body::paint_depth_cue;
use crate::canvas::Canvas;
use crate::dots::{DotBatches, DotCull, RenderStats};
use crate::graticule::trace_lines;

/// Limb trim for dots, as a fraction of `scale^2`.
pub const DOT_LIMB: f64 = 0.98;
/// Limb trim for pins, as a fraction of `scale^2`.
pub const PIN_LIMB: f64 = 0.95;
pub const PIN_BASE_SIZE: f64 = 7.0;
pub const PIN_EMPHASIS: f64 = 1.4;

/// Everything the globe paint reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct GlobeFrame<'a> {
    pub projection: &'a Orthographic,
    pub viewport: Aabb2,
    /// Current scale over the base radius.
    pub zoom: f64,
    pub theme: &'a GlobeTheme,
    pub graticule: &'a [Vec<GeoPoint>],
    /// `None` while boundary data is pending or unavailable.
    pub dots: Option<&'a [SurfaceDot]>,
    pub hovered_region: Option<RegionId>,
    /// `None` when pins are hidden.
    pub markers: Option<&'a MarkerSet>,
    pub hovered_marker: Option<&'a MarkerId>,
    pub highlighted_marker: Option<&'a MarkerId>,
}

pub fn paint_globe(canvas: &mut dyn Canvas, frame: &GlobeFrame<'_>) -> RenderStats {
    let mut stats = RenderStats::default();
    let theme = frame.theme;
    let projection = frame.projection;
    let center = projection.translate();
    let scale = projection.scale();

    canvas.set_fill(theme.background.into());
    canvas.fill_rect(
        frame.viewport.min[0],
        frame.viewport.min[1],
        frame.viewport.width(),
        frame.viewport.height(),
    );

    paint_depth_cue(canvas, center, scale, theme.ocean_inner, theme.ocean_outer);
    canvas.set_stroke(theme.rim.into());
    canvas.set_line_width(theme.rim_width);
    canvas.stroke();

    canvas.begin_path();
    trace_lines(canvas, projection, frame.graticule);
    canvas.set_stroke(theme.graticule.into());
    canvas.set_line_width(theme.graticule_width);
    canvas.stroke();

    if let Some(dots) = frame.dots {
        let cull = DotCull::new(frame.viewport, 10.0, scale, DOT_LIMB);
        let mut batches = DotBatches::new();
        for dot in dots {
            let Some(at) = cull.project(projection, dot.point) else {
                stats.dots_culled += 1;
                continue;
            };
            let color = match frame.hovered_region {
                Some(hovered) if dot.region != Some(hovered) => theme.dimmed,
                _ => dot.color,
            };
            batches.push(color, at);
        }
        stats.dots_drawn = batches.point_count();
        stats.color_batches = batches.paint(canvas, (1.4 * frame.zoom).max(1.0));
    }

    if let Some(markers) = frame.markers {
        let cull = DotCull::new(frame.viewport, 0.0, scale, PIN_LIMB);
        for pin in markers.pins() {
            let Some(at) = cull.project(projection, pin.point) else {
                continue;
            };
            let emphasized = Some(&pin.id) == frame.hovered_marker
                || Some(&pin.id) == frame.highlighted_marker;
            let size = PIN_BASE_SIZE * frame.zoom * if emphasized { PIN_EMPHASIS } else { 1.0 };
            paint_pin(canvas, at.x, at.y, size, pin.color(), emphasized);
            stats.markers_drawn += 1;
        }
    }

    stats
}

/// Teardrop with its tip at `(x, y)` and a white eye.
fn paint_pin(canvas: &mut dyn Canvas, x: f64, y: f64, size: f64, fill: Color, emphasized: bool) {
    let head_y = y - size * 0.9 - size * 0.3;
    let head_r = size * 0.6;

    canvas.begin_path();
    canvas.move_to(x, y);
    canvas.line_to(x - head_r, head_y);
    canvas.arc(x, head_y, head_r, PI, 0.0, false);
    canvas.close_path();
    canvas.set_fill(fill.into());
    canvas.fill();
    if emphasized {
        canvas.set_stroke(Color::WHITE.into());
        canvas.set_line_width(2.0);
        canvas.stroke();
    }

    canvas.begin_path();
    canvas.arc(x, head_y, size * 0.22, 0.0, TAU, false);
    canvas.set_fill(Color::WHITE.into());
    canvas.fill();
}

#[cfg(test)]
mod tests {
    use super::{GlobeFrame, paint_globe};
    use crate::canvas::Paint;
    use crate::graticule::graticule_lines;
    use crate::recording::{DrawCommand, RecordingCanvas};
    use formats::Category;
    use foundation::bounds::Aabb2;
    use foundation::color::Color;
    use foundation::ids::{MarkerId, RegionId};
    use foundation::math::{GeoPoint, Orthographic, Rotation, Vec2};
    use layers::{GlobeTheme, MarkerPin, MarkerSet, MarkerStatus, SurfaceDot};

    fn dot(lon: f64, lat: f64, color: u32, region: u32) -> SurfaceDot {
        SurfaceDot {
            point: GeoPoint::new(lon, lat),
            color: Color::hex(color),
            region: Some(RegionId(region)),
        }
    }

    fn frame<'a>(
        projection: &'a Orthographic,
        theme: &'a GlobeTheme,
        dots: Option<&'a [SurfaceDot]>,
        markers: Option<&'a MarkerSet>,
    ) -> GlobeFrame<'a> {
        GlobeFrame {
            projection,
            viewport: Aabb2::from_size(400.0, 400.0),
            zoom: 1.0,
            theme,
            graticule: &[],
            dots,
            hovered_region: None,
            markers,
            hovered_marker: None,
            highlighted_marker: None,
        }
    }

    fn projection() -> Orthographic {
        Orthographic::new(Rotation::IDENTITY, 200.0, Vec2::new(200.0, 200.0))
    }

    #[test]
    fn k_colors_give_k_fills() {
        let dots: Vec<SurfaceDot> = (0..60)
            .map(|i| dot(-30.0 + i as f64, (i % 7) as f64, [0x3b82f6, 0xef4444, 0x22c55e, 0x4a5568][i % 4], 0))
            .collect();
        let projection = projection();
        let theme = GlobeTheme::default();
        let mut canvas = RecordingCanvas::new();
        let stats = paint_globe(&mut canvas, &frame(&projection, &theme, Some(&dots), None));

        assert_eq!(stats.color_batches, 4);
        assert_eq!(stats.dots_drawn, 60);
        let dot_fills: Vec<_> = canvas.solid_fills().into_iter().filter(|&(_, arcs)| arcs > 1).collect();
        assert_eq!(dot_fills.len(), 4);
        assert_eq!(dot_fills.iter().map(|&(_, arcs)| arcs).sum::<usize>(), 60);
    }

    #[test]
    fn far_side_dots_are_culled_and_hover_dims_others() {
        let dots = vec![dot(0.0, 0.0, 0x3b82f6, 1), dot(10.0, 0.0, 0xef4444, 2), dot(180.0, 0.0, 0x22c55e, 3)];
        let projection = projection();
        let theme = GlobeTheme::default();
        let mut f = frame(&projection, &theme, Some(&dots), None);
        f.hovered_region = Some(RegionId(1));
        let mut canvas = RecordingCanvas::new();
        let stats = paint_globe(&mut canvas, &f);

        assert_eq!(stats.dots_culled, 1);
        assert_eq!(stats.dots_drawn, 2);
        let fills = canvas.solid_fills();
        assert!(fills.contains(&(Color::hex(0x3b82f6), 1)));
        assert!(fills.contains(&(theme.dimmed, 1)));
        assert!(!fills.iter().any(|&(c, _)| c == Color::hex(0xef4444)));
    }

    #[test]
    fn unavailable_data_still_paints_disc_and_pins() {
        let pins = MarkerSet::from_pins(vec![MarkerPin {
            id: MarkerId::new("paris"),
            point: GeoPoint::new(2.35, 48.85),
            category: Category::City,
            status: MarkerStatus::Visited,
            name: "Paris".into(),
            country: "France".into(),
        }]);
        let projection = projection();
        let theme = GlobeTheme::default();
        let mut canvas = RecordingCanvas::new();
        let stats = paint_globe(&mut canvas, &frame(&projection, &theme, None, Some(&pins)));

        assert_eq!(stats.dots_drawn, 0);
        assert_eq!(stats.markers_drawn, 1);
        assert!(matches!(canvas.commands[0], DrawCommand::FillRect { .. }));
        assert!(canvas.commands.iter().any(|c| matches!(c, DrawCommand::Fill { paint: Paint::Radial(_), .. })));
        assert!(canvas.solid_fills().contains(&(Color::hex(0x22c55e), 1)));
    }

    #[test]
    fn graticule_is_one_stroke() {
        let projection = projection();
        let theme = GlobeTheme::default();
        let lines = graticule_lines(10.0);
        let mut f = frame(&projection, &theme, None, None);
        f.graticule = &lines;
        let mut canvas = RecordingCanvas::new();
        paint_globe(&mut canvas, &f);
        let strokes = canvas.count(|c| matches!(c, DrawCommand::Stroke { .. }));
        // rim and graticule
        assert_eq!(strokes, 2);
    }
}

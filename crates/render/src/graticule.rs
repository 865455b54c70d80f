//! Meridian and parallel polylines, stroked through the projection.

use foundation::math::{GeoPoint, Orthographic};

use crate::canvas::Canvas;

/// Sampling step along each line in degrees.
const PRECISION_DEG: f64 = 2.5;

/// Meridians every `step_deg` reach 80 degrees of latitude, except those on
/// multiples of 90 which run pole to pole. Parallels stop at 80 degrees.
pub fn graticule_lines(step_deg: f64) -> Vec<Vec<GeoPoint>> {
    if !(step_deg > 0.0) || !step_deg.is_finite() {
        return Vec::new();
    }
    let mut lines = Vec::new();

    let meridians = (360.0 / step_deg).round() as i64;
    for i in 0..meridians {
        let lon = -180.0 + i as f64 * step_deg;
        let extent = if (lon % 90.0).abs() < 1e-9 { 90.0 } else { 80.0 };
        lines.push(sample(-extent, extent, |lat| GeoPoint::new(lon, lat)));
    }

    let parallels = (80.0 / step_deg).floor() as i64;
    for j in -parallels..=parallels {
        let lat = j as f64 * step_deg;
        lines.push(sample(-180.0, 180.0, |lon| GeoPoint::new(lon, lat)));
    }
    lines
}

fn sample(from: f64, to: f64, at: impl Fn(f64) -> GeoPoint) -> Vec<GeoPoint> {
    let steps = ((to - from) / PRECISION_DEG).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|k| at(from + (to - from) * k as f64 / steps as f64))
        .collect()
}

/// Adds the visible parts of `lines` to the current path. A line is broken
/// wherever it passes behind the body. Returns the number of subpaths.
pub fn trace_lines(canvas: &mut dyn Canvas, projection: &Orthographic, lines: &[Vec<GeoPoint>]) -> usize {
    let mut subpaths = 0;
    for line in lines {
        let mut pen_down = false;
        for &p in line {
            match projection.project(p) {
                Some(s) if pen_down => canvas.line_to(s.x, s.y),
                Some(s) => {
                    canvas.move_to(s.x, s.y);
                    pen_down = true;
                    subpaths += 1;
                }
                None => pen_down = false,
            }
        }
    }
    subpaths
}

#[cfg(test)]
mod tests {
    use super::{graticule_lines, trace_lines};
    use crate::recording::RecordingCanvas;
    use foundation::math::{Orthographic, Rotation, Vec2};

    #[test]
    fn ten_degree_graticule_shape() {
        let lines = graticule_lines(10.0);
        // 36 meridians and parallels from -80 to 80
        assert_eq!(lines.len(), 36 + 17);
        let greenwich = &lines[18];
        assert_eq!(greenwich[0].lon_deg, 0.0);
        assert_eq!(greenwich[0].lat_deg, -90.0);
        let ten_east = &lines[19];
        assert_eq!(ten_east[0].lat_deg, -80.0);
        assert!(graticule_lines(0.0).is_empty());
    }

    #[test]
    fn far_side_splits_lines() {
        let projection = Orthographic::new(Rotation::IDENTITY, 100.0, Vec2::new(0.0, 0.0));
        let lines = graticule_lines(10.0);
        let equator = &lines[36 + 8];
        assert_eq!(equator[0].lat_deg, 0.0);
        let mut canvas = RecordingCanvas::new();
        // -180..-90 hidden, -87.5..87.5 visible, 90..180 hidden
        assert_eq!(trace_lines(&mut canvas, &projection, std::slice::from_ref(equator)), 1);
    }
}

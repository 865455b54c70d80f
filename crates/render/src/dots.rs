use std::collections::BTreeMap;

use foundation::bounds::Aabb2;
use foundation::color::Color;
use foundation::math::{GeoPoint, Orthographic, Vec2};

use crate::canvas::Canvas;

/// Counters returned by every paint.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub dots_drawn: usize,
    pub dots_culled: usize,
    pub color_batches: usize,
    pub markers_drawn: usize,
}

impl RenderStats {
    pub fn merge(&mut self, other: RenderStats) {
        self.dots_drawn += other.dots_drawn;
        self.dots_culled += other.dots_culled;
        self.color_batches += other.color_batches;
        self.markers_drawn += other.markers_drawn;
    }
}

/// Cheap rejection tests applied to every projected dot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DotCull {
    /// Screen box a dot must fall in.
    pub viewport: Aabb2,
    /// Dots farther than `sqrt(limb_sq)` from the disc centre are dropped.
    pub limb_sq: f64,
}

impl DotCull {
    pub fn new(viewport: Aabb2, margin: f64, scale: f64, limb_factor: f64) -> Self {
        Self {
            viewport: viewport.inflate(margin),
            limb_sq: scale * scale * limb_factor,
        }
    }

    /// Screen position of `p`, or `None` when it is behind the body, off
    /// screen or on the limb.
    pub fn project(&self, projection: &Orthographic, p: GeoPoint) -> Option<Vec2> {
        let s = projection.project(p)?;
        if !self.viewport.contains(s) {
            return None;
        }
        if s.distance_squared(projection.translate()) > self.limb_sq {
            return None;
        }
        Some(s)
    }
}

/// Screen points grouped by fill colour, painted as one path per colour.
#[derive(Debug, Clone, Default)]
pub struct DotBatches {
    groups: BTreeMap<Color, Vec<Vec2>>,
}

impl DotBatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, color: Color, at: Vec2) {
        self.groups.entry(color).or_default().push(at);
    }

    pub fn batch_count(&self) -> usize {
        self.groups.len()
    }

    pub fn point_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// One fill per colour. Returns the number of fills issued.
    pub fn paint(&self, canvas: &mut dyn Canvas, radius: f64) -> usize {
        for (color, points) in &self.groups {
            canvas.set_fill((*color).into());
            canvas.begin_path();
            for p in points {
                canvas.circle(p.x, p.y, radius);
            }
            canvas.fill();
        }
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{DotBatches, DotCull};
    use crate::recording::RecordingCanvas;
    use foundation::bounds::Aabb2;
    use foundation::color::Color;
    use foundation::math::{GeoPoint, Orthographic, Rotation, Vec2};

    #[test]
    fn one_fill_per_color() {
        let mut batches = DotBatches::new();
        let colors = [Color::hex(0xff0000), Color::hex(0x00ff00), Color::hex(0x0000ff)];
        for i in 0..30 {
            batches.push(colors[i % 3], Vec2::new(i as f64, 0.0));
        }
        assert_eq!(batches.batch_count(), 3);
        let mut canvas = RecordingCanvas::new();
        assert_eq!(batches.paint(&mut canvas, 1.0), 3);
        let fills = canvas.solid_fills();
        assert_eq!(fills.len(), 3);
        assert!(fills.iter().all(|&(_, arcs)| arcs == 10));
        assert_eq!(batches.point_count(), 30);
    }

    #[test]
    fn cull_rejects_far_side_and_limb() {
        let projection = Orthographic::new(Rotation::IDENTITY, 100.0, Vec2::new(200.0, 200.0));
        let cull = DotCull::new(Aabb2::from_size(400.0, 400.0), 10.0, 100.0, 0.98);
        assert_eq!(cull.project(&projection, GeoPoint::new(0.0, 0.0)), Some(Vec2::new(200.0, 200.0)));
        assert_eq!(cull.project(&projection, GeoPoint::new(180.0, 0.0)), None);
        // 89.5 degrees from centre lands at ~99.996 px, beyond sqrt(0.98) * 100
        assert_eq!(cull.project(&projection, GeoPoint::new(89.5, 0.0)), None);
        assert!(cull.project(&projection, GeoPoint::new(60.0, 0.0)).is_some());
    }
}

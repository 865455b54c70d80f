use crate::math::Vec2;

/// Axis-aligned screen-space box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Box covering a `width` x `height` surface anchored at the origin.
    pub fn from_size(width: f64, height: f64) -> Self {
        Aabb2::new([0.0, 0.0], [width, height])
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        )
    }

    /// Grows (or shrinks, for negative `margin`) every side by `margin`.
    pub fn inflate(&self, margin: f64) -> Self {
        Aabb2::new(
            [self.min[0] - margin, self.min[1] - margin],
            [self.max[0] + margin, self.max[1] + margin],
        )
    }

    /// Inclusive containment.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min[0] && p.x <= self.max[0] && p.y >= self.min[1] && p.y <= self.max[1]
    }

    /// True when a circle of radius `r` around `c` touches the box.
    pub fn intersects_circle(&self, c: Vec2, r: f64) -> bool {
        self.inflate(r).contains(c)
    }
}

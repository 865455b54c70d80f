//! Orthographic projection of a unit sphere onto a 2D surface.
//!
//! Screen space has `y` growing downward. A point projects to
//! `translate + scale * (view.y, -view.z)` where `view` is the rotated unit
//! vector; it is visible only when `view.x > 0` (strictly in front of the
//! terminator).

use super::{GeoPoint, Rotation, RotationMatrix, Vec2, Vec3};

/// Slack on the unit disc in [`Orthographic::invert`], as a squared radius.
pub const RIM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orthographic {
    rotation: Rotation,
    matrix: RotationMatrix,
    scale: f64,
    translate: Vec2,
}

impl Orthographic {
    pub fn new(rotation: Rotation, scale: f64, translate: Vec2) -> Self {
        Self {
            rotation,
            matrix: RotationMatrix::new(rotation),
            scale,
            translate,
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Radius of the projected disc in pixels.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen position of the disc center.
    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    /// View-space unit vector for `p` (x toward the viewer).
    #[inline]
    pub fn rotate(&self, p: GeoPoint) -> Vec3 {
        self.matrix.apply(p)
    }

    #[inline]
    pub fn view_to_screen(&self, v: Vec3) -> Vec2 {
        Vec2::new(
            self.translate.x + self.scale * v.y,
            self.translate.y - self.scale * v.z,
        )
    }

    /// Strict front-facing test on a view-space vector. The terminator
    /// (`x == 0`) counts as hidden.
    #[inline]
    pub fn faces_viewer(v: Vec3) -> bool {
        v.x > 0.0
    }

    /// Screen position of `p`, or `None` when `p` is on the far hemisphere.
    #[inline]
    pub fn project(&self, p: GeoPoint) -> Option<Vec2> {
        let v = self.rotate(p);
        Self::faces_viewer(v).then(|| self.view_to_screen(v))
    }

    pub fn is_visible(&self, p: GeoPoint) -> bool {
        Self::faces_viewer(self.rotate(p))
    }

    /// True when `s` lies inside the projected disc (boundary included).
    pub fn disc_contains(&self, s: Vec2) -> bool {
        s.distance_squared(self.translate) <= self.scale * self.scale
    }

    /// Geographic point under `s`, or `None` outside the disc. Points within
    /// [`RIM_TOLERANCE`] of the rim snap onto it, so anything [`Self::project`]
    /// returns inverts.
    pub fn invert(&self, s: Vec2) -> Option<GeoPoint> {
        if !(self.scale > 0.0) {
            return None;
        }
        let y = (s.x - self.translate.x) / self.scale;
        let z = (self.translate.y - s.y) / self.scale;
        let r2 = y * y + z * z;
        if !(r2 <= 1.0 + RIM_TOLERANCE) {
            return None;
        }
        let x = (1.0 - r2).max(0.0).sqrt();
        Some(self.matrix.invert(Vec3::new(x, y, z)))
    }
}

#[cfg(test)]
mod tests {
    use super::Orthographic;
    use crate::math::{GeoPoint, Rotation, Vec2, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} != {b} (eps={eps})");
    }

    fn centered(rotation: Rotation) -> Orthographic {
        Orthographic::new(rotation, 200.0, Vec2::new(200.0, 200.0))
    }

    #[test]
    fn identity_projects_origin_to_center() {
        let proj = centered(Rotation::IDENTITY);
        let s = proj.project(GeoPoint::new(0.0, 0.0)).unwrap();
        assert_close(s.x, 200.0, 1e-9);
        assert_close(s.y, 200.0, 1e-9);

        // North is up, east is right.
        let north = proj.project(GeoPoint::new(0.0, 30.0)).unwrap();
        assert!(north.y < 200.0);
        let east = proj.project(GeoPoint::new(30.0, 0.0)).unwrap();
        assert!(east.x > 200.0);
    }

    #[test]
    fn far_hemisphere_is_clipped() {
        let proj = centered(Rotation::IDENTITY);
        assert!(proj.project(GeoPoint::new(180.0, 0.0)).is_none());
        assert!(proj.project(GeoPoint::new(120.0, 10.0)).is_none());
        assert!(!proj.is_visible(GeoPoint::new(-135.0, 0.0)));
    }

    #[test]
    fn terminator_is_not_visible() {
        assert!(!Orthographic::faces_viewer(Vec3::new(0.0, 1.0, 0.0)));
        assert!(!Orthographic::faces_viewer(Vec3::new(-0.0, 0.0, 1.0)));
        assert!(Orthographic::faces_viewer(Vec3::new(1e-12, 0.0, 1.0)));
    }

    #[test]
    fn invert_outside_disc_is_none() {
        let proj = centered(Rotation::IDENTITY);
        assert!(proj.invert(Vec2::new(450.0, 200.0)).is_none());
        assert!(proj.invert(Vec2::new(200.0, 200.0)).is_some());
        assert!(!proj.disc_contains(Vec2::new(200.0 + 250.0, 200.0)));
    }

    #[test]
    fn equator_under_polar_view_inverts() {
        // Rounding leaves these equator points a hair in front of the
        // terminator and a hair outside the disc.
        let proj = Orthographic::new(Rotation::yaw_pitch(359.0, 90.0), 173.0, Vec2::new(320.0, 240.0));
        for lon in [-59.5, -49.5, 0.5, 40.5, 90.5] {
            let p = GeoPoint::new(lon, 0.0);
            if let Some(s) = proj.project(p) {
                let q = proj.invert(s).unwrap();
                assert!(p.angular_distance_deg(q) < 1e-5, "{p:?} -> {q:?}");
            }
        }
        assert!(proj.invert(Vec2::new(320.0 + 173.0 * 1.001, 240.0)).is_none());
    }

    #[test]
    fn round_trip_for_visible_points() {
        let rotations = [
            Rotation::IDENTITY,
            Rotation::yaw_pitch(0.0, -15.0),
            Rotation::yaw_pitch(137.5, 42.0),
            Rotation::new(-80.0, -60.0, 20.0),
            Rotation::yaw_pitch(359.0, 90.0),
        ];
        for rotation in rotations {
            let proj = Orthographic::new(rotation, 173.0, Vec2::new(320.0, 240.0));
            for i in 0..36 {
                for j in 0..17 {
                    let p = GeoPoint::new(-180.0 + i as f64 * 10.0 + 0.5, -80.0 + j as f64 * 10.0);
                    match proj.project(p) {
                        Some(s) => {
                            assert!(proj.rotate(p).x > 0.0);
                            let q = proj.invert(s).unwrap();
                            let d = p.angular_distance_deg(q);
                            assert!(d < 1e-5, "{p:?} -> {q:?} under {rotation:?}");
                        }
                        None => assert!(proj.rotate(p).x <= 0.0),
                    }
                }
            }
        }
    }
}

use super::{GeoPoint, Vec3, wrap_degrees};

/// Camera rotation as three sequential angles in degrees.
///
/// `yaw_deg` spins the body about its polar axis (added to longitude),
/// `pitch_deg` tilts about the screen-horizontal axis, and `roll_deg` spins
/// about the view axis.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rotation {
    pub yaw_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation::new(0.0, 0.0, 0.0);

    pub const fn new(yaw_deg: f64, pitch_deg: f64, roll_deg: f64) -> Self {
        Self {
            yaw_deg,
            pitch_deg,
            roll_deg,
        }
    }

    pub const fn yaw_pitch(yaw_deg: f64, pitch_deg: f64) -> Self {
        Self::new(yaw_deg, pitch_deg, 0.0)
    }
}

/// Rotation with its trigonometry resolved once.
///
/// `apply` maps a geographic point to a view-space unit vector where `x`
/// points at the viewer, `y` to screen-right and `z` to screen-up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationMatrix {
    yaw_deg: f64,
    cos_pitch: f64,
    sin_pitch: f64,
    cos_roll: f64,
    sin_roll: f64,
}

impl RotationMatrix {
    pub fn new(rotation: Rotation) -> Self {
        let (sin_pitch, cos_pitch) = rotation.pitch_deg.to_radians().sin_cos();
        let (sin_roll, cos_roll) = rotation.roll_deg.to_radians().sin_cos();
        Self {
            yaw_deg: rotation.yaw_deg,
            cos_pitch,
            sin_pitch,
            cos_roll,
            sin_roll,
        }
    }

    pub fn apply(&self, p: GeoPoint) -> Vec3 {
        let v = GeoPoint::new(p.lon_deg + self.yaw_deg, p.lat_deg).to_unit();
        let x = v.x * self.cos_pitch - v.z * self.sin_pitch;
        let z = v.z * self.cos_pitch + v.x * self.sin_pitch;
        let y = v.y * self.cos_roll - z * self.sin_roll;
        let z = z * self.cos_roll + v.y * self.sin_roll;
        Vec3::new(x, y, z)
    }

    pub fn invert(&self, v: Vec3) -> GeoPoint {
        let y = v.y * self.cos_roll + v.z * self.sin_roll;
        let z = v.z * self.cos_roll - v.y * self.sin_roll;
        let x = v.x * self.cos_pitch + z * self.sin_pitch;
        let z = z * self.cos_pitch - v.x * self.sin_pitch;
        let p = GeoPoint::from_unit(Vec3::new(x, y, z));
        GeoPoint::new(wrap_degrees(p.lon_deg - self.yaw_deg), p.lat_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::{Rotation, RotationMatrix};
    use crate::math::{GeoPoint, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} != {b} (eps={eps})");
    }

    #[test]
    fn identity_faces_null_island() {
        let m = RotationMatrix::new(Rotation::IDENTITY);
        let v = m.apply(GeoPoint::new(0.0, 0.0));
        assert_close(v.x, 1.0, 1e-12);
        assert_close(v.y, 0.0, 1e-12);
        assert_close(v.z, 0.0, 1e-12);
    }

    #[test]
    fn yaw_brings_meridian_to_center() {
        // Spinning by -90 puts 90E in front of the viewer.
        let m = RotationMatrix::new(Rotation::yaw_pitch(-90.0, 0.0));
        let v = m.apply(GeoPoint::new(90.0, 0.0));
        assert_close(v.x, 1.0, 1e-12);
    }

    #[test]
    fn pitch_tilts_pole_toward_viewer() {
        let m = RotationMatrix::new(Rotation::yaw_pitch(0.0, -90.0));
        let v = m.apply(GeoPoint::new(0.0, 90.0));
        assert_close(v.x, 1.0, 1e-12);
    }

    #[test]
    fn invert_undoes_apply() {
        let m = RotationMatrix::new(Rotation::new(37.0, -22.0, 11.0));
        let p = GeoPoint::new(-120.5, 33.25);
        let q = m.invert(m.apply(p));
        assert_close(q.lon_deg, p.lon_deg, 1e-9);
        assert_close(q.lat_deg, p.lat_deg, 1e-9);

        let v = Vec3::new(0.0, 0.6, 0.8);
        let back = m.apply(m.invert(v));
        assert_close(back.y, v.y, 1e-9);
        assert_close(back.z, v.z, 1e-9);
    }
}

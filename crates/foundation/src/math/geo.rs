use super::Vec3;

/// A longitude/latitude sample in degrees.
///
/// Longitude is nominally in `[-180, 180]`, latitude in `[-90, 90]`. Values
/// outside those ranges are accepted and wrapped by [`GeoPoint::normalized`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn is_finite(self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite()
    }

    /// Longitude wrapped to `[-180, 180)`, latitude clamped to `[-90, 90]`.
    pub fn normalized(self) -> Self {
        Self::new(wrap_degrees(self.lon_deg), self.lat_deg.clamp(-90.0, 90.0))
    }

    /// Unit direction: x toward (0, 0), y toward (90E, 0), z toward the north pole.
    pub fn to_unit(self) -> Vec3 {
        let lon = self.lon_deg.to_radians();
        let lat = self.lat_deg.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        Vec3::new(cos_lat * lon.cos(), cos_lat * lon.sin(), sin_lat)
    }

    /// Inverse of [`GeoPoint::to_unit`]. The input need not be normalized.
    pub fn from_unit(v: Vec3) -> Self {
        let n = v.normalized();
        Self::new(
            n.y.atan2(n.x).to_degrees(),
            n.z.clamp(-1.0, 1.0).asin().to_degrees(),
        )
    }

    /// Great-circle distance in degrees.
    pub fn angular_distance_deg(self, other: GeoPoint) -> f64 {
        let d = self.to_unit().dot(other.to_unit()).clamp(-1.0, 1.0);
        d.acos().to_degrees()
    }
}

/// Wraps an angle to `[-180, 180)`.
pub fn wrap_degrees(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Wraps an angle to `[0, 360)`.
pub fn wrap_degrees_360(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, wrap_degrees, wrap_degrees_360};

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} != {b} (eps={eps})");
    }

    #[test]
    fn wraps_longitudes() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-180.0), -180.0);
        assert_eq!(wrap_degrees(180.0), -180.0);
        assert_eq!(wrap_degrees_360(-10.0), 350.0);
        assert_eq!(wrap_degrees_360(720.5), 0.5);
    }

    #[test]
    fn unit_vector_round_trip() {
        let p = GeoPoint::new(-73.5, 40.25);
        let q = GeoPoint::from_unit(p.to_unit());
        assert_close(p.lon_deg, q.lon_deg, 1e-9);
        assert_close(p.lat_deg, q.lat_deg, 1e-9);
    }

    #[test]
    fn angular_distance_between_pole_and_equator() {
        let d = GeoPoint::new(10.0, 90.0).angular_distance_deg(GeoPoint::new(-120.0, 0.0));
        assert_close(d, 90.0, 1e-9);
    }
}

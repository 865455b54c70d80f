//! Region index: named polygon features with spherical point-in-polygon
//! containment.
//!
//! Containment walks each ring on the sphere (accumulated longitude sweep plus
//! meridian crossings), so rings that straddle the antimeridian behave like any
//! other ring. Polygons are rewound on load so their interior is the side
//! smaller than a hemisphere, which makes either winding convention work.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use formats::{FeatureCollection, NameTable, Ring, normalize_region_code};
use foundation::ids::RegionId;
use foundation::math::{GeoPoint, Vec3};
use tracing::debug;

/// Name given to regions whose code has no entry in the name table.
pub const UNKNOWN_REGION_NAME: &str = "Unknown";

const EPSILON: f64 = 1e-6;
const EPSILON2: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainmentError {
    DegenerateRing { polygon: usize, ring: usize },
    NonFiniteVertex { polygon: usize, ring: usize },
}

impl std::fmt::Display for ContainmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainmentError::DegenerateRing { polygon, ring } => {
                write!(f, "ring {ring} of polygon {polygon} has fewer than 3 vertices")
            }
            ContainmentError::NonFiniteVertex { polygon, ring } => {
                write!(f, "ring {ring} of polygon {polygon} has a non-finite vertex")
            }
        }
    }
}

impl std::error::Error for ContainmentError {}

/// Smallest-known spherical cap around a region's vertices. Only built when
/// narrower than a hemisphere, where it also bounds the interior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingCap {
    pub center: GeoPoint,
    pub radius_deg: f64,
    axis: Vec3,
    cos_radius: f64,
}

impl BoundingCap {
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.to_unit().dot(self.axis) >= self.cos_radius - EPSILON2
    }
}

/// Longitude/latitude window that covers a region, for lattice sampling.
/// `lon_min` may be below -180 or `lon_max` above 180 when the region crosses
/// the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWindow {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl SampleWindow {
    pub const GLOBE: SampleWindow = SampleWindow {
        lon_min: -180.0,
        lon_max: 180.0,
        lat_min: -90.0,
        lat_max: 90.0,
    };
}

/// Rings in radians, closing vertex removed.
type RadRing = Vec<[f64; 2]>;

#[derive(Debug, Clone)]
pub struct RegionFeature {
    pub id: RegionId,
    /// Normalized numeric code used for the name join, empty when absent.
    pub key: String,
    pub name: String,
    /// Alpha-2 code, empty when unknown.
    pub code: String,
    polygons: Vec<Vec<RadRing>>,
    cap: Option<BoundingCap>,
    defect: Option<ContainmentError>,
}

impl RegionFeature {
    pub fn new(
        id: RegionId,
        key: impl Into<String>,
        name: impl Into<String>,
        code: impl Into<String>,
        polygons: &[&[Ring]],
    ) -> Self {
        let mut defect = None;
        let mut prepared = Vec::with_capacity(polygons.len());
        for (pi, rings) in polygons.iter().enumerate() {
            let mut poly: Vec<RadRing> = Vec::with_capacity(rings.len());
            for (ri, ring) in rings.iter().enumerate() {
                match prepare_ring(ring) {
                    Ok(r) => poly.push(r),
                    Err(kind) => {
                        defect.get_or_insert(kind.at(pi, ri));
                    }
                }
            }
            if poly.first().is_some_and(|exterior| ring_area(exterior) > TAU) {
                for ring in &mut poly {
                    ring.reverse();
                }
            }
            prepared.push(poly);
        }

        let cap = if defect.is_none() {
            bounding_cap(&prepared)
        } else {
            None
        };

        Self {
            id,
            key: key.into(),
            name: name.into(),
            code: code.into(),
            polygons: prepared,
            cap,
            defect,
        }
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn cap(&self) -> Option<BoundingCap> {
        self.cap
    }

    pub fn is_malformed(&self) -> bool {
        self.defect.is_some()
    }

    pub fn try_contains(&self, p: GeoPoint) -> Result<bool, ContainmentError> {
        if let Some(defect) = self.defect {
            return Err(defect);
        }
        if !p.is_finite() {
            return Ok(false);
        }
        if let Some(cap) = &self.cap {
            if !cap.contains(p) {
                return Ok(false);
            }
        }
        let probe = [p.lon_deg.to_radians(), p.lat_deg.to_radians()];
        Ok(self.polygons.iter().any(|rings| polygon_contains(rings, probe)))
    }

    /// Malformed regions contain nothing.
    pub fn contains(&self, p: GeoPoint) -> bool {
        self.try_contains(p).unwrap_or(false)
    }

    pub fn sample_window(&self) -> SampleWindow {
        let Some(cap) = self.cap else {
            return SampleWindow::GLOBE;
        };
        let lat_min = cap.center.lat_deg - cap.radius_deg;
        let lat_max = cap.center.lat_deg + cap.radius_deg;
        if lat_min <= -90.0 || lat_max >= 90.0 {
            return SampleWindow {
                lat_min: lat_min.max(-90.0),
                lat_max: lat_max.min(90.0),
                ..SampleWindow::GLOBE
            };
        }
        let half_width = (cap.radius_deg.to_radians().sin() / cap.center.lat_deg.to_radians().cos())
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees();
        SampleWindow {
            lon_min: cap.center.lon_deg - half_width,
            lon_max: cap.center.lon_deg + half_width,
            lat_min,
            lat_max,
        }
    }
}

enum RingDefect {
    Degenerate,
    NonFinite,
}

impl RingDefect {
    fn at(self, polygon: usize, ring: usize) -> ContainmentError {
        match self {
            RingDefect::Degenerate => ContainmentError::DegenerateRing { polygon, ring },
            RingDefect::NonFinite => ContainmentError::NonFiniteVertex { polygon, ring },
        }
    }
}

fn prepare_ring(ring: &[GeoPoint]) -> Result<RadRing, RingDefect> {
    if ring.iter().any(|p| !p.is_finite()) {
        return Err(RingDefect::NonFinite);
    }
    let mut pts: Vec<GeoPoint> = ring.to_vec();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts.dedup();
    if pts.len() < 3 {
        return Err(RingDefect::Degenerate);
    }
    Ok(pts
        .iter()
        .map(|p| [p.lon_deg.to_radians(), p.lat_deg.to_radians()])
        .collect())
}

fn bounding_cap(polygons: &[Vec<RadRing>]) -> Option<BoundingCap> {
    let vertices: Vec<Vec3> = polygons
        .iter()
        .filter_map(|rings| rings.first())
        .flatten()
        .map(|&p| cartesian(p))
        .collect();
    if vertices.is_empty() {
        return None;
    }
    let sum = vertices.iter().fold(Vec3::default(), |acc, v| acc + *v);
    if sum.length() < EPSILON {
        return None;
    }
    let axis = sum.normalized();
    let cos_radius = vertices
        .iter()
        .map(|v| v.dot(axis))
        .fold(1.0_f64, f64::min);
    if cos_radius <= 0.0 {
        return None;
    }
    Some(BoundingCap {
        center: GeoPoint::from_unit(axis),
        radius_deg: cos_radius.clamp(-1.0, 1.0).acos().to_degrees(),
        axis,
        cos_radius,
    })
}

fn longitude(lambda: f64) -> f64 {
    if lambda.abs() <= PI {
        lambda
    } else {
        lambda.signum() * ((lambda.abs() + PI) % TAU - PI)
    }
}

fn cartesian(p: [f64; 2]) -> Vec3 {
    let (sin_phi, cos_phi) = p[1].sin_cos();
    Vec3::new(cos_phi * p[0].cos(), cos_phi * p[0].sin(), sin_phi)
}

/// Signed spherical excess contribution of one closed ring, in the form used
/// by both the area and containment tests.
fn ring_excess(ring: &[[f64; 2]]) -> f64 {
    let Some(&last) = ring.last() else {
        return 0.0;
    };
    let mut lambda0 = last[0];
    let (mut sin_phi0, mut cos_phi0) = (last[1] / 2.0 + FRAC_PI_4).sin_cos();
    let mut sum = 0.0;
    for &p in ring {
        let (sin_phi1, cos_phi1) = (p[1] / 2.0 + FRAC_PI_4).sin_cos();
        let delta = p[0] - lambda0;
        let sign = if delta >= 0.0 { 1.0 } else { -1.0 };
        let abs_delta = sign * delta;
        let k = sin_phi0 * sin_phi1;
        sum += (k * sign * abs_delta.sin()).atan2(cos_phi0 * cos_phi1 + k * abs_delta.cos());
        lambda0 = p[0];
        sin_phi0 = sin_phi1;
        cos_phi0 = cos_phi1;
    }
    sum
}

/// Enclosed area in steradians.
fn ring_area(ring: &[[f64; 2]]) -> f64 {
    let s = ring_excess(ring);
    2.0 * if s < 0.0 { TAU + s } else { s }
}

fn polygon_contains(rings: &[RadRing], point: [f64; 2]) -> bool {
    let lambda = longitude(point[0]);
    let mut phi = point[1];
    let sin_phi = phi.sin();
    let normal = Vec3::new(lambda.sin(), -lambda.cos(), 0.0);
    let mut angle = 0.0;
    let mut winding = 0i32;
    let mut sum = 0.0;

    if sin_phi == 1.0 {
        phi = FRAC_PI_2 + EPSILON;
    } else if sin_phi == -1.0 {
        phi = -FRAC_PI_2 - EPSILON;
    }

    for ring in rings {
        let Some(&last) = ring.last() else {
            continue;
        };
        let mut p0 = last;
        let mut lambda0 = longitude(p0[0]);
        let (mut sin_phi0, mut cos_phi0) = (p0[1] / 2.0 + FRAC_PI_4).sin_cos();

        for &p1 in ring {
            let lambda1 = longitude(p1[0]);
            let (sin_phi1, cos_phi1) = (p1[1] / 2.0 + FRAC_PI_4).sin_cos();
            let delta = lambda1 - lambda0;
            let sign = if delta >= 0.0 { 1.0 } else { -1.0 };
            let abs_delta = sign * delta;
            let antimeridian = abs_delta > PI;
            let k = sin_phi0 * sin_phi1;

            sum += (k * sign * abs_delta.sin()).atan2(cos_phi0 * cos_phi1 + k * abs_delta.cos());
            angle += if antimeridian { delta + sign * TAU } else { delta };

            // Edge straddles the probe meridian: count it if the probe is north
            // of where the edge crosses.
            if antimeridian ^ (lambda0 >= lambda) ^ (lambda1 >= lambda) {
                let arc = cartesian(p0).cross(cartesian(p1)).normalized();
                let intersection = normal.cross(arc).normalized();
                let flip = antimeridian ^ (delta >= 0.0);
                let phi_arc =
                    if flip { -1.0 } else { 1.0 } * intersection.z.clamp(-1.0, 1.0).asin();
                if phi > phi_arc || (phi == phi_arc && (arc.x != 0.0 || arc.y != 0.0)) {
                    winding += if flip { 1 } else { -1 };
                }
            }

            lambda0 = lambda1;
            sin_phi0 = sin_phi1;
            cos_phi0 = cos_phi1;
            p0 = p1;
        }
    }

    ((angle < -EPSILON) || (angle < EPSILON && sum < -EPSILON2)) ^ (winding & 1 != 0)
}

/// Read-only collection of regions, in load order.
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    features: Vec<RegionFeature>,
}

impl RegionIndex {
    /// Builds the index from a feature collection and joins display names by
    /// normalized region code. Features without areal geometry are dropped;
    /// features without a name entry get [`UNKNOWN_REGION_NAME`] and an empty code.
    pub fn load(collection: &FeatureCollection, names: &NameTable) -> Self {
        let mut features = Vec::with_capacity(collection.features.len());
        let mut unnamed = 0usize;
        for feature in &collection.features {
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            let polygons = geometry.polygons();
            if polygons.is_empty() {
                continue;
            }
            let key = feature
                .id
                .as_deref()
                .map(normalize_region_code)
                .unwrap_or_default();
            let (name, code) = match names.get(&key).filter(|_| !key.is_empty()) {
                Some(record) => (record.name.clone(), record.alpha2.clone()),
                None => {
                    unnamed += 1;
                    (UNKNOWN_REGION_NAME.to_string(), String::new())
                }
            };
            let id = RegionId(features.len() as u32);
            features.push(RegionFeature::new(id, key, name, code, &polygons));
        }

        let index = Self { features };
        debug!(
            regions = index.len(),
            unnamed,
            malformed = index.malformed_count(),
            "region index loaded"
        );
        index
    }

    pub fn from_features(features: Vec<RegionFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[RegionFeature] {
        &self.features
    }

    pub fn get(&self, id: RegionId) -> Option<&RegionFeature> {
        self.features.get(id.index())
    }

    pub fn malformed_count(&self) -> usize {
        self.features.iter().filter(|f| f.is_malformed()).count()
    }

    /// First region in load order that contains `p`.
    pub fn find_containing(&self, p: GeoPoint) -> Option<&RegionFeature> {
        self.features.iter().find(|f| f.contains(p))
    }
}

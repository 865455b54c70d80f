//! Dot lattices covering a body's surface.
//!
//! Samples sit on one global lattice computed from integer indices:
//! `lng = -180 + i * spacing`, `lat = -90 + j * spacing`. Region-backed
//! surfaces only visit the lattice cells inside each region's sample window
//! and keep the samples the region contains.

use foundation::color::Color;
use foundation::ids::RegionId;
use foundation::math::{GeoPoint, wrap_degrees};
use tracing::debug;

use crate::patterns::{BodyPalette, ProceduralPattern, procedural_color};
use crate::regions::{RegionFeature, RegionIndex, SampleWindow};

/// Earth globe spacing in degrees at the base radius.
pub const EARTH_SPACING_FACTOR: f64 = 400.0;
pub const MIN_SPACING_DEG: f64 = 1.0;
pub const MAX_ADAPTIVE_SPACING_DEG: f64 = 2.0;
pub const PLANET_SPACING_DEG: f64 = 2.5;
pub const SUN_SPACING_DEG: f64 = 3.0;
pub const SCENE_SPACING_DEG: f64 = 3.5;
pub const SCENE_EARTH_SPACING_DEG: f64 = 3.0;
pub const DEFAULT_MAX_POINTS: usize = 40_000;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceDot {
    pub point: GeoPoint,
    pub color: Color,
    pub region: Option<RegionId>,
}

/// Where dot colours come from.
#[derive(Clone, Copy)]
pub enum SurfaceSource<'a> {
    /// Dots only where a region contains the sample, coloured per region.
    Regions {
        index: &'a RegionIndex,
        color: fn(&RegionFeature) -> Color,
    },
    /// Dots everywhere, coloured by a pattern.
    Procedural {
        pattern: ProceduralPattern,
        palette: BodyPalette,
        seed: f64,
    },
}

impl std::fmt::Debug for SurfaceSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceSource::Regions { index, .. } => {
                f.debug_struct("Regions").field("regions", &index.len()).finish()
            }
            SurfaceSource::Procedural { pattern, seed, .. } => f
                .debug_struct("Procedural")
                .field("pattern", pattern)
                .field("seed", seed)
                .finish(),
        }
    }
}

/// Earth spacing for a rendered radius: denser when larger.
pub fn adaptive_spacing(radius_px: f64) -> f64 {
    if !(radius_px > 0.0) {
        return MAX_ADAPTIVE_SPACING_DEG;
    }
    (EARTH_SPACING_FACTOR / radius_px).clamp(MIN_SPACING_DEG, MAX_ADAPTIVE_SPACING_DEG)
}

/// Number of samples a full-sphere lattice has at `spacing`.
pub fn lattice_len(spacing: f64) -> usize {
    if !(spacing > 0.0) || !spacing.is_finite() {
        return 0;
    }
    lon_steps(spacing) * lat_steps(spacing)
}

/// Widens `spacing` until a full-sphere lattice has at most `max_points`.
pub fn spacing_for_budget(spacing: f64, max_points: usize) -> f64 {
    let mut s = if spacing.is_finite() { spacing.max(MIN_SPACING_DEG) } else { MIN_SPACING_DEG };
    while lattice_len(s) > max_points.max(2) && s < 180.0 {
        s *= 1.05;
    }
    s.min(180.0)
}

/// Generates `source` within `max_points`, returning the spacing used.
///
/// Procedural bodies budget against the full lattice. Region dots only cover
/// land, so they are counted after generation and the spacing widens only
/// when the kept dots overflow.
pub fn generate_surface_within(
    source: &SurfaceSource<'_>,
    spacing: f64,
    max_points: usize,
) -> (f64, Vec<SurfaceDot>) {
    let max = max_points.max(2);
    let mut s = if spacing.is_finite() { spacing.max(MIN_SPACING_DEG) } else { MIN_SPACING_DEG };
    if let SurfaceSource::Procedural { .. } = source {
        let s = spacing_for_budget(s, max_points);
        return (s, generate_surface(source, s));
    }
    let mut dots = generate_surface(source, s);
    while dots.len() > max && s < 180.0 {
        // kept dots scale with the inverse square of the spacing
        let ratio = (dots.len() as f64 / max as f64).sqrt();
        s = (s * ratio).max(s * 1.05).min(180.0);
        dots = generate_surface(source, s);
    }
    if s > spacing {
        debug!(requested = spacing, spacing = s, kept = dots.len(), "region surface widened to budget");
    }
    (s, dots)
}

/// Distinct longitudes in `[-180, 180)`.
fn lon_steps(spacing: f64) -> usize {
    ((360.0 / spacing) - 1e-9).floor() as usize + 1
}

/// Latitudes in `[-90, 90]`.
fn lat_steps(spacing: f64) -> usize {
    ((180.0 / spacing) + 1e-9).floor() as usize + 1
}

pub fn generate_surface(source: &SurfaceSource<'_>, spacing: f64) -> Vec<SurfaceDot> {
    if !(spacing > 0.0) || !spacing.is_finite() {
        debug!(spacing, "surface generation skipped: invalid spacing");
        return Vec::new();
    }
    match *source {
        SurfaceSource::Regions { index, color } => region_surface(index, color, spacing),
        SurfaceSource::Procedural {
            pattern,
            palette,
            seed,
        } => {
            let mut dots = Vec::with_capacity(lattice_len(spacing));
            for j in 0..lat_steps(spacing) {
                let lat = -90.0 + j as f64 * spacing;
                for i in 0..lon_steps(spacing) {
                    let point = GeoPoint::new(-180.0 + i as f64 * spacing, lat);
                    dots.push(SurfaceDot {
                        point,
                        color: procedural_color(pattern, &palette, point, seed),
                        region: None,
                    });
                }
            }
            debug!(?pattern, spacing, kept = dots.len(), "procedural surface generated");
            dots
        }
    }
}

fn region_surface(
    index: &RegionIndex,
    color: fn(&RegionFeature) -> Color,
    spacing: f64,
) -> Vec<SurfaceDot> {
    let mut dots = Vec::new();
    let mut skipped = 0usize;
    let mut malformed = 0usize;
    for feature in index.features() {
        if feature.is_malformed() {
            malformed += 1;
            continue;
        }
        let fill = color(feature);
        let window = feature.sample_window();
        for point in window_samples(&window, spacing) {
            match feature.try_contains(point) {
                Ok(true) => dots.push(SurfaceDot {
                    point,
                    color: fill,
                    region: Some(feature.id),
                }),
                Ok(false) => {}
                Err(_) => skipped += 1,
            }
        }
    }
    debug!(
        regions = index.len(),
        spacing,
        kept = dots.len(),
        skipped,
        malformed,
        "region surface generated"
    );
    dots
}

/// Lattice samples inside `window`, wrapped into `[-180, 180)` and never
/// repeating a longitude.
fn window_samples(window: &SampleWindow, spacing: f64) -> impl Iterator<Item = GeoPoint> {
    let j_min = ((window.lat_min + 90.0) / spacing).ceil().max(0.0) as i64;
    let j_max = (((window.lat_max + 90.0) / spacing).floor() as i64).min(lat_steps(spacing) as i64 - 1);
    let i_min = ((window.lon_min + 180.0) / spacing).ceil() as i64;
    let i_max = ((window.lon_max + 180.0) / spacing).floor() as i64;
    let i_max = i_max.min(i_min + lon_steps(spacing) as i64 - 1);

    (j_min..=j_max).flat_map(move |j| {
        let lat = -90.0 + j as f64 * spacing;
        (i_min..=i_max).map(move |i| GeoPoint::new(wrap_degrees(-180.0 + i as f64 * spacing), lat))
    })
}

//! Offline helpers behind the `globe` CLI: file-backed boundary loading,
//! surface statistics and SVG snapshots of the views.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use foundation::bounds::Aabb2;
use foundation::time::Time;
use layers::{MarkerSet, RegionIndex, SurfaceDot, UNKNOWN_REGION_NAME};
use render::{RecordingCanvas, SvgCanvas};
use scene::{BodySpec, GlobeView, PlanetView, SolarSystemView, View, ViewConfig};
use serde::Serialize;
use streaming::{BoundarySource, LoadError, load_region_index};
use tracing::debug;

/// Boundary and name payloads read from disk.
#[derive(Debug, Clone)]
pub struct FileBoundarySource {
    pub boundaries: PathBuf,
    pub names: PathBuf,
}

impl BoundarySource for FileBoundarySource {
    async fn fetch_boundaries(&self) -> Result<String, String> {
        fs::read_to_string(&self.boundaries).map_err(|e| format!("read {:?}: {e}", self.boundaries))
    }

    async fn fetch_names(&self) -> Result<String, String> {
        fs::read_to_string(&self.names).map_err(|e| format!("read {:?}: {e}", self.names))
    }
}

pub fn load_index(source: &FileBoundarySource, object: Option<&str>) -> Result<RegionIndex, LoadError> {
    pollster::block_on(load_region_index(source, object))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub regions: usize,
    pub malformed: usize,
    pub unnamed: usize,
    pub distinct_codes: usize,
}

pub fn summarize(index: &RegionIndex) -> IndexSummary {
    let features = index.features();
    IndexSummary {
        regions: features.len(),
        malformed: index.malformed_count(),
        unnamed: features.iter().filter(|f| f.name == UNKNOWN_REGION_NAME).count(),
        distinct_codes: features
            .iter()
            .filter(|f| !f.code.is_empty())
            .map(|f| f.code.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceStats {
    pub body: String,
    pub spacing_deg: f64,
    pub dots: usize,
    pub colors: usize,
    pub regions: usize,
    /// blake3 over the dot sequence; equal digests mean identical surfaces.
    pub digest: String,
}

pub fn surface_stats(body: &str, spacing_deg: f64, dots: &[SurfaceDot]) -> SurfaceStats {
    SurfaceStats {
        body: body.to_string(),
        spacing_deg,
        dots: dots.len(),
        colors: dots.iter().map(|d| d.color).collect::<BTreeSet<_>>().len(),
        regions: dots.iter().filter_map(|d| d.region).collect::<BTreeSet<_>>().len(),
        digest: surface_digest(dots),
    }
}

pub fn surface_digest(dots: &[SurfaceDot]) -> String {
    let mut hasher = blake3::Hasher::new();
    for dot in dots {
        hasher.update(&dot.point.lon_deg.to_le_bytes());
        hasher.update(&dot.point.lat_deg.to_le_bytes());
        hasher.update(&[dot.color.r, dot.color.g, dot.color.b, dot.color.a]);
        hasher.update(&dot.region.map_or(u32::MAX, |r| r.0).to_le_bytes());
    }
    to_hex(hasher.finalize().as_bytes())
}

pub struct HashingWriter<W> {
    inner: W,
    hasher: blake3::Hasher,
}

impl<W> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: blake3::Hasher::new(),
        }
    }

    pub fn finalize_hex(&self) -> String {
        to_hex(self.hasher.clone().finalize().as_bytes())
    }
}

impl<W: std::io::Write> std::io::Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
        }
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

pub fn to_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0F) as usize] as char);
    }
    out
}

/// Which view a snapshot shows: `globe`, `solar`, or a catalogue body id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewKind {
    Globe,
    Planet(&'static BodySpec),
    Solar,
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "globe" => Ok(ViewKind::Globe),
            "solar" => Ok(ViewKind::Solar),
            id => scene::body(id)
                .map(ViewKind::Planet)
                .ok_or_else(|| format!("unknown view {id:?} (globe, solar or a body id)")),
        }
    }
}

impl ViewKind {
    pub fn base_config(self) -> ViewConfig {
        match self {
            ViewKind::Planet(spec) => ViewConfig::planet(spec),
            ViewKind::Globe | ViewKind::Solar => ViewConfig::earth(),
        }
    }
}

/// Inputs of one snapshot.
pub struct Snapshot {
    pub kind: ViewKind,
    pub config: ViewConfig,
    pub width: f64,
    pub height: f64,
    /// Boundary load outcome; `None` leaves the view pending.
    pub load: Option<Result<RegionIndex, LoadError>>,
    pub markers: Option<MarkerSet>,
    /// Frames advanced before the snapshot is painted.
    pub frames: u32,
}

fn build_view(snapshot: Snapshot) -> Box<dyn View> {
    let viewport = Aabb2::from_size(snapshot.width, snapshot.height);
    let config = snapshot.config;
    match snapshot.kind {
        ViewKind::Globe => {
            let mut view = GlobeView::new(config, viewport);
            if let Some(markers) = snapshot.markers {
                view.set_markers(markers);
            }
            if let Some(result) = snapshot.load {
                let token = view.begin_load();
                view.finish_load(token, result);
            }
            Box::new(view)
        }
        ViewKind::Planet(spec) => {
            let mut view = PlanetView::new(spec, config, viewport);
            if let (Some(result), Some(token)) = (snapshot.load, view.begin_load()) {
                view.finish_load(token, result);
            }
            Box::new(view)
        }
        ViewKind::Solar => {
            let mut view = SolarSystemView::new(config, viewport);
            if let Some(result) = snapshot.load {
                let token = view.begin_load();
                view.finish_load(token, result);
            }
            Box::new(view)
        }
    }
}

/// Builds the view, advances it and paints one SVG frame.
pub fn render_svg(snapshot: Snapshot) -> String {
    let (width, height, frames) = (snapshot.width, snapshot.height, snapshot.frames);
    let step_s = 1.0 / snapshot.config.pacing.frame_rate_hz;
    let mut view = build_view(snapshot);

    let mut scratch = RecordingCanvas::new();
    for i in 0..frames {
        view.frame(Time(i as f64 * step_s), &mut scratch);
        scratch.clear();
    }

    let mut svg = SvgCanvas::new(width, height);
    let stats = view.paint(&mut svg);
    debug!(?stats, frames, "snapshot painted");
    svg.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::ids::RegionId;
    use foundation::math::GeoPoint;
    use layers::RegionFeature;

    fn feature(id: u32, name: &str, code: &str) -> RegionFeature {
        let lon = id as f64 * 10.0;
        let ring = vec![
            GeoPoint::new(lon, 0.0),
            GeoPoint::new(lon + 5.0, 0.0),
            GeoPoint::new(lon + 5.0, 5.0),
            GeoPoint::new(lon, 5.0),
            GeoPoint::new(lon, 0.0),
        ];
        let rings = vec![ring];
        RegionFeature::new(RegionId(id), format!("{id:03}"), name, code, &[rings.as_slice()])
    }

    #[test]
    fn summary_counts_unnamed_and_codes() {
        let index = RegionIndex::from_features(vec![
            feature(0, "Alpha", "AA"),
            feature(1, UNKNOWN_REGION_NAME, ""),
            feature(2, "Alpha Minor", "AA"),
        ]);
        assert_eq!(
            summarize(&index),
            IndexSummary {
                regions: 3,
                malformed: 0,
                unnamed: 1,
                distinct_codes: 1,
            }
        );
    }

    #[test]
    fn digest_is_repeatable_and_order_sensitive() {
        let mars = scene::body("mars").unwrap();
        let a = mars.generate_surface(None, 5.0, 0.0).unwrap();
        let b = mars.generate_surface(None, 5.0, 0.0).unwrap();
        assert_eq!(surface_digest(&a), surface_digest(&b));
        assert_eq!(surface_digest(&a).len(), 64);

        let mut reversed = a.clone();
        reversed.reverse();
        assert_ne!(surface_digest(&a), surface_digest(&reversed));

        let stats = surface_stats("mars", 5.0, &a);
        assert_eq!(stats.dots, a.len());
        assert_eq!(stats.regions, 0);
        assert!(stats.colors >= 2);
    }

    #[test]
    fn view_kind_parses_bodies() {
        assert_eq!("globe".parse::<ViewKind>(), Ok(ViewKind::Globe));
        assert_eq!("solar".parse::<ViewKind>(), Ok(ViewKind::Solar));
        assert!(matches!("saturn".parse::<ViewKind>(), Ok(ViewKind::Planet(s)) if s.name == "Saturn"));
        assert!("vulcan".parse::<ViewKind>().is_err());
    }

    #[test]
    fn missing_file_fails_the_load() {
        let source = FileBoundarySource {
            boundaries: PathBuf::from("/nonexistent/boundaries.json"),
            names: PathBuf::from("/nonexistent/names.json"),
        };
        let err = load_index(&source, None).unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));
    }

    #[test]
    fn snapshot_of_a_planet_is_svg() {
        let kind: ViewKind = "mars".parse().unwrap();
        let svg = render_svg(Snapshot {
            kind,
            config: kind.base_config(),
            width: 300.0,
            height: 200.0,
            load: None,
            markers: None,
            frames: 3,
        });
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="300""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn unavailable_globe_still_renders() {
        let svg = render_svg(Snapshot {
            kind: ViewKind::Globe,
            config: ViewConfig::earth(),
            width: 200.0,
            height: 200.0,
            load: Some(Err(LoadError::Fetch {
                resource: streaming::Resource::Boundaries,
                message: "offline".to_string(),
            })),
            markers: None,
            frames: 1,
        });
        assert!(svg.starts_with("<svg"));
    }
}

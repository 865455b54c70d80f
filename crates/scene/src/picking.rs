use foundation::ids::{BodyId, MarkerId, RegionId};
use foundation::math::{Orthographic, Vec2};
use layers::{MarkerSet, RegionIndex};

use crate::config::PickConfig;

/// Bounding rectangle of the drawing surface in client (CSS) pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Maps a client position to surface-local coordinates.
///
/// `backing` is the drawing buffer size in device pixels; dividing by `dpr`
/// gives the logical size the views paint in, which may differ from the CSS
/// box when the element is stretched.
pub fn client_to_surface(client: Vec2, rect: ClientRect, backing: (f64, f64), dpr: f64) -> Vec2 {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let axis = |offset: f64, backing: f64, css: f64| {
        if css > 0.0 {
            offset * (backing / dpr / css)
        } else {
            offset
        }
    };
    Vec2::new(
        axis(client.x - rect.left, backing.0, rect.width),
        axis(client.y - rect.top, backing.1, rect.height),
    )
}

/// What the pointer is over. `anchor` is the surface-local pointer position.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HoverTarget {
    #[default]
    None,
    Region { id: RegionId, anchor: Vec2 },
    Marker { id: MarkerId, anchor: Vec2 },
    Body { id: BodyId, anchor: Vec2 },
}

impl HoverTarget {
    pub fn is_none(&self) -> bool {
        matches!(self, HoverTarget::None)
    }

    pub fn anchor(&self) -> Option<Vec2> {
        match self {
            HoverTarget::None => None,
            HoverTarget::Region { anchor, .. }
            | HoverTarget::Marker { anchor, .. }
            | HoverTarget::Body { anchor, .. } => Some(*anchor),
        }
    }

    pub fn region(&self) -> Option<RegionId> {
        match self {
            HoverTarget::Region { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn marker(&self) -> Option<&MarkerId> {
        match self {
            HoverTarget::Marker { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<BodyId> {
        match self {
            HoverTarget::Body { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Same kind and id, ignoring the anchor.
    pub fn same_target(&self, other: &HoverTarget) -> bool {
        match (self, other) {
            (HoverTarget::None, HoverTarget::None) => true,
            (HoverTarget::Region { id: a, .. }, HoverTarget::Region { id: b, .. }) => a == b,
            (HoverTarget::Marker { id: a, .. }, HoverTarget::Marker { id: b, .. }) => a == b,
            (HoverTarget::Body { id: a, .. }, HoverTarget::Body { id: b, .. }) => a == b,
            _ => false,
        }
    }

    fn set_anchor(&mut self, to: Vec2) {
        match self {
            HoverTarget::None => {}
            HoverTarget::Region { anchor, .. }
            | HoverTarget::Marker { anchor, .. }
            | HoverTarget::Body { anchor, .. } => *anchor = to,
        }
    }
}

/// Hit-tests the globe under `p`.
///
/// Markers are tested first in screen space and the first within the hit
/// radius wins. Otherwise the point is inverted and the first containing
/// region wins. Off the disc, on open ocean, or while no index is loaded the
/// result is [`HoverTarget::None`].
pub fn hit_test_globe(
    projection: &Orthographic,
    p: Vec2,
    markers: Option<&MarkerSet>,
    regions: Option<&RegionIndex>,
    config: &PickConfig,
) -> HoverTarget {
    if !projection.disc_contains(p) {
        return HoverTarget::None;
    }

    if config.markers_enabled {
        if let Some(markers) = markers {
            let center = projection.translate();
            let limb = projection.scale() * config.marker_limb_factor;
            let r2 = config.marker_hit_radius_px * config.marker_hit_radius_px;
            for pin in markers.pins() {
                let Some(s) = projection.project(pin.point) else {
                    continue;
                };
                if s.distance_squared(center) > limb * limb {
                    continue;
                }
                if s.distance_squared(p) < r2 {
                    return HoverTarget::Marker {
                        id: pin.id.clone(),
                        anchor: p,
                    };
                }
            }
        }
    }

    let Some(geo) = projection.invert(p) else {
        return HoverTarget::None;
    };
    match regions.and_then(|index| index.find_containing(geo)) {
        Some(region) => HoverTarget::Region {
            id: region.id,
            anchor: p,
        },
        None => HoverTarget::None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverChange {
    Unchanged,
    /// A different target (or the first one) is now hovered.
    Changed(HoverTarget),
    /// Same target; only the anchor moved.
    Moved(Vec2),
    Cleared,
}

/// Current hover plus change detection so identical targets only move.
#[derive(Debug, Clone, Default)]
pub struct HoverState {
    current: HoverTarget,
}

impl HoverState {
    pub fn current(&self) -> &HoverTarget {
        &self.current
    }

    pub fn update(&mut self, next: HoverTarget) -> HoverChange {
        if self.current.same_target(&next) {
            return match next.anchor() {
                Some(anchor) if Some(anchor) != self.current.anchor() => {
                    self.current.set_anchor(anchor);
                    HoverChange::Moved(anchor)
                }
                _ => HoverChange::Unchanged,
            };
        }
        self.current = next;
        if self.current.is_none() {
            HoverChange::Cleared
        } else {
            HoverChange::Changed(self.current.clone())
        }
    }

    pub fn clear(&mut self) -> HoverChange {
        self.update(HoverTarget::None)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Pointer,
    Grab,
    Grabbing,
}

impl Cursor {
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
        }
    }
}

pub fn cursor_for(hover: &HoverTarget, dragging: bool, on_disc: bool) -> Cursor {
    if dragging {
        Cursor::Grabbing
    } else if !hover.is_none() {
        Cursor::Pointer
    } else if on_disc {
        Cursor::Grab
    } else {
        Cursor::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::Category;
    use foundation::math::{GeoPoint, Rotation};
    use layers::{MarkerPin, MarkerStatus, RegionFeature};

    fn projection() -> Orthographic {
        Orthographic::new(Rotation::IDENTITY, 200.0, Vec2::new(200.0, 200.0))
    }

    fn pin(id: &str, lon: f64, lat: f64) -> MarkerPin {
        MarkerPin {
            id: MarkerId::new(id),
            point: GeoPoint::new(lon, lat),
            category: Category::City,
            status: MarkerStatus::None,
            name: id.to_string(),
            country: String::new(),
        }
    }

    fn square(id: u32, lon0: f64, lon1: f64, lat0: f64, lat1: f64) -> RegionFeature {
        let ring = vec![
            GeoPoint::new(lon0, lat0),
            GeoPoint::new(lon1, lat0),
            GeoPoint::new(lon1, lat1),
            GeoPoint::new(lon0, lat1),
            GeoPoint::new(lon0, lat0),
        ];
        let rings = vec![ring];
        RegionFeature::new(RegionId(id), format!("{id}"), format!("R{id}"), "", &[rings.as_slice()])
    }

    #[test]
    fn marker_at_center_is_hovered() {
        let proj = projection();
        assert_eq!(proj.project(GeoPoint::new(0.0, 0.0)), Some(Vec2::new(200.0, 200.0)));
        let markers = MarkerSet::from_pins(vec![pin("a", 0.0, 0.0)]);
        let hit = hit_test_globe(&proj, Vec2::new(200.0, 200.0), Some(&markers), None, &PickConfig::default());
        assert_eq!(hit.marker(), Some(&MarkerId::new("a")));
    }

    #[test]
    fn marker_wins_over_overlapping_region() {
        let proj = projection();
        let regions = RegionIndex::from_features(vec![square(0, -10.0, 10.0, -10.0, 10.0)]);
        let markers = MarkerSet::from_pins(vec![pin("a", 1.0, 1.0)]);
        let p = Vec2::new(203.0, 197.0);
        let config = PickConfig::default();
        let hit = hit_test_globe(&proj, p, Some(&markers), Some(&regions), &config);
        assert!(matches!(hit, HoverTarget::Marker { .. }));

        let disabled = PickConfig {
            markers_enabled: false,
            ..config
        };
        let hit = hit_test_globe(&proj, p, Some(&markers), Some(&regions), &disabled);
        assert_eq!(hit.region(), Some(RegionId(0)));
    }

    #[test]
    fn hit_radius_is_strict() {
        let proj = projection();
        let markers = MarkerSet::from_pins(vec![pin("a", 0.0, 0.0)]);
        let config = PickConfig::default();
        assert!(hit_test_globe(&proj, Vec2::new(212.0, 200.0), Some(&markers), None, &config).is_none());
        assert!(!hit_test_globe(&proj, Vec2::new(211.9, 200.0), Some(&markers), None, &config).is_none());
    }

    #[test]
    fn markers_near_the_limb_are_skipped() {
        let proj = projection();
        // Projects to x = 200 + 200 * sin(85 deg) = 399.2, past 0.98 * scale.
        let markers = MarkerSet::from_pins(vec![pin("edge", 85.0, 0.0)]);
        let hit = hit_test_globe(&proj, Vec2::new(395.0, 200.0), Some(&markers), None, &PickConfig::default());
        assert!(hit.is_none());
    }

    #[test]
    fn pointer_off_disc_reports_nothing() {
        let proj = projection();
        let regions = RegionIndex::from_features(vec![square(0, -10.0, 10.0, -10.0, 10.0)]);
        let markers = MarkerSet::from_pins(vec![pin("a", 0.0, 0.0)]);
        let hit = hit_test_globe(&proj, Vec2::new(450.0, 200.0), Some(&markers), Some(&regions), &PickConfig::default());
        assert_eq!(hit, HoverTarget::None);
    }

    #[test]
    fn missing_index_resolves_to_nothing() {
        let proj = projection();
        let hit = hit_test_globe(&proj, Vec2::new(210.0, 230.0), None, None, &PickConfig::default());
        assert!(hit.is_none());
    }

    #[test]
    fn same_region_only_moves() {
        let mut state = HoverState::default();
        let a = HoverTarget::Region {
            id: RegionId(3),
            anchor: Vec2::new(1.0, 1.0),
        };
        assert_eq!(state.update(a.clone()), HoverChange::Changed(a));
        let moved = HoverTarget::Region {
            id: RegionId(3),
            anchor: Vec2::new(2.0, 1.0),
        };
        assert_eq!(state.update(moved.clone()), HoverChange::Moved(Vec2::new(2.0, 1.0)));
        assert_eq!(state.update(moved), HoverChange::Unchanged);
        assert_eq!(state.clear(), HoverChange::Cleared);
        assert_eq!(state.clear(), HoverChange::Unchanged);
    }

    #[test]
    fn converts_client_coordinates_with_dpr() {
        let rect = ClientRect {
            left: 10.0,
            top: 20.0,
            width: 400.0,
            height: 300.0,
        };
        let p = client_to_surface(Vec2::new(210.0, 170.0), rect, (1600.0, 1200.0), 2.0);
        assert_eq!(p, Vec2::new(400.0, 300.0));
        let p = client_to_surface(Vec2::new(210.0, 170.0), rect, (400.0, 300.0), 1.0);
        assert_eq!(p, Vec2::new(200.0, 150.0));
    }

    #[test]
    fn cursor_follows_hover_and_drag() {
        let region = HoverTarget::Region {
            id: RegionId(0),
            anchor: Vec2::new(0.0, 0.0),
        };
        assert_eq!(cursor_for(&region, true, true), Cursor::Grabbing);
        assert_eq!(cursor_for(&region, false, true), Cursor::Pointer);
        assert_eq!(cursor_for(&HoverTarget::None, false, true), Cursor::Grab);
        assert_eq!(cursor_for(&HoverTarget::None, false, false).as_css(), "default");
    }
}

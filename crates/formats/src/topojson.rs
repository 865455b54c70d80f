//! TopoJSON topology decoding into [`FeatureCollection`]s.
//!
//! Arcs are decoded once on load (delta decoding plus the quantization
//! transform when present); geometries reference them by index, with `!i`
//! meaning arc `i` traversed backwards.

use std::collections::BTreeMap;

use foundation::math::GeoPoint;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::features::{Feature, FeatureCollection, Geometry, Ring, id_text};

#[derive(Debug)]
pub enum TopologyError {
    InvalidJson(String),
    MissingObject(String),
    ArcIndexOutOfRange(i64),
    InvalidGeometry(String),
}

impl std::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::InvalidJson(e) => write!(f, "invalid TopoJSON: {e}"),
            TopologyError::MissingObject(name) => write!(f, "topology has no object `{name}`"),
            TopologyError::ArcIndexOutOfRange(i) => write!(f, "arc index {i} out of range"),
            TopologyError::InvalidGeometry(reason) => write!(f, "invalid geometry: {reason}"),
        }
    }
}

impl std::error::Error for TopologyError {}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> GeoPoint {
        GeoPoint::new(
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TopologyDoc {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: BTreeMap<String, TopoGeometry>,
}

#[derive(Debug, Clone, Deserialize)]
struct TopoGeometry {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    arcs: Option<Value>,
    #[serde(default)]
    coordinates: Option<Value>,
    #[serde(default)]
    geometries: Vec<TopoGeometry>,
}

#[derive(Debug, Clone)]
pub struct Topology {
    transform: Option<Transform>,
    arcs: Vec<Vec<GeoPoint>>,
    objects: BTreeMap<String, TopoGeometry>,
}

impl Topology {
    pub fn from_json_str(payload: &str) -> Result<Self, TopologyError> {
        let doc: TopologyDoc = serde_json::from_str(payload)
            .map_err(|e| TopologyError::InvalidJson(e.to_string()))?;
        if doc.kind != "Topology" {
            return Err(TopologyError::InvalidJson(format!(
                "expected Topology, found {}",
                doc.kind
            )));
        }

        let arcs = doc
            .arcs
            .iter()
            .map(|arc| decode_arc(arc, doc.transform.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            transform: doc.transform,
            arcs,
            objects: doc.objects,
        })
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(|k| k.as_str())
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Converts one named object to features. A `GeometryCollection` yields one
    /// feature per member; any other geometry yields a single feature.
    pub fn feature_collection(&self, object: &str) -> Result<FeatureCollection, TopologyError> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;

        let members: Vec<&TopoGeometry> = if root.kind.as_deref() == Some("GeometryCollection") {
            root.geometries.iter().collect()
        } else {
            vec![root]
        };

        let features = members
            .into_iter()
            .map(|g| {
                Ok(Feature {
                    id: id_text(g.id.as_ref()),
                    properties: g.properties.clone().unwrap_or_default(),
                    geometry: self.geometry(g)?,
                })
            })
            .collect::<Result<Vec<_>, TopologyError>>()?;

        Ok(FeatureCollection { features })
    }

    fn geometry(&self, g: &TopoGeometry) -> Result<Option<Geometry>, TopologyError> {
        let Some(kind) = g.kind.as_deref() else {
            return Ok(None);
        };
        let geom = match kind {
            "Point" => Geometry::Point(self.position(coords(g)?)?),
            "MultiPoint" => Geometry::MultiPoint(
                as_array(coords(g)?)?
                    .iter()
                    .map(|p| self.position(p))
                    .collect::<Result<_, _>>()?,
            ),
            "LineString" => Geometry::LineString(self.line(&arc_list(arcs(g)?)?)?),
            "MultiLineString" => Geometry::MultiLineString(
                as_array(arcs(g)?)?
                    .iter()
                    .map(|l| self.line(&arc_list(l)?))
                    .collect::<Result<_, _>>()?,
            ),
            "Polygon" => Geometry::Polygon(self.polygon(arcs(g)?)?),
            "MultiPolygon" => Geometry::MultiPolygon(
                as_array(arcs(g)?)?
                    .iter()
                    .map(|p| self.polygon(p))
                    .collect::<Result<_, _>>()?,
            ),
            other => {
                return Err(TopologyError::InvalidGeometry(format!(
                    "unsupported geometry type: {other}"
                )));
            }
        };
        Ok(Some(geom))
    }

    fn position(&self, v: &Value) -> Result<GeoPoint, TopologyError> {
        let p = as_array(v)?;
        let (Some(x), Some(y)) = (
            p.first().and_then(|v| v.as_f64()),
            p.get(1).and_then(|v| v.as_f64()),
        ) else {
            return Err(TopologyError::InvalidGeometry(
                "position must be [x, y]".to_string(),
            ));
        };
        Ok(match &self.transform {
            Some(t) => t.apply(x, y),
            None => GeoPoint::new(x, y),
        })
    }

    fn polygon(&self, v: &Value) -> Result<Vec<Ring>, TopologyError> {
        as_array(v)?
            .iter()
            .map(|r| self.ring(&arc_list(r)?))
            .collect()
    }

    /// Concatenates arcs, dropping the vertex each arc shares with the previous one.
    fn line(&self, indices: &[i64]) -> Result<Vec<GeoPoint>, TopologyError> {
        let mut points: Vec<GeoPoint> = Vec::new();
        for &i in indices {
            points.pop();
            let (index, reversed) = if i < 0 { (!i, true) } else { (i, false) };
            let arc = usize::try_from(index)
                .ok()
                .and_then(|ix| self.arcs.get(ix))
                .ok_or(TopologyError::ArcIndexOutOfRange(i))?;
            let start = points.len();
            points.extend_from_slice(arc);
            if reversed {
                points[start..].reverse();
            }
        }
        Ok(points)
    }

    fn ring(&self, indices: &[i64]) -> Result<Ring, TopologyError> {
        let mut points = self.line(indices)?;
        // Two-point arcs still need a closed ring of four positions.
        if let Some(&first) = points.first() {
            while points.len() < 4 {
                points.push(first);
            }
        }
        Ok(points)
    }
}

fn decode_arc(arc: &[Vec<f64>], transform: Option<&Transform>) -> Result<Vec<GeoPoint>, TopologyError> {
    let mut out = Vec::with_capacity(arc.len());
    let (mut x, mut y) = (0.0, 0.0);
    for p in arc {
        if p.len() < 2 {
            return Err(TopologyError::InvalidGeometry(
                "arc position must be [x, y]".to_string(),
            ));
        }
        match transform {
            Some(t) => {
                x += p[0];
                y += p[1];
                out.push(t.apply(x, y));
            }
            None => out.push(GeoPoint::new(p[0], p[1])),
        }
    }
    Ok(out)
}

fn coords(g: &TopoGeometry) -> Result<&Value, TopologyError> {
    g.coordinates
        .as_ref()
        .ok_or_else(|| TopologyError::InvalidGeometry("missing coordinates".to_string()))
}

fn arcs(g: &TopoGeometry) -> Result<&Value, TopologyError> {
    g.arcs
        .as_ref()
        .ok_or_else(|| TopologyError::InvalidGeometry("missing arcs".to_string()))
}

fn as_array(v: &Value) -> Result<&Vec<Value>, TopologyError> {
    v.as_array()
        .ok_or_else(|| TopologyError::InvalidGeometry("expected an array".to_string()))
}

fn arc_list(v: &Value) -> Result<Vec<i64>, TopologyError> {
    as_array(v)?
        .iter()
        .map(|i| {
            i.as_i64()
                .ok_or_else(|| TopologyError::InvalidGeometry("arc index must be an integer".to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Topology, TopologyError};
    use crate::features::Geometry;
    use foundation::math::GeoPoint;
    use pretty_assertions::assert_eq;

    // Two squares sharing the edge x=1, quantized with a 1-degree grid.
    const SHARED_EDGE: &str = r#"{
        "type": "Topology",
        "transform": { "scale": [1, 1], "translate": [-10, 20] },
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [
                    { "type": "Polygon", "id": "004", "arcs": [[0, 1]] },
                    { "type": "Polygon", "id": 8, "properties": { "n": 1 }, "arcs": [[-1, 2]] },
                    { "type": null, "id": "999" }
                ]
            }
        },
        "arcs": [
            [[1, 0], [0, 1]],
            [[1, 1], [-1, 0], [0, -1], [1, 0]],
            [[1, 0], [1, 0], [0, 1], [-1, 0]]
        ]
    }"#;

    #[test]
    fn decodes_quantized_arcs_and_stitches_rings() {
        let topo = Topology::from_json_str(SHARED_EDGE).unwrap();
        assert_eq!(topo.object_names().collect::<Vec<_>>(), vec!["countries"]);
        assert_eq!(topo.arc_count(), 3);

        let fc = topo.feature_collection("countries").unwrap();
        assert_eq!(fc.features.len(), 3);
        assert_eq!(fc.features[0].id.as_deref(), Some("004"));
        assert_eq!(fc.features[1].id.as_deref(), Some("8"));
        assert_eq!(fc.features[2].geometry, None);

        let Some(Geometry::Polygon(rings)) = &fc.features[0].geometry else {
            panic!("expected polygon");
        };
        let ring: Vec<(f64, f64)> = rings[0].iter().map(|p| (p.lon_deg, p.lat_deg)).collect();
        assert_eq!(
            ring,
            vec![(-9.0, 20.0), (-9.0, 21.0), (-10.0, 21.0), (-10.0, 20.0), (-9.0, 20.0)]
        );

        let Some(Geometry::Polygon(rings)) = &fc.features[1].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0][0], GeoPoint::new(-9.0, 21.0));
        assert_eq!(rings[0][1], GeoPoint::new(-9.0, 20.0));
        assert_eq!(rings[0].last(), rings[0].first());
    }

    #[test]
    fn missing_object_and_bad_index_are_errors() {
        let topo = Topology::from_json_str(SHARED_EDGE).unwrap();
        assert!(matches!(
            topo.feature_collection("land"),
            Err(TopologyError::MissingObject(_))
        ));

        let bad = r#"{"type":"Topology","objects":{"o":{"type":"Polygon","arcs":[[5]]}},"arcs":[]}"#;
        let topo = Topology::from_json_str(bad).unwrap();
        assert!(matches!(
            topo.feature_collection("o"),
            Err(TopologyError::ArcIndexOutOfRange(5))
        ));
    }

    #[test]
    fn rejects_non_topology() {
        assert!(matches!(
            Topology::from_json_str(r#"{"type":"FeatureCollection","features":[]}"#),
            Err(TopologyError::InvalidJson(_))
        ));
    }
}

use serde_json::Value;

use crate::features::{FeatureCollection, FeatureError};
use crate::topojson::{Topology, TopologyError};

/// Object read from a topology when the payload does not say otherwise.
pub const DEFAULT_TOPOLOGY_OBJECT: &str = "countries";

#[derive(Debug)]
pub enum BoundaryError {
    InvalidJson(String),
    UnknownType(String),
    Features(FeatureError),
    Topology(TopologyError),
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryError::InvalidJson(e) => write!(f, "invalid boundary payload: {e}"),
            BoundaryError::UnknownType(t) => write!(f, "unsupported boundary payload type `{t}`"),
            BoundaryError::Features(e) => write!(f, "{e}"),
            BoundaryError::Topology(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BoundaryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoundaryError::Features(e) => Some(e),
            BoundaryError::Topology(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FeatureError> for BoundaryError {
    fn from(e: FeatureError) -> Self {
        BoundaryError::Features(e)
    }
}

impl From<TopologyError> for BoundaryError {
    fn from(e: TopologyError) -> Self {
        BoundaryError::Topology(e)
    }
}

/// Parses a boundary payload that is either a GeoJSON `FeatureCollection` or a
/// TopoJSON `Topology`. For topologies, `object` (or
/// [`DEFAULT_TOPOLOGY_OBJECT`], or the only object present) is converted.
pub fn parse_boundaries(payload: &str, object: Option<&str>) -> Result<FeatureCollection, BoundaryError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| BoundaryError::InvalidJson(e.to_string()))?;
    match value.get("type").and_then(|t| t.as_str()) {
        Some("FeatureCollection") => Ok(FeatureCollection::from_geojson_value(&value)?),
        Some("Topology") => {
            let topo = Topology::from_json_str(payload)?;
            let name = match object {
                Some(name) => name.to_string(),
                None => {
                    let names: Vec<&str> = topo.object_names().collect();
                    if names.len() == 1 {
                        names[0].to_string()
                    } else {
                        DEFAULT_TOPOLOGY_OBJECT.to_string()
                    }
                }
            };
            Ok(topo.feature_collection(&name)?)
        }
        Some(other) => Err(BoundaryError::UnknownType(other.to_string())),
        None => Err(BoundaryError::InvalidJson("missing `type`".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundaryError, parse_boundaries};

    #[test]
    fn detects_both_payload_kinds() {
        let geo = r#"{"type":"FeatureCollection","features":[]}"#;
        assert!(parse_boundaries(geo, None).unwrap().features.is_empty());

        let topo = r#"{"type":"Topology","objects":{"land":{"type":"GeometryCollection","geometries":[]}},"arcs":[]}"#;
        assert!(parse_boundaries(topo, None).unwrap().features.is_empty());
        assert!(matches!(
            parse_boundaries(topo, Some("countries")),
            Err(BoundaryError::Topology(_))
        ));
    }

    #[test]
    fn rejects_unknown_payloads() {
        assert!(matches!(
            parse_boundaries(r#"{"type":"Feature"}"#, None),
            Err(BoundaryError::UnknownType(_))
        ));
        assert!(matches!(
            parse_boundaries("not json", None),
            Err(BoundaryError::InvalidJson(_))
        ));
    }
}

//! GeoJSON feature collections.

use foundation::math::GeoPoint;
use serde_json::{Map, Value};

pub type Ring = Vec<GeoPoint>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// Polygons of an areal geometry; empty for points and lines.
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            Geometry::Polygon(rings) => vec![rings.as_slice()],
            Geometry::MultiPolygon(polys) => polys.iter().map(|p| p.as_slice()).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// `id` member, numbers rendered as their decimal text.
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// `None` for features with a `null` geometry.
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug)]
pub enum FeatureError {
    InvalidJson(String),
    MissingField { index: usize, field: &'static str },
    InvalidGeometry { index: usize, reason: String },
}

impl std::fmt::Display for FeatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureError::InvalidJson(e) => write!(f, "invalid GeoJSON: {e}"),
            FeatureError::MissingField { index, field } => {
                write!(f, "feature {index} is missing `{field}`")
            }
            FeatureError::InvalidGeometry { index, reason } => {
                write!(f, "invalid geometry in feature {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for FeatureError {}

impl FeatureCollection {
    pub fn from_geojson_str(payload: &str) -> Result<Self, FeatureError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| FeatureError::InvalidJson(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, FeatureError> {
        let obj = value
            .as_object()
            .ok_or_else(|| FeatureError::InvalidJson("expected an object".to_string()))?;
        match obj.get("type").and_then(|v| v.as_str()) {
            Some("FeatureCollection") => {}
            Some(other) => {
                return Err(FeatureError::InvalidJson(format!(
                    "expected FeatureCollection, found {other}"
                )));
            }
            None => {
                return Err(FeatureError::InvalidJson("missing `type`".to_string()));
            }
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or_else(|| FeatureError::InvalidJson("missing `features` array".to_string()))?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let feat_obj = feat_val
                .as_object()
                .ok_or(FeatureError::MissingField { index, field: "type" })?;

            let geometry = match feat_obj.get("geometry") {
                None => return Err(FeatureError::MissingField { index, field: "geometry" }),
                Some(Value::Null) => None,
                Some(g) => Some(
                    parse_geometry(g)
                        .map_err(|reason| FeatureError::InvalidGeometry { index, reason })?,
                ),
            };

            features.push(Feature {
                id: id_text(feat_obj.get("id")),
                properties: feat_obj
                    .get("properties")
                    .and_then(|v| v.as_object())
                    .cloned()
                    .unwrap_or_default(),
                geometry,
            });
        }

        Ok(Self { features })
    }
}

pub(crate) fn id_text(v: Option<&Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_point(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_points(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_points(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_nested(coords, parse_points)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_nested(coords, parse_points)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(parse_nested(coords, |poly| {
            parse_nested(poly, parse_points)
        })?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

fn parse_points(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    parse_nested(coords, parse_point)
}

fn parse_nested<T>(
    coords: &Value,
    item: impl Fn(&Value) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    arr.iter().map(item).collect()
}

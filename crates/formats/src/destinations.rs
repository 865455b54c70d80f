//! Destination lists and travel-status maps supplied by the host page.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    City,
    Nature,
    Landmark,
    Beach,
    Adventure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelStatus {
    Visited,
    Wishlist,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub country_code: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub description: String,
    pub category: Category,
}

#[derive(Debug)]
pub enum DestinationError {
    InvalidJson(String),
    InvalidCoordinate { id: String },
}

impl std::fmt::Display for DestinationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DestinationError::InvalidJson(e) => write!(f, "invalid destination list: {e}"),
            DestinationError::InvalidCoordinate { id } => {
                write!(f, "destination `{id}` has an out-of-range coordinate")
            }
        }
    }
}

impl std::error::Error for DestinationError {}

pub fn parse_destinations(payload: &str) -> Result<Vec<Destination>, DestinationError> {
    let list: Vec<Destination> = serde_json::from_str(payload)
        .map_err(|e| DestinationError::InvalidJson(e.to_string()))?;
    for d in &list {
        if !(-90.0..=90.0).contains(&d.lat) || !(-180.0..=180.0).contains(&d.lng) {
            return Err(DestinationError::InvalidCoordinate { id: d.id.clone() });
        }
    }
    Ok(list)
}

/// `{ id: "visited" | "wishlist" | null }`; `null` entries are dropped.
pub fn parse_travel_status(
    payload: &str,
) -> Result<BTreeMap<String, TravelStatus>, DestinationError> {
    let raw: BTreeMap<String, Option<TravelStatus>> = serde_json::from_str(payload)
        .map_err(|e| DestinationError::InvalidJson(e.to_string()))?;
    Ok(raw
        .into_iter()
        .filter_map(|(id, status)| status.map(|s| (id, s)))
        .collect())
}

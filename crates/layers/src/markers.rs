//! Destination pins and their travel status.

use std::collections::BTreeMap;

use formats::{Category, Destination, TravelStatus};
use foundation::color::Color;
use foundation::ids::MarkerId;
use foundation::math::GeoPoint;

use crate::symbology::pin_color;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum MarkerStatus {
    #[default]
    None,
    Visited,
    Wishlist,
}

impl From<Option<TravelStatus>> for MarkerStatus {
    fn from(status: Option<TravelStatus>) -> Self {
        match status {
            Some(TravelStatus::Visited) => MarkerStatus::Visited,
            Some(TravelStatus::Wishlist) => MarkerStatus::Wishlist,
            None => MarkerStatus::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPin {
    pub id: MarkerId,
    pub point: GeoPoint,
    pub category: Category,
    pub status: MarkerStatus,
    pub name: String,
    pub country: String,
}

impl MarkerPin {
    pub fn from_destination(destination: &Destination, status: MarkerStatus) -> Self {
        Self {
            id: MarkerId::new(destination.id.clone()),
            point: GeoPoint::new(destination.lng, destination.lat),
            category: destination.category,
            status,
            name: destination.name.clone(),
            country: destination.country.clone(),
        }
    }

    pub fn color(&self) -> Color {
        pin_color(self.category, self.status)
    }
}

/// Ordered pins. Order is the hit-test order.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    pins: Vec<MarkerPin>,
}

impl MarkerSet {
    pub fn new(destinations: &[Destination], statuses: &BTreeMap<String, TravelStatus>) -> Self {
        let pins = destinations
            .iter()
            .map(|d| MarkerPin::from_destination(d, statuses.get(&d.id).copied().into()))
            .collect();
        Self { pins }
    }

    pub fn from_pins(pins: Vec<MarkerPin>) -> Self {
        Self { pins }
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn pins(&self) -> &[MarkerPin] {
        &self.pins
    }

    pub fn get(&self, id: &MarkerId) -> Option<&MarkerPin> {
        self.pins.iter().find(|p| &p.id == id)
    }

    /// Replaces every pin's status. Ids missing from `statuses` reset to none.
    pub fn apply_statuses(&mut self, statuses: &BTreeMap<String, TravelStatus>) {
        for pin in &mut self.pins {
            pin.status = statuses.get(pin.id.as_str()).copied().into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkerSet, MarkerStatus};
    use formats::{parse_destinations, parse_travel_status};
    use foundation::color::Color;
    use foundation::ids::MarkerId;

    const DESTINATIONS: &str = r#"[
        {"id": "paris", "name": "Paris", "country": "France", "countryCode": "FR",
         "lat": 48.85, "lng": 2.35, "description": "", "category": "city"},
        {"id": "bali", "name": "Bali", "country": "Indonesia", "countryCode": "ID",
         "lat": -8.34, "lng": 115.09, "description": "", "category": "beach"}
    ]"#;

    #[test]
    fn joins_status_by_id() {
        let destinations = parse_destinations(DESTINATIONS).unwrap();
        let statuses = parse_travel_status(r#"{"bali": "visited", "paris": null}"#).unwrap();
        let set = MarkerSet::new(&destinations, &statuses);

        assert_eq!(set.len(), 2);
        let paris = set.get(&MarkerId::new("paris")).unwrap();
        assert_eq!(paris.status, MarkerStatus::None);
        assert_eq!(paris.point.lon_deg, 2.35);
        assert_eq!(paris.color(), Color::hex(0x3b82f6));

        let bali = set.get(&MarkerId::new("bali")).unwrap();
        assert_eq!(bali.status, MarkerStatus::Visited);
        assert_eq!(bali.color(), Color::hex(0x22c55e));
    }

    #[test]
    fn apply_statuses_resets_missing_ids() {
        let destinations = parse_destinations(DESTINATIONS).unwrap();
        let mut set = MarkerSet::new(&destinations, &parse_travel_status(r#"{"bali": "visited"}"#).unwrap());
        set.apply_statuses(&parse_travel_status(r#"{"paris": "wishlist"}"#).unwrap());
        assert_eq!(set.pins()[0].status, MarkerStatus::Wishlist);
        assert_eq!(set.pins()[1].status, MarkerStatus::None);
    }
}

//! Real Las Vegas / Henderson locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. They are routable with OSRM
//! Nevada data.

use carpool_planner::Coordinate;

/// A named location with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Event venues used as the common origin.
pub const VENUES: &[Location] = &[
    Location::new("Caesars Palace", 36.1162, -115.1745),
    Location::new("MGM Grand", 36.1023654, -115.1688720),
];

/// Henderson, south-east of the Strip.
pub const HENDERSON: &[Location] = &[
    Location::new("I Love Sushi Henderson", 35.9916660, -115.1028343),
    Location::new("Islander's Grill", 36.0335058, -114.9856162),
    Location::new("Naga", 36.0137634, -114.9928676),
    Location::new("RibCage", 35.9949754, -115.0999810),
    Location::new("Buffalo Wild Wings Henderson", 36.0090449, -114.9917034),
    Location::new("Green Valley Ranch Area", 36.0308, -115.0825),
];

/// North-east Las Vegas.
pub const NORTH_EAST: &[Location] = &[
    Location::new("Rivas Mexican Grill North", 36.1450055, -115.0482587),
    Location::new("Monarca Mexican Restaurant", 36.1440711, -115.0634197),
    Location::new("La Costa del Sol", 36.1470458, -115.0644345),
    Location::new("Golden China", 36.1171166, -115.0904647),
    Location::new("Wo Fat Chinese", 36.1298523, -115.0936239),
];

/// South Strip and airport area.
pub const SOUTH_STRIP: &[Location] = &[
    Location::new("Bootlegger Bistro", 36.0492047, -115.1715744),
    Location::new("Tahiti Joe's Restaurant", 36.0592855, -115.1716402),
    Location::new("kabuki Japanese", 36.0675472, -115.1779391),
    Location::new("Mikos Izakaya", 36.0429503, -115.1527627),
    Location::new("Budget Suites South", 36.0366259, -115.1713361),
];

/// Driver homes at the edge of each area.
pub const HOMES: &[Location] = &[
    Location::new("Sunset Station Area", 36.0614, -115.0631),
    Location::new("Chuck Wagon Restaurant", 36.1072491, -115.0593482),
    Location::new("Budget Suites South", 36.0366259, -115.1713361),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_vegas_area() {
        let all = [VENUES, HENDERSON, NORTH_EAST, SOUTH_STRIP, HOMES];
        for loc in all.iter().flat_map(|area| area.iter()) {
            assert!(loc.lat > 35.9 && loc.lat < 36.3, "{} lat out of range: {}", loc.name, loc.lat);
            assert!(
                loc.lng > -115.4 && loc.lng < -114.8,
                "{} lng out of range: {}",
                loc.name,
                loc.lng
            );
        }
    }
}

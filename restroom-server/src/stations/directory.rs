//! Immutable station table with distance-ranked lookup.

use serde::Serialize;

use crate::domain::{Coordinate, distance_km};

/// A subway station with its entrance coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

impl Station {
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            coordinate,
        }
    }
}

/// A station paired with its distance from a query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestStation {
    #[serde(flatten)]
    pub station: Station,
    pub distance_km: f64,
}

/// Read-only station table, shared by all requests.
#[derive(Debug, Clone)]
pub struct StationDirectory {
    stations: Vec<Station>,
}

impl StationDirectory {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Exact name lookup, used by the coordinate resolver.
    pub fn lookup(&self, name: &str) -> Option<Coordinate> {
        self.stations
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.coordinate)
    }

    /// Rank all stations by distance from `query`, ascending, and return the
    /// closest `limit`. Ties keep table order (stable sort). A limit of zero
    /// yields nothing; a limit beyond the table size returns the full table.
    pub fn nearest(&self, query: Coordinate, limit: usize) -> Vec<NearestStation> {
        let mut ranked: Vec<NearestStation> = self
            .stations
            .iter()
            .map(|s| NearestStation {
                station: s.clone(),
                distance_km: distance_km(query, s.coordinate),
            })
            .collect();

        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn directory() -> StationDirectory {
        StationDirectory::new(vec![
            Station::new("Gangnam", coord(37.4979, 127.0276)),
            Station::new("Hongik-univ", coord(37.5566, 126.9229)),
        ])
    }

    #[test]
    fn nearest_from_gangnam() {
        let dir = directory();
        let result = dir.nearest(coord(37.4979, 127.0276), 1);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].station.name, "Gangnam");
        assert_eq!(result[0].distance_km, 0.0);
    }

    #[test]
    fn nearest_is_sorted_ascending() {
        let dir = directory();
        let result = dir.nearest(coord(37.5566, 126.9229), 2);

        assert_eq!(result[0].station.name, "Hongik-univ");
        assert_eq!(result[1].station.name, "Gangnam");
        assert!(result[0].distance_km <= result[1].distance_km);
    }

    #[test]
    fn limit_zero_is_empty() {
        let dir = directory();
        assert!(dir.nearest(coord(37.5, 127.0), 0).is_empty());
    }

    #[test]
    fn limit_beyond_table_returns_all() {
        let dir = directory();
        assert_eq!(dir.nearest(coord(37.5, 127.0), 100).len(), 2);
    }

    #[test]
    fn equidistant_stations_keep_table_order() {
        let dir = StationDirectory::new(vec![
            Station::new("east", coord(0.0, 1.0)),
            Station::new("west", coord(0.0, -1.0)),
        ]);

        let result = dir.nearest(coord(0.0, 0.0), 2);
        assert_eq!(result[0].station.name, "east");
        assert_eq!(result[1].station.name, "west");
    }

    #[test]
    fn lookup_exact_name() {
        let dir = directory();
        assert_eq!(dir.lookup("Gangnam"), Some(coord(37.4979, 127.0276)));
        assert_eq!(dir.lookup("gangnam"), None);
        assert_eq!(dir.lookup("Nowhere"), None);
    }

    #[test]
    fn full_table_sorted_default_limit() {
        let dir = super::super::seoul_stations();
        let result = dir.nearest(coord(37.4979, 127.0276), 3);

        assert_eq!(result.len(), 3);
        for pair in result.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
        assert_eq!(result[0].station.name, "강남");
    }
}

//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres, used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Error returned when constructing an invalid coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// A point on the globe.
///
/// Always finite and in range: latitude in [-90, 90], longitude in
/// [-180, 180]. Construct via [`Coordinate::new`]; any `Coordinate` value
/// you hold is valid.
///
/// # Examples
///
/// ```
/// use restroom_server::domain::Coordinate;
///
/// let gangnam = Coordinate::new(37.4979, 127.0276).unwrap();
/// assert_eq!(gangnam.latitude(), 37.4979);
///
/// assert!(Coordinate::new(f64::NAN, 0.0).is_err());
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Construct a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(InvalidCoordinate {
                reason: "latitude and longitude must be finite numbers",
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinate {
                reason: "latitude must be in [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinate {
                reason: "longitude must be in [-180, 180]",
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Great-circle distance between two points, in kilometres.
///
/// Haversine formula on a sphere of radius [`EARTH_RADIUS_KM`]. Symmetric,
/// and zero exactly when both points are equal.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn reject_non_finite() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinate::new(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn reject_out_of_range() {
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(-90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.1).is_err());
        assert!(Coordinate::new(0.0, -180.1).is_err());
    }

    #[test]
    fn accept_boundary_values() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let gangnam = coord(37.4979, 127.0276);
        assert_eq!(distance_km(gangnam, gangnam), 0.0);
    }

    #[test]
    fn known_distance() {
        // Gangnam to Hongik Univ is roughly 11 km.
        let gangnam = coord(37.4979, 127.0276);
        let hongdae = coord(37.5566, 126.9229);
        let d = distance_km(gangnam, hongdae);
        assert!((10.0..13.0).contains(&d), "unexpected distance: {d}");
    }

    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn coordinate_strategy() -> impl Strategy<Value = Coordinate> {
            (-90.0f64..=90.0, -180.0f64..=180.0)
                .prop_map(|(lat, lon)| Coordinate::new(lat, lon).unwrap())
        }

        proptest! {
            #[test]
            fn distance_is_symmetric(a in coordinate_strategy(), b in coordinate_strategy()) {
                let ab = distance_km(a, b);
                let ba = distance_km(b, a);
                prop_assert!((ab - ba).abs() < 1e-9, "asymmetric: {ab} vs {ba}");
            }

            #[test]
            fn distance_is_non_negative(a in coordinate_strategy(), b in coordinate_strategy()) {
                prop_assert!(distance_km(a, b) >= 0.0);
            }

            #[test]
            fn identity_is_zero(a in coordinate_strategy()) {
                prop_assert_eq!(distance_km(a, a), 0.0);
            }
        }
    }
}

//! Distance metrics between coordinates.

use crate::domain::{Coordinate, StopId};

/// Kilometres per degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Smallest longitude scaling factor, so that longitude spans stay finite
/// near the poles.
pub const MIN_COS_LAT: f64 = 0.01;

/// Mean Earth radius used by the haversine metric.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// How distances between stops and query points are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Equirectangular approximation scaled at the query latitude.
    #[default]
    Planar,
    /// Great-circle distance.
    Haversine,
}

impl DistanceMetric {
    /// Distance in kilometres from `from` to `to`.
    ///
    /// The planar metric scales longitude by the cosine of `from`'s latitude,
    /// so it is only symmetric for points at the same latitude.
    pub fn distance_km(self, from: Coordinate, to: Coordinate) -> f64 {
        match self {
            DistanceMetric::Planar => {
                let dlat = (to.lat() - from.lat()) * KM_PER_DEGREE;
                let dlon = (to.lon() - from.lon()) * KM_PER_DEGREE * lon_scale(from.lat());
                (dlat * dlat + dlon * dlon).sqrt()
            }
            DistanceMetric::Haversine => {
                let (lat1, lat2) = (from.lat().to_radians(), to.lat().to_radians());
                let dlat = lat2 - lat1;
                let dlon = (to.lon() - from.lon()).to_radians();
                let a = (dlat / 2.0).sin().powi(2)
                    + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
                2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
            }
        }
    }
}

/// Longitude scaling factor at a latitude, clamped away from zero.
pub fn lon_scale(lat: f64) -> f64 {
    lat.to_radians().cos().abs().max(MIN_COS_LAT)
}

/// A stop found within a search radius.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStop {
    pub stop_id: StopId,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn planar_one_degree_latitude() {
        let d = DistanceMetric::Planar.distance_km(c(0.0, 0.0), c(1.0, 0.0));
        assert!((d - 111.32).abs() < 1e-9);
    }

    #[test]
    fn planar_longitude_shrinks_with_latitude() {
        let at_equator = DistanceMetric::Planar.distance_km(c(0.0, 0.0), c(0.0, 1.0));
        let at_sixty = DistanceMetric::Planar.distance_km(c(60.0, 0.0), c(60.0, 1.0));
        assert!((at_equator - 111.32).abs() < 1e-9);
        assert!((at_sixty - 55.66).abs() < 0.01);
    }

    #[test]
    fn planar_clamps_near_pole() {
        let d = DistanceMetric::Planar.distance_km(c(90.0, 0.0), c(90.0, 1.0));
        assert!((d - 111.32 * MIN_COS_LAT).abs() < 1e-9);
    }

    #[test]
    fn haversine_close_to_planar_for_short_distances() {
        let a = c(51.0, -114.0);
        let b = c(51.05, -114.0);
        let planar = DistanceMetric::Planar.distance_km(a, b);
        let haversine = DistanceMetric::Haversine.distance_km(a, b);
        assert!((planar - haversine).abs() < 0.05, "{planar} vs {haversine}");
    }

    #[test]
    fn zero_distance() {
        let a = c(51.0, -114.0);
        assert_eq!(DistanceMetric::Planar.distance_km(a, a), 0.0);
        assert_eq!(DistanceMetric::Haversine.distance_km(a, a), 0.0);
    }
}

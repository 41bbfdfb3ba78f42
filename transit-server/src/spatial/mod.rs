//! Geospatial stop lookup.
//!
//! Resolves a coordinate and radius to the stops around it, ordered by
//! distance. The index is built once per schedule snapshot.

mod distance;
mod index;

pub use distance::{DistanceMetric, NearbyStop};
pub use index::StopIndex;

/// Normalize a requested search radius.
///
/// Missing, non-finite, zero or negative radii fall back to `default_km`;
/// anything larger than `max_km` is clamped.
///
/// # Examples
///
/// ```
/// use transit_server::spatial::effective_radius;
///
/// assert_eq!(effective_radius(Some(2.0), 0.5, 5.0), 2.0);
/// assert_eq!(effective_radius(Some(-1.0), 0.5, 5.0), 0.5);
/// assert_eq!(effective_radius(Some(12.0), 0.5, 5.0), 5.0);
/// assert_eq!(effective_radius(None, 0.5, 5.0), 0.5);
/// ```
pub fn effective_radius(requested: Option<f64>, default_km: f64, max_km: f64) -> f64 {
    match requested {
        Some(r) if r.is_finite() && r > 0.0 => r.min(max_km),
        _ => default_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_normalization() {
        assert_eq!(effective_radius(Some(0.0), 0.5, 5.0), 0.5);
        assert_eq!(effective_radius(Some(f64::NAN), 0.5, 5.0), 0.5);
        assert_eq!(effective_radius(Some(f64::INFINITY), 0.5, 5.0), 0.5);
        assert_eq!(effective_radius(Some(5.0), 0.5, 5.0), 5.0);
        assert_eq!(effective_radius(Some(0.1), 0.5, 5.0), 0.1);
    }
}

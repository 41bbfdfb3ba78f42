//! R-tree index over stop locations.
//!
//! Queries use two-stage filtering: the R-tree selects stops inside a
//! bounding box sized from the radius, then the configured metric gives the
//! exact distance and drops anything outside the radius.

use rstar::{AABB, RTree, RTreeObject};

use crate::domain::{Coordinate, StopId};

use super::distance::{DistanceMetric, KM_PER_DEGREE, NearbyStop, lon_scale};

/// Relative padding on the bounding box, so the haversine metric never
/// loses stops the planar box would have cut off.
const ENVELOPE_PADDING: f64 = 1.1;

#[derive(Debug, Clone)]
struct StopNode {
    stop_id: StopId,
    location: Coordinate,
    point: [f64; 2],
}

impl RTreeObject for StopNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

/// Spatial index answering "which stops are within r km of here".
#[derive(Debug, Default)]
pub struct StopIndex {
    tree: RTree<StopNode>,
}

impl StopIndex {
    /// Bulk-load an index from stop positions.
    pub fn new(stops: impl IntoIterator<Item = (StopId, Coordinate)>) -> Self {
        let nodes = stops
            .into_iter()
            .map(|(stop_id, location)| StopNode {
                stop_id,
                point: [location.lon(), location.lat()],
                location,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(nodes),
        }
    }

    /// Stops within `radius_km` of `center`, nearest first.
    ///
    /// Ties in distance are broken by stop id so results are deterministic.
    pub fn within(
        &self,
        center: Coordinate,
        radius_km: f64,
        metric: DistanceMetric,
    ) -> Vec<NearbyStop> {
        if radius_km.is_nan() || radius_km <= 0.0 {
            return Vec::new();
        }

        let lat_span = radius_km / KM_PER_DEGREE * ENVELOPE_PADDING;
        let lon_span = radius_km / (KM_PER_DEGREE * lon_scale(center.lat())) * ENVELOPE_PADDING;
        let envelope = AABB::from_corners(
            [center.lon() - lon_span, center.lat() - lat_span],
            [center.lon() + lon_span, center.lat() + lat_span],
        );

        let mut found: Vec<NearbyStop> = self
            .tree
            .locate_in_envelope(&envelope)
            .filter_map(|node| {
                let distance_km = metric.distance_km(center, node.location);
                (distance_km <= radius_km).then(|| NearbyStop {
                    stop_id: node.stop_id.clone(),
                    distance_km,
                })
            })
            .collect();

        found.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.stop_id.cmp(&b.stop_id))
        });
        found
    }
}

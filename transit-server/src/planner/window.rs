//! Departure time windows with overnight normalization.

use crate::domain::{MINUTES_PER_DAY, ServiceTime, StopId};
use crate::schedule::{ScheduleStore, VisitRef};

/// Raw schedule times below this may be next-day early service (04:00).
const EARLY_SERVICE_END: ServiceTime = ServiceTime::from_minutes(4 * 60 - 1);

/// An inclusive range of acceptable departure times around a reference.
///
/// Bounds are in normalized time: a departure qualifies when its scheduled
/// time, normalized against `reference`, falls in `[earliest, latest]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    reference: ServiceTime,
    earliest: ServiceTime,
    latest: ServiceTime,
}

impl TimeWindow {
    /// Window spanning `before` minutes before to `after` minutes after the
    /// target.
    pub fn around(target: ServiceTime, before: i32, after: i32) -> Self {
        Self {
            reference: target,
            earliest: target - before,
            latest: target + after,
        }
    }

    /// Window with explicit bounds, normalizing against `reference`.
    pub fn between(reference: ServiceTime, earliest: ServiceTime, latest: ServiceTime) -> Self {
        Self {
            reference,
            earliest,
            latest,
        }
    }

    pub fn reference(&self) -> ServiceTime {
        self.reference
    }

    pub fn earliest(&self) -> ServiceTime {
        self.earliest
    }

    pub fn latest(&self) -> ServiceTime {
        self.latest
    }

    /// Normalize a raw schedule time against this window's reference.
    pub fn normalize(&self, raw: ServiceTime) -> ServiceTime {
        raw.normalized_against(self.reference)
    }

    /// Whether a raw schedule time qualifies once normalized.
    pub fn admits(&self, raw: ServiceTime) -> bool {
        let t = self.normalize(raw);
        self.earliest <= t && t <= self.latest
    }

    /// Departures from `stop` inside this window, earliest (normalized)
    /// first, at most `limit` of them.
    ///
    /// Early-morning departures are looked up separately when the reference
    /// is late evening, since they only qualify after wrapping past
    /// midnight.
    pub fn departures<'s>(
        &self,
        store: &'s ScheduleStore,
        stop: &StopId,
        limit: usize,
    ) -> Vec<&'s VisitRef> {
        let mut found: Vec<&VisitRef> = store
            .departures_between(stop, self.earliest, self.latest)
            .iter()
            .collect();

        if self.reference.is_late_evening() {
            let wrapped_latest = (self.latest - MINUTES_PER_DAY).min(EARLY_SERVICE_END);
            found.extend(store.departures_between(stop, ServiceTime::from_minutes(0), wrapped_latest));
        }

        found.retain(|r| self.admits(r.departure));
        found.sort_by(|a, b| {
            self.normalize(a.departure)
                .cmp(&self.normalize(b.departure))
                .then_with(|| a.trip_id.cmp(&b.trip_id))
        });
        found.dedup_by(|a, b| a.trip_id == b.trip_id && a.position == b.position);
        found.truncate(limit);
        found
    }
}

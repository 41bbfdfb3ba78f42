//! Caching layer for predictions.
//!
//! Predictions for the same final trip, alighting stop and departure hour
//! are interchangeable for a short while, so repeated searches between the
//! same areas reuse them instead of calling the backend again.

use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{StopId, TripId};

use super::PredictionAdapter;
use super::error::PredictionError;
use super::types::{Prediction, PredictionQuery};

/// Cache key: (trip, alighting stop, departure hour).
type PredictionKey = (TripId, StopId, u32);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 10_000,
        }
    }
}

/// Prediction adapter with caching.
///
/// Only successful predictions are cached; failures are retried on the
/// next request.
pub struct CachedPredictor<P> {
    inner: P,
    cache: MokaCache<PredictionKey, Prediction>,
}

impl<P: PredictionAdapter> CachedPredictor<P> {
    /// Wrap an adapter with a cache.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, cache }
    }

    fn key(query: &PredictionQuery) -> PredictionKey {
        (
            query.trip_id.clone(),
            query.stop_id.clone(),
            query.departure_hour,
        )
    }

    /// Access the wrapped adapter.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: PredictionAdapter> PredictionAdapter for CachedPredictor<P> {
    async fn predict(&self, query: &PredictionQuery) -> Result<Prediction, PredictionError> {
        let key = Self::key(query);

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let prediction = self.inner.predict(query).await?;
        self.cache.insert(key, prediction.clone()).await;
        Ok(prediction)
    }
}

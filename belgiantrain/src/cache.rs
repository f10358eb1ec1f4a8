//! Caching layer for iRail responses.
//!
//! A connection pair and a standalone liveboard may watch the same
//! station, and every coordinator polls on the same cadence. Caching the
//! board and connection responses for a short TTL lets coordinators that
//! refresh close together share one upstream request.
//!
//! Only answers with data are cached. "No data" and errors always go back
//! to iRail on the next call, so a coordinator never keeps failing on a
//! cached failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use moka::future::Cache as MokaCache;

use crate::domain::{
    Composition, ConnectionResult, Disturbance, LiveboardResult, Station, StationId, VehicleInfo,
};
use crate::irail::{ApiResult, IrailApi};

/// Cache key for connection lookups: (from, to).
type ConnectionKey = (StationId, StationId);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per kind.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 256,
        }
    }
}

/// iRail client with caching.
///
/// Wraps any [`IrailApi`] and caches liveboard and connection responses.
/// Everything else passes straight through. The TTL must stay below the
/// coordinators' refresh period, or a refresh can republish a cached answer
/// as current; [`Config::validate`](crate::config::Config::validate)
/// enforces this.
pub struct CachedIrailClient {
    client: Arc<dyn IrailApi>,
    liveboards: MokaCache<StationId, Arc<LiveboardResult>>,
    connections: MokaCache<ConnectionKey, Arc<ConnectionResult>>,
}

impl CachedIrailClient {
    /// Create a new cached client.
    pub fn new(client: Arc<dyn IrailApi>, config: &CacheConfig) -> Self {
        let liveboards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let connections = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            client,
            liveboards,
            connections,
        }
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.liveboards.entry_count() + self.connections.entry_count()
    }
}

#[async_trait]
impl IrailApi for CachedIrailClient {
    async fn get_stations(&self) -> ApiResult<Vec<Station>> {
        self.client.get_stations().await
    }

    async fn get_connections(
        &self,
        from: &StationId,
        to: &StationId,
    ) -> ApiResult<ConnectionResult> {
        let key = (from.clone(), to.clone());

        // Try cache first
        if let Some(cached) = self.connections.get(&key).await {
            return Ok(Some((*cached).clone()));
        }

        let fetched = self.client.get_connections(from, to).await?;
        if let Some(result) = &fetched {
            self.connections.insert(key, Arc::new(result.clone())).await;
        }

        Ok(fetched)
    }

    async fn get_liveboard(&self, station: &StationId) -> ApiResult<LiveboardResult> {
        if let Some(cached) = self.liveboards.get(station).await {
            return Ok(Some((*cached).clone()));
        }

        let fetched = self.client.get_liveboard(station).await?;
        if let Some(board) = &fetched {
            self.liveboards
                .insert(station.clone(), Arc::new(board.clone()))
                .await;
        }

        Ok(fetched)
    }

    async fn get_disturbances(
        &self,
        line_break_character: Option<&str>,
    ) -> ApiResult<Vec<Disturbance>> {
        self.client.get_disturbances(line_break_character).await
    }

    async fn get_vehicle(
        &self,
        vehicle_id: &str,
        date: Option<NaiveDate>,
        alerts: bool,
    ) -> ApiResult<VehicleInfo> {
        self.client.get_vehicle(vehicle_id, date, alerts).await
    }

    async fn get_composition(&self, train_id: &str) -> ApiResult<Composition> {
        self.client.get_composition(train_id).await
    }
}

//! Station lookup.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Station, StationId};
use crate::irail::IrailApi;

use super::error::StationError;

/// Thread-safe station directory.
///
/// Holds the station list in upstream order, so name lookups are
/// deterministic ("first match wins"). Refreshing swaps the whole list.
#[derive(Clone)]
pub struct StationDirectory {
    inner: Arc<RwLock<Arc<Vec<Station>>>>,
    client: Arc<dyn IrailApi>,
}

impl StationDirectory {
    /// Create a new directory by fetching from the API.
    ///
    /// This fails if the API is unreachable or has no station data.
    pub async fn fetch(client: Arc<dyn IrailApi>) -> Result<Self, StationError> {
        let stations = fetch_stations(client.as_ref()).await?;

        Ok(Self {
            inner: Arc::new(RwLock::new(Arc::new(stations))),
            client,
        })
    }

    /// Create a directory from an already known station list.
    pub fn from_stations(client: Arc<dyn IrailApi>, stations: Vec<Station>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(stations))),
            client,
        }
    }

    /// Look up a station by exact id.
    pub async fn find_by_id(&self, id: &StationId) -> Option<Station> {
        let guard = self.inner.read().await;
        guard.iter().find(|s| &s.id == id).cloned()
    }

    /// Look up a station by its standard or localised name.
    ///
    /// Exact match; the first station in upstream order wins.
    pub async fn find_by_name(&self, name: &str) -> Option<Station> {
        let guard = self.inner.read().await;
        guard
            .iter()
            .find(|s| s.standard_name == name || s.name == name)
            .cloned()
    }

    /// Stations whose name or standard name contains `filter`,
    /// ignoring case.
    pub async fn filter_by_name(&self, filter: &str) -> Vec<Station> {
        let needle = filter.to_lowercase();
        let guard = self.inner.read().await;
        guard
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&needle)
                    || s.standard_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Snapshot of every station.
    pub async fn all(&self) -> Arc<Vec<Station>> {
        self.inner.read().await.clone()
    }

    /// Get the number of stations in the directory.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the directory is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Refresh the station list from the API.
    ///
    /// On success, replaces the current list. On failure, the existing
    /// list is preserved and the error is returned.
    pub async fn refresh(&self) -> Result<usize, StationError> {
        let stations = fetch_stations(self.client.as_ref()).await?;
        let count = stations.len();

        let mut guard = self.inner.write().await;
        *guard = Arc::new(stations);

        Ok(count)
    }
}

async fn fetch_stations(client: &dyn IrailApi) -> Result<Vec<Station>, StationError> {
    client
        .get_stations()
        .await?
        .ok_or(StationError::Unavailable)
}

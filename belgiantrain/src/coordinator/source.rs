//! What a coordinator fetches on each cycle.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ConnectionResult, LiveboardResult, Station};
use crate::irail::IrailApi;

use super::error::UpdateFailed;

/// One refresh cycle's worth of upstream work.
///
/// `fetch` either yields a complete snapshot or fails as a whole; there
/// are no partial snapshots.
#[async_trait]
pub trait RefreshSource: Send + Sync + 'static {
    type Snapshot: Send + Sync + 'static;

    /// Short description used in logs.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<Self::Snapshot, UpdateFailed>;
}

/// Snapshot for a station pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSnapshot {
    pub connections: ConnectionResult,
    pub liveboard_from: LiveboardResult,
    pub liveboard_to: LiveboardResult,
}

/// Snapshot for a standalone liveboard.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveboardSnapshot {
    pub liveboard: LiveboardResult,
}

/// Fetches connections between two stations plus both stations' boards.
pub struct ConnectionSource {
    api: Arc<dyn IrailApi>,
    station_from: Station,
    station_to: Station,
}

impl ConnectionSource {
    pub fn new(api: Arc<dyn IrailApi>, station_from: Station, station_to: Station) -> Self {
        Self {
            api,
            station_from,
            station_to,
        }
    }
}

#[async_trait]
impl RefreshSource for ConnectionSource {
    type Snapshot = ConnectionSnapshot;

    fn describe(&self) -> String {
        format!(
            "{} -> {}",
            self.station_from.standard_name, self.station_to.standard_name
        )
    }

    async fn fetch(&self) -> Result<ConnectionSnapshot, UpdateFailed> {
        let from = &self.station_from;
        let to = &self.station_to;

        // The three lookups are independent; wait for all of them.
        let (connections, liveboard_from, liveboard_to) = tokio::join!(
            self.api.get_connections(&from.id, &to.id),
            self.api.get_liveboard(&from.id),
            self.api.get_liveboard(&to.id),
        );

        let connections = connections.map_err(UpdateFailed::communication)?;
        let liveboard_from = liveboard_from.map_err(UpdateFailed::communication)?;
        let liveboard_to = liveboard_to.map_err(UpdateFailed::communication)?;

        let connections =
            connections.ok_or_else(|| UpdateFailed::new("Failed to fetch connection data"))?;
        let liveboard_from = liveboard_from.ok_or_else(|| missing_liveboard(from))?;
        let liveboard_to = liveboard_to.ok_or_else(|| missing_liveboard(to))?;

        Ok(ConnectionSnapshot {
            connections,
            liveboard_from,
            liveboard_to,
        })
    }
}

/// Fetches one station's liveboard.
pub struct LiveboardSource {
    api: Arc<dyn IrailApi>,
    station: Station,
}

impl LiveboardSource {
    pub fn new(api: Arc<dyn IrailApi>, station: Station) -> Self {
        Self { api, station }
    }
}

#[async_trait]
impl RefreshSource for LiveboardSource {
    type Snapshot = LiveboardSnapshot;

    fn describe(&self) -> String {
        format!("liveboard {}", self.station.standard_name)
    }

    async fn fetch(&self) -> Result<LiveboardSnapshot, UpdateFailed> {
        let liveboard = self
            .api
            .get_liveboard(&self.station.id)
            .await
            .map_err(UpdateFailed::communication)?
            .ok_or_else(|| missing_liveboard(&self.station))?;

        Ok(LiveboardSnapshot { liveboard })
    }
}

fn missing_liveboard(station: &Station) -> UpdateFailed {
    UpdateFailed::new(format!(
        "Failed to fetch liveboard data for {}",
        station.standard_name
    ))
}

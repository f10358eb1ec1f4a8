//! The upstream operations the rest of the crate depends on.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Composition, ConnectionResult, Disturbance, LiveboardResult, Station, StationId, VehicleInfo,
};

use super::error::IrailError;

/// Result of an upstream call.
///
/// `Err` means the request failed (transport, protocol or server error).
/// `Ok(None)` means the API answered but had no data, which callers treat as
/// a distinct, non-exceptional failure mode.
pub type ApiResult<T> = Result<Option<T>, IrailError>;

/// Asynchronous access to the iRail API.
#[async_trait]
pub trait IrailApi: Send + Sync {
    /// All stations known to iRail.
    async fn get_stations(&self) -> ApiResult<Vec<Station>>;

    /// Ride options from `from` to `to`, departing now, earliest first.
    async fn get_connections(
        &self,
        from: &StationId,
        to: &StationId,
    ) -> ApiResult<ConnectionResult>;

    /// Upcoming departures from `station`.
    async fn get_liveboard(&self, station: &StationId) -> ApiResult<LiveboardResult>;

    /// Current disturbances and planned works.
    ///
    /// `line_break_character` replaces line breaks in descriptions.
    async fn get_disturbances(
        &self,
        line_break_character: Option<&str>,
    ) -> ApiResult<Vec<Disturbance>>;

    /// A vehicle's run on `date` (today when `None`).
    async fn get_vehicle(
        &self,
        vehicle_id: &str,
        date: Option<NaiveDate>,
        alerts: bool,
    ) -> ApiResult<VehicleInfo>;

    /// Rolling stock composition of a train.
    async fn get_composition(&self, train_id: &str) -> ApiResult<Composition>;
}

//! Service calls.
//!
//! One-shot lookups that bypass the coordinators. Failures are reported
//! inside the response payload and never escape as errors.

mod dto;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::irail::IrailApi;
use crate::stations::StationDirectory;

pub use dto::*;

const VEHICLE_NOT_FOUND: &str = "Vehicle not found or API error";
const COMPOSITION_NOT_FOUND: &str = "Composition not found or API error";

/// Handles the service calls against a shared client and directory.
#[derive(Clone)]
pub struct Services {
    api: Arc<dyn IrailApi>,
    stations: StationDirectory,
}

impl Services {
    pub fn new(api: Arc<dyn IrailApi>, stations: StationDirectory) -> Self {
        Self { api, stations }
    }

    /// Current network disturbances.
    ///
    /// "No data" is an empty list; a failed call is an empty list plus an
    /// error message.
    pub async fn get_disturbances(&self, req: DisturbancesRequest) -> DisturbancesResponse {
        match self
            .api
            .get_disturbances(req.line_break_character.as_deref())
            .await
        {
            Ok(disturbances) => DisturbancesResponse {
                disturbances: disturbances
                    .unwrap_or_default()
                    .iter()
                    .map(DisturbanceResult::from_disturbance)
                    .collect(),
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "Error fetching disturbances");
                DisturbancesResponse {
                    disturbances: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Stops of one vehicle run.
    pub async fn get_vehicle(&self, req: VehicleRequest) -> VehicleResponse {
        let result = self
            .api
            .get_vehicle(&req.vehicle_id, req.date, req.alerts)
            .await;

        match result {
            Ok(Some(vehicle)) => VehicleResponse::from_vehicle(&vehicle),
            Ok(None) => {
                debug!(vehicle_id = %req.vehicle_id, "Vehicle not found");
                VehicleResponse::NotFound {
                    vehicle_id: req.vehicle_id,
                    error: VEHICLE_NOT_FOUND.to_string(),
                }
            }
            Err(e) => {
                warn!(vehicle_id = %req.vehicle_id, error = %e, "Error fetching vehicle");
                VehicleResponse::NotFound {
                    vehicle_id: req.vehicle_id,
                    error: VEHICLE_NOT_FOUND.to_string(),
                }
            }
        }
    }

    /// Rolling stock of one train.
    pub async fn get_composition(&self, req: CompositionRequest) -> CompositionResponse {
        match self.api.get_composition(&req.train_id).await {
            Ok(Some(composition)) => {
                CompositionResponse::from_composition(&req.train_id, &composition)
            }
            Ok(None) => {
                debug!(train_id = %req.train_id, "Composition not found");
                CompositionResponse::NotFound {
                    train_id: req.train_id,
                    error: COMPOSITION_NOT_FOUND.to_string(),
                }
            }
            Err(e) => {
                warn!(train_id = %req.train_id, error = %e, "Error fetching composition");
                CompositionResponse::NotFound {
                    train_id: req.train_id,
                    error: COMPOSITION_NOT_FOUND.to_string(),
                }
            }
        }
    }

    /// Stations from the directory, optionally filtered by name.
    ///
    /// Never calls iRail.
    pub async fn get_stations(&self, req: StationsRequest) -> StationsResponse {
        let stations = match req.name_filter.as_deref() {
            Some(filter) if !filter.is_empty() => self.stations.filter_by_name(filter).await,
            _ => self.stations.all().await.to_vec(),
        };

        StationsResponse {
            count: stations.len(),
            stations: stations.iter().map(StationResult::from_station).collect(),
        }
    }
}

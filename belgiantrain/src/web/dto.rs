//! Data transfer objects for web responses.

use serde::Serialize;

use crate::coordinator::CoordinatorStatus;
use crate::sensor::SensorState;

/// Every sensor, ordered by unique id.
#[derive(Debug, Serialize)]
pub struct SensorListResponse {
    pub sensors: Vec<SensorState>,
    pub count: usize,
}

impl SensorListResponse {
    pub fn new(sensors: Vec<SensorState>) -> Self {
        Self {
            count: sensors.len(),
            sensors,
        }
    }
}

/// Every coordinator, ordered by entry id.
#[derive(Debug, Serialize)]
pub struct CoordinatorListResponse {
    pub coordinators: Vec<CoordinatorStatus>,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

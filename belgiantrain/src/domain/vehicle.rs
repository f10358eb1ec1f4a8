//! Vehicle (train run) details.

use chrono::{DateTime, Utc};

/// A stop on a vehicle's run.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleStop {
    pub station: String,
    pub platform: String,
    pub time: DateTime<Utc>,
    /// Delay in seconds.
    pub delay: i64,
    pub canceled: bool,
}

/// A single train run with all its stops.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleInfo {
    pub vehicle_id: String,
    /// Short human name, e.g. `IC 1832`.
    pub name: Option<String>,
    pub stops: Vec<VehicleStop>,
}

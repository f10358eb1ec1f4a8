//! Ride options between two stations.

use chrono::{DateTime, Utc};

/// Departure half of a connection, at the origin station.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDeparture {
    /// Name of the departure station.
    pub station: String,
    /// Scheduled departure time.
    pub time: DateTime<Utc>,
    /// Delay in seconds.
    pub delay: i64,
    pub platform: String,
    pub canceled: bool,
    /// Whether the train has already left the station.
    pub left: bool,
    /// Vehicle identifier, e.g. `BE.NMBS.IC1832`.
    pub vehicle: String,
    /// Name of the train's final destination.
    pub direction: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Arrival half of a connection, at the destination station.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionArrival {
    pub station: String,
    pub time: DateTime<Utc>,
    pub delay: i64,
    pub platform: String,
    pub canceled: bool,
}

/// One side (arriving or departing) of a transfer at a via station.
#[derive(Debug, Clone, PartialEq)]
pub struct ViaStop {
    pub time: DateTime<Utc>,
    pub platform: String,
    pub delay: i64,
    pub canceled: bool,
}

/// An intermediate station where the rider changes trains.
#[derive(Debug, Clone, PartialEq)]
pub struct Via {
    pub station: String,
    pub arrival: ViaStop,
    pub departure: ViaStop,
    /// Scheduled transfer time in seconds.
    pub time_between: i64,
    pub vehicle: String,
}

/// A single ride option.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub departure: ConnectionDeparture,
    pub arrival: ConnectionArrival,
    /// Transfers, in travel order. Empty for a direct train.
    pub vias: Vec<Via>,
    /// Scheduled duration in seconds.
    pub duration: i64,
}

impl Connection {
    /// Whether the rider has to change trains at least once.
    pub fn is_via(&self) -> bool {
        !self.vias.is_empty()
    }
}

/// Ride options between two stations, earliest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectionResult {
    pub connections: Vec<Connection>,
}

//! Domain types for Belgian railway data.
//!
//! These are the validated shapes the rest of the crate works with. Raw
//! iRail payloads are converted into them once, at the client boundary, so
//! optional upstream fields are already resolved to concrete values here.

mod composition;
mod connection;
mod disturbance;
mod liveboard;
mod station;
mod vehicle;

pub use composition::{Composition, CompositionSegment, CompositionUnit};
pub use connection::{
    Connection, ConnectionArrival, ConnectionDeparture, ConnectionResult, Via, ViaStop,
};
pub use disturbance::Disturbance;
pub use liveboard::{LiveboardDeparture, LiveboardResult};
pub use station::{InvalidStationId, Station, StationId};
pub use vehicle::{VehicleInfo, VehicleStop};

//! Sensor projections.
//!
//! A sensor turns the latest coordinator snapshot plus its static
//! configuration into a displayed value and a set of attributes. The
//! projection itself is synchronous and side-effect free apart from the
//! sensor's own state; [`SensorEntity`] binds it to a coordinator.

mod connection;
mod entity;
mod liveboard;
mod time;

use serde::Serialize;

pub use connection::{
    ConnectionAttributes, ConnectionConfig, ConnectionSensor, select_connection,
};
pub use entity::{SensorEntity, SensorState};
pub use liveboard::{LiveboardAttributes, LiveboardSensor};
pub use time::{delay_minutes, minutes_until, ride_duration_minutes};

/// Credit shown on every sensor.
pub const ATTRIBUTION: &str = "https://api.irail.be/";

pub const ICON_TRAIN: &str = "mdi:train";
pub const ICON_ALERT: &str = "mdi:alert-octagon";

/// A sensor's displayed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Minutes(i64),
    Text(String),
}

/// Descriptive side of a sensor, independent of the snapshot type.
pub trait Sensor: Send + Sync + 'static {
    fn unique_id(&self) -> String;

    fn name(&self) -> String;

    fn icon(&self) -> &'static str;

    fn native_value(&self) -> Option<SensorValue>;

    fn unit_of_measurement(&self) -> Option<&'static str> {
        None
    }

    /// Attributes as of `now`, or `None` when there is nothing to show.
    fn extra_state_attributes(&self, now: chrono::DateTime<chrono::Utc>)
    -> Option<serde_json::Value>;

    fn enabled_by_default(&self) -> bool {
        true
    }
}

/// Recompute a sensor from a snapshot of type `S`.
pub trait Projects<S>: Sensor {
    fn handle_update(&mut self, snapshot: &S);
}

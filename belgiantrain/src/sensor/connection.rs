//! Ride-duration sensor for a station pair.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::coordinator::ConnectionSnapshot;
use crate::domain::{Connection, Station};

use super::time::{delay_minutes, minutes_until, ride_duration_minutes};
use super::{ICON_ALERT, ICON_TRAIN, Projects, Sensor, SensorValue};

/// Pick the ride option to display.
///
/// The earliest option wins unless it has already left and a later one
/// exists.
pub fn select_connection(connections: &[Connection]) -> Option<&Connection> {
    match connections {
        [first, second, ..] if first.departure.left => Some(second),
        [first, ..] => Some(first),
        [] => None,
    }
}

/// Static configuration of a station-pair sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub station_from: Station,
    pub station_to: Station,
    pub exclude_vias: bool,
    pub show_on_map: bool,
    /// Display name; derived from the stations when absent.
    pub name: Option<String>,
}

impl ConnectionConfig {
    pub fn new(station_from: Station, station_to: Station) -> Self {
        Self {
            station_from,
            station_to,
            exclude_vias: false,
            show_on_map: false,
            name: None,
        }
    }

    pub fn with_exclude_vias(mut self, exclude_vias: bool) -> Self {
        self.exclude_vias = exclude_vias;
        self
    }

    pub fn with_show_on_map(mut self, show_on_map: bool) -> Self {
        self.show_on_map = show_on_map;
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Suffix shared by every entity of this pair.
    pub(crate) fn vias_suffix(&self) -> &'static str {
        if self.exclude_vias { "_excl_vias" } else { "" }
    }
}

/// Attributes published next to the ride duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionAttributes {
    /// Name of the departure station.
    pub destination: String,
    pub direction: String,
    pub platform_arriving: String,
    pub platform_departing: String,
    pub vehicle_id: String,
    pub canceled: bool,
    pub departure: Option<String>,
    pub departure_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_arrival_platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_transfer_platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_transfer_time: Option<i64>,
    pub delay: String,
    pub delay_minutes: i64,
}

/// Shows the total travel time of the next sensible ride between two
/// stations, in minutes.
#[derive(Debug, Clone)]
pub struct ConnectionSensor {
    config: ConnectionConfig,
    selected: Option<Connection>,
    value: Option<i64>,
}

impl ConnectionSensor {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            selected: None,
            value: None,
        }
    }

    /// The ride option selected by the last update.
    pub fn selected(&self) -> Option<&Connection> {
        self.selected.as_ref()
    }

    /// Ride duration in minutes.
    pub fn value(&self) -> Option<i64> {
        self.value
    }

    fn is_via_connection(&self) -> bool {
        self.selected.as_ref().is_some_and(Connection::is_via)
    }

    pub fn attributes(&self, now: DateTime<Utc>) -> Option<ConnectionAttributes> {
        self.value?;
        let ride = self.selected.as_ref()?;
        let departure = &ride.departure;

        let delay = delay_minutes(departure.delay);
        let (departure_text, departure_minutes) = if departure.canceled {
            (None, None)
        } else {
            let minutes = minutes_until(Some(departure.time), now);
            (Some(format!("In {minutes} minutes")), Some(minutes))
        };

        let coordinates = match (departure.latitude, departure.longitude) {
            (Some(lat), Some(lon)) if self.config.show_on_map => Some((lat, lon)),
            _ => None,
        };

        let via = ride.vias.first().filter(|_| !self.config.exclude_vias);

        Some(ConnectionAttributes {
            destination: departure.station.clone(),
            direction: departure.direction.clone(),
            platform_arriving: ride.arrival.platform.clone(),
            platform_departing: departure.platform.clone(),
            vehicle_id: departure.vehicle.clone(),
            canceled: departure.canceled,
            departure: departure_text,
            departure_minutes,
            latitude: coordinates.map(|c| c.0),
            longitude: coordinates.map(|c| c.1),
            via: via.map(|v| v.station.clone()),
            via_arrival_platform: via.map(|v| v.arrival.platform.clone()),
            via_transfer_platform: via.map(|v| v.departure.platform.clone()),
            via_transfer_time: via
                .map(|v| delay_minutes(v.time_between) + delay_minutes(v.departure.delay)),
            delay: format!("{delay} minutes"),
            delay_minutes: delay,
        })
    }
}

impl Sensor for ConnectionSensor {
    fn unique_id(&self) -> String {
        format!(
            "nmbs_connection_{}_{}{}",
            self.config.station_from.id,
            self.config.station_to.id,
            self.config.vias_suffix()
        )
    }

    fn name(&self) -> String {
        match &self.config.name {
            Some(name) => name.clone(),
            None => format!(
                "Train from {} to {}",
                self.config.station_from.standard_name, self.config.station_to.standard_name
            ),
        }
    }

    fn icon(&self) -> &'static str {
        match &self.selected {
            Some(ride) if delay_minutes(ride.departure.delay) > 0 => ICON_ALERT,
            _ => ICON_TRAIN,
        }
    }

    fn native_value(&self) -> Option<SensorValue> {
        self.value.map(SensorValue::Minutes)
    }

    fn unit_of_measurement(&self) -> Option<&'static str> {
        Some("min")
    }

    fn extra_state_attributes(&self, now: DateTime<Utc>) -> Option<serde_json::Value> {
        self.attributes(now)
            .and_then(|attrs| serde_json::to_value(attrs).ok())
    }
}

impl Projects<ConnectionSnapshot> for ConnectionSensor {
    fn handle_update(&mut self, snapshot: &ConnectionSnapshot) {
        let Some(ride) = select_connection(&snapshot.connections.connections) else {
            warn!(sensor = %self.unique_id(), "No connections available");
            self.value = None;
            self.selected = None;
            return;
        };

        self.selected = Some(ride.clone());

        if self.config.exclude_vias && self.is_via_connection() {
            debug!(
                sensor = %self.unique_id(),
                "Skipping update because this connection is a via"
            );
            return;
        }

        self.value = Some(ride_duration_minutes(
            ride.departure.time,
            ride.arrival.time,
            ride.departure.delay,
        ));
    }
}

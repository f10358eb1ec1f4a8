//! Next-departure sensor for a single station.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::coordinator::{ConnectionSnapshot, LiveboardSnapshot};
use crate::domain::{LiveboardDeparture, LiveboardResult, Station};

use super::connection::ConnectionConfig;
use super::time::{delay_minutes, minutes_until};
use super::{ICON_ALERT, ICON_TRAIN, Projects, Sensor, SensorValue};

/// Attributes published next to the board's first departure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveboardAttributes {
    pub departure: String,
    pub departure_minutes: i64,
    pub extra_train: bool,
    pub vehicle_id: String,
    pub monitored_station: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_minutes: Option<i64>,
}

/// Which board a sensor reads.
#[derive(Debug, Clone, PartialEq)]
enum Board {
    /// One endpoint of a connection pair.
    Pair {
        from: Station,
        to: Station,
        vias_suffix: &'static str,
    },
    /// A liveboard coordinator of its own.
    Standalone,
}

/// Shows the next departure from a station, as
/// `Track <platform> - <destination>`.
#[derive(Debug, Clone)]
pub struct LiveboardSensor {
    station: Station,
    board: Board,
    next: Option<LiveboardDeparture>,
    value: Option<String>,
}

impl LiveboardSensor {
    /// Board for one endpoint of a connection pair. Disabled by default.
    pub fn for_pair(station: Station, pair: &ConnectionConfig) -> Self {
        Self::with_board(
            station,
            Board::Pair {
                from: pair.station_from.clone(),
                to: pair.station_to.clone(),
                vias_suffix: pair.vias_suffix(),
            },
        )
    }

    /// Board backed by a standalone liveboard coordinator.
    pub fn standalone(station: Station) -> Self {
        Self::with_board(station, Board::Standalone)
    }

    fn with_board(station: Station, board: Board) -> Self {
        Self {
            station,
            board,
            next: None,
            value: None,
        }
    }

    pub fn attributes(&self, now: DateTime<Utc>) -> Option<LiveboardAttributes> {
        self.value.as_ref()?;
        let next = self.next.as_ref()?;

        let delay = delay_minutes(next.delay);
        let departure = minutes_until(Some(next.time), now);
        let delayed = delay > 0;

        Some(LiveboardAttributes {
            departure: format!("In {departure} minutes"),
            departure_minutes: departure,
            extra_train: next.is_extra,
            vehicle_id: next.vehicle.clone(),
            monitored_station: self.station.standard_name.clone(),
            delay: delayed.then(|| format!("{delay} minutes")),
            delay_minutes: delayed.then_some(delay),
        })
    }

    fn apply_board(&mut self, board: &LiveboardResult) {
        let Some(next) = board.departures.first() else {
            warn!(sensor = %self.unique_id(), station = %board.station, "No departures on liveboard");
            self.value = None;
            self.next = None;
            return;
        };

        self.value = Some(format!("Track {} - {}", next.platform, next.station));
        self.next = Some(next.clone());
    }
}

impl Sensor for LiveboardSensor {
    fn unique_id(&self) -> String {
        match &self.board {
            Board::Pair {
                from,
                to,
                vias_suffix,
            } => format!(
                "nmbs_live_{}_{}_{}{}",
                self.station.id, from.id, to.id, vias_suffix
            ),
            Board::Standalone => format!("nmbs_liveboard_{}", self.station.id),
        }
    }

    fn name(&self) -> String {
        format!("Trains in {}", self.station.standard_name)
    }

    fn icon(&self) -> &'static str {
        match &self.next {
            Some(next) if next.delay > 0 => ICON_ALERT,
            _ => ICON_TRAIN,
        }
    }

    fn native_value(&self) -> Option<SensorValue> {
        self.value.clone().map(SensorValue::Text)
    }

    fn extra_state_attributes(&self, now: DateTime<Utc>) -> Option<serde_json::Value> {
        self.attributes(now)
            .and_then(|attrs| serde_json::to_value(attrs).ok())
    }

    fn enabled_by_default(&self) -> bool {
        matches!(self.board, Board::Standalone)
    }
}

impl Projects<ConnectionSnapshot> for LiveboardSensor {
    fn handle_update(&mut self, snapshot: &ConnectionSnapshot) {
        let is_from = match &self.board {
            Board::Pair { from, .. } => from.id == self.station.id,
            Board::Standalone => false,
        };
        let board = if is_from {
            &snapshot.liveboard_from
        } else {
            &snapshot.liveboard_to
        };
        self.apply_board(board);
    }
}

impl Projects<LiveboardSnapshot> for LiveboardSensor {
    fn handle_update(&mut self, snapshot: &LiveboardSnapshot) {
        self.apply_board(&snapshot.liveboard);
    }
}

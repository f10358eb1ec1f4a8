//! Departure boards for a single station.

use chrono::{DateTime, Utc};

/// A departure on a station's liveboard.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveboardDeparture {
    /// Name of the train's destination.
    pub station: String,
    pub time: DateTime<Utc>,
    /// Delay in seconds.
    pub delay: i64,
    pub platform: String,
    pub vehicle: String,
    /// Trains added outside the regular timetable.
    pub is_extra: bool,
    pub canceled: bool,
    pub left: bool,
}

/// Upcoming departures for one station, earliest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiveboardResult {
    /// Name of the monitored station as reported by the board.
    pub station: String,
    pub departures: Vec<LiveboardDeparture>,
}

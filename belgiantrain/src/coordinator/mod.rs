//! Periodic refresh coordination.
//!
//! A coordinator owns the latest complete snapshot for one monitored
//! entity (a station pair or a single station), refreshes it on a fixed
//! period, and notifies subscribers after every attempt. A failed attempt
//! never clears the last good snapshot; it only flips the
//! `last_update_success` flag and records why.

use std::time::Duration;

mod error;
mod refresh;
mod source;

pub use error::UpdateFailed;
pub use refresh::{
    Coordinator, CoordinatorHandle, CoordinatorInfo, CoordinatorState, CoordinatorStatus,
};
pub use source::{
    ConnectionSnapshot, ConnectionSource, LiveboardSnapshot, LiveboardSource, RefreshSource,
};

/// Default refresh period for connection and liveboard data.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

//! Station directory error types.

use crate::irail::IrailError;

/// Errors that can occur when loading the station directory.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// The request to iRail failed
    #[error("failed to fetch stations: {0}")]
    Api(#[from] IrailError),

    /// iRail answered without station data
    #[error("the iRail API is currently unavailable")]
    Unavailable,
}

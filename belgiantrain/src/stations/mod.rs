//! Station directory.
//!
//! Provides station id and name lookup, fetched from iRail once at
//! startup. The directory is a fatal precondition: without it no
//! connection or liveboard can be resolved.

mod directory;
mod error;

pub use directory::StationDirectory;
pub use error::StationError;

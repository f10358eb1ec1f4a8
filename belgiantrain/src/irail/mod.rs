//! iRail API client.
//!
//! iRail is the community-run open API over the SNCB/NMBS timetable and
//! real-time feeds. This module wraps it behind the [`IrailApi`] trait so
//! the coordinators and services can be driven by the real HTTP client, the
//! caching decorator, or the in-memory mock alike.
//!
//! Key characteristics of iRail:
//! - Numbers and booleans arrive as strings (`"0"`, `"1"`, `"1700000000"`)
//! - Times are Unix timestamps in seconds, delays are in seconds
//! - A missing resource is reported with HTTP 404, which we surface as
//!   "no data" rather than as an error

mod api;
mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use api::{ApiResult, IrailApi};
pub use client::{IrailClient, IrailConfig};
pub use convert::ConversionError;
pub use error::IrailError;
pub use mock::{MockCall, MockIrailClient, MockResponse};

//! HTTP surface.
//!
//! Exposes sensor state, coordinator status and the service calls as
//! JSON endpoints.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;

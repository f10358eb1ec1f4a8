//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::sensor::SensorState;
use crate::services::{
    CompositionRequest, CompositionResponse, DisturbancesRequest, DisturbancesResponse,
    StationsRequest, StationsResponse, VehicleRequest, VehicleResponse,
};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sensors", get(list_sensors))
        .route("/api/sensors/:unique_id", get(get_sensor))
        .route("/api/coordinators", get(list_coordinators))
        .route("/api/services/get_disturbances", post(get_disturbances))
        .route("/api/services/get_vehicle", post(get_vehicle))
        .route("/api/services/get_composition", post(get_composition))
        .route("/api/services/get_stations", post(get_stations))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn list_sensors(State(state): State<AppState>) -> Json<SensorListResponse> {
    Json(SensorListResponse::new(state.app.sensors()))
}

async fn get_sensor(
    State(state): State<AppState>,
    Path(unique_id): Path<String>,
) -> Result<Json<SensorState>, AppError> {
    state
        .app
        .sensor(&unique_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown sensor: {unique_id}"),
        })
}

async fn list_coordinators(State(state): State<AppState>) -> Json<CoordinatorListResponse> {
    Json(CoordinatorListResponse {
        coordinators: state.app.coordinators(),
    })
}

async fn get_disturbances(
    State(state): State<AppState>,
    Json(req): Json<DisturbancesRequest>,
) -> Json<DisturbancesResponse> {
    Json(state.app.services().get_disturbances(req).await)
}

async fn get_vehicle(
    State(state): State<AppState>,
    Json(req): Json<VehicleRequest>,
) -> Result<Json<VehicleResponse>, AppError> {
    if req.vehicle_id.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: "vehicle_id must not be empty".into(),
        });
    }
    Ok(Json(state.app.services().get_vehicle(req).await))
}

async fn get_composition(
    State(state): State<AppState>,
    Json(req): Json<CompositionRequest>,
) -> Result<Json<CompositionResponse>, AppError> {
    if req.train_id.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: "train_id must not be empty".into(),
        });
    }
    Ok(Json(state.app.services().get_composition(req).await))
}

async fn get_stations(
    State(state): State<AppState>,
    Json(req): Json<StationsRequest>,
) -> Json<StationsResponse> {
    Json(state.app.services().get_stations(req).await)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "Request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::app::AppContext;
    use crate::config::LiveboardEntry;
    use crate::domain::{LiveboardResult, Station, StationId};
    use crate::irail::{IrailApi, MockIrailClient, MockResponse};
    use crate::stations::StationDirectory;

    const BRUSSELS: &str = "BE.NMBS.008812005";

    async fn state() -> AppState {
        let mock = MockIrailClient::new();
        mock.set_liveboard(
            &StationId::parse(BRUSSELS).unwrap(),
            MockResponse::Data(LiveboardResult::default()),
        );
        let api: Arc<dyn IrailApi> = Arc::new(mock);
        let stations = StationDirectory::from_stations(
            Arc::clone(&api),
            vec![Station {
                id: StationId::parse(BRUSSELS).unwrap(),
                name: "Brussels-Central".into(),
                standard_name: "Brussels-Central".into(),
                latitude: None,
                longitude: None,
            }],
        );
        let app = AppContext::new(api, stations, Duration::from_secs(60));
        app.setup_liveboard(&LiveboardEntry {
            station: BRUSSELS.into(),
        })
        .await
        .unwrap();
        AppState::new(Arc::new(app))
    }

    #[tokio::test]
    async fn lists_sensors_and_coordinators() {
        let state = state().await;

        let Json(sensors) = list_sensors(State(state.clone())).await;
        assert_eq!(sensors.count, 1);
        assert_eq!(
            sensors.sensors[0].unique_id,
            format!("nmbs_liveboard_{BRUSSELS}")
        );

        let Json(coordinators) = list_coordinators(State(state)).await;
        assert_eq!(coordinators.coordinators.len(), 1);
        assert!(coordinators.coordinators[0].data_available);
    }

    #[tokio::test]
    async fn sensor_lookup() {
        let state = state().await;

        let found = get_sensor(
            State(state.clone()),
            Path(format!("nmbs_liveboard_{BRUSSELS}")),
        )
        .await;
        assert!(found.is_ok());

        let missing = get_sensor(State(state), Path("nmbs_liveboard_x".into())).await;
        let response = missing.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_vehicle_id_is_a_bad_request() {
        let state = state().await;
        let result = get_vehicle(
            State(state),
            Json(VehicleRequest {
                vehicle_id: " ".into(),
                date: None,
                alerts: false,
            }),
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stations_service_over_http() {
        let state = state().await;
        let Json(resp) = get_stations(
            State(state),
            Json(StationsRequest {
                name_filter: Some("brussels".into()),
            }),
        )
        .await;
        assert_eq!(resp.count, 1);
    }

    #[tokio::test]
    async fn router_builds_with_every_route() {
        // Conflicting or malformed paths panic here.
        let _router = create_router(state().await);
        assert_eq!(health().await, "ok");
    }
}

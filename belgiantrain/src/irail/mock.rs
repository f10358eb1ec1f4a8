//! In-memory iRail client for tests and offline runs.
//!
//! Every operation is programmable: it can answer with data, with "no
//! data" (`Ok(None)`), or with an error. Calls are recorded so tests can
//! assert on what was asked.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Composition, ConnectionResult, Disturbance, LiveboardResult, Station, StationId, VehicleInfo,
};

use super::api::{ApiResult, IrailApi};
use super::error::IrailError;

/// A canned answer for one mock operation.
#[derive(Debug, Clone)]
pub enum MockResponse<T> {
    /// Answer with data.
    Data(T),
    /// Answer with "no data".
    Empty,
    /// Fail with an API error carrying this message.
    Error(String),
}

impl<T: Clone> MockResponse<T> {
    fn to_result(&self) -> ApiResult<T> {
        match self {
            MockResponse::Data(data) => Ok(Some(data.clone())),
            MockResponse::Empty => Ok(None),
            MockResponse::Error(message) => Err(IrailError::Api {
                status: 503,
                message: message.clone(),
            }),
        }
    }
}

impl<T> Default for MockResponse<T> {
    fn default() -> Self {
        MockResponse::Empty
    }
}

/// A recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Stations,
    Connections { from: StationId, to: StationId },
    Liveboard(StationId),
    Disturbances(Option<String>),
    Vehicle {
        vehicle_id: String,
        date: Option<NaiveDate>,
        alerts: bool,
    },
    Composition(String),
}

#[derive(Default)]
struct MockState {
    stations: MockResponse<Vec<Station>>,
    connections: HashMap<(StationId, StationId), MockResponse<ConnectionResult>>,
    liveboards: HashMap<StationId, MockResponse<LiveboardResult>>,
    disturbances: MockResponse<Vec<Disturbance>>,
    vehicles: HashMap<String, MockResponse<VehicleInfo>>,
    compositions: HashMap<String, MockResponse<Composition>>,
    calls: Vec<MockCall>,
}

/// Mock iRail client that serves programmed responses.
///
/// Unprogrammed lookups answer with "no data", like iRail's 404.
#[derive(Clone, Default)]
pub struct MockIrailClient {
    state: Arc<Mutex<MockState>>,
    latency: Option<Duration>,
}

impl MockIrailClient {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every answer by `latency` (useful with paused tokio time).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not wedge the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_stations(&self, response: MockResponse<Vec<Station>>) {
        self.lock().stations = response;
    }

    pub fn set_connections(
        &self,
        from: &StationId,
        to: &StationId,
        response: MockResponse<ConnectionResult>,
    ) {
        self.lock()
            .connections
            .insert((from.clone(), to.clone()), response);
    }

    pub fn set_liveboard(&self, station: &StationId, response: MockResponse<LiveboardResult>) {
        self.lock().liveboards.insert(station.clone(), response);
    }

    pub fn set_disturbances(&self, response: MockResponse<Vec<Disturbance>>) {
        self.lock().disturbances = response;
    }

    pub fn set_vehicle(&self, vehicle_id: &str, response: MockResponse<VehicleInfo>) {
        self.lock().vehicles.insert(vehicle_id.to_string(), response);
    }

    pub fn set_composition(&self, train_id: &str, response: MockResponse<Composition>) {
        self.lock()
            .compositions
            .insert(train_id.to_string(), response);
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    async fn answer<T: Clone>(
        &self,
        call: MockCall,
        pick: impl FnOnce(&MockState) -> Option<&MockResponse<T>>,
    ) -> ApiResult<T> {
        let result = {
            let mut state = self.lock();
            state.calls.push(call);
            pick(&state).map_or(Ok(None), MockResponse::to_result)
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        result
    }
}

#[async_trait]
impl IrailApi for MockIrailClient {
    async fn get_stations(&self) -> ApiResult<Vec<Station>> {
        self.answer(MockCall::Stations, |s| Some(&s.stations)).await
    }

    async fn get_connections(
        &self,
        from: &StationId,
        to: &StationId,
    ) -> ApiResult<ConnectionResult> {
        let key = (from.clone(), to.clone());
        let call = MockCall::Connections {
            from: from.clone(),
            to: to.clone(),
        };
        self.answer(call, |s| s.connections.get(&key)).await
    }

    async fn get_liveboard(&self, station: &StationId) -> ApiResult<LiveboardResult> {
        self.answer(MockCall::Liveboard(station.clone()), |s| {
            s.liveboards.get(station)
        })
        .await
    }

    async fn get_disturbances(
        &self,
        line_break_character: Option<&str>,
    ) -> ApiResult<Vec<Disturbance>> {
        let call = MockCall::Disturbances(line_break_character.map(str::to_string));
        self.answer(call, |s| Some(&s.disturbances)).await
    }

    async fn get_vehicle(
        &self,
        vehicle_id: &str,
        date: Option<NaiveDate>,
        alerts: bool,
    ) -> ApiResult<VehicleInfo> {
        let call = MockCall::Vehicle {
            vehicle_id: vehicle_id.to_string(),
            date,
            alerts,
        };
        self.answer(call, |s| s.vehicles.get(vehicle_id)).await
    }

    async fn get_composition(&self, train_id: &str) -> ApiResult<Composition> {
        self.answer(MockCall::Composition(train_id.to_string()), |s| {
            s.compositions.get(train_id)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn unprogrammed_lookups_return_no_data() {
        let client = MockIrailClient::new();
        let result = client.get_liveboard(&id("BE.NMBS.008812005")).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn programmed_error_is_returned() {
        let client = MockIrailClient::new();
        client.set_disturbances(MockResponse::Error("boom".into()));

        let err = client.get_disturbances(None).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn calls_are_recorded_in_order() {
        let client = MockIrailClient::new();
        let from = id("BE.NMBS.008812005");
        let to = id("BE.NMBS.008892007");

        let _ = client.get_connections(&from, &to).await;
        let _ = client.get_liveboard(&to).await;

        assert_eq!(
            client.calls(),
            vec![
                MockCall::Connections {
                    from: from.clone(),
                    to: to.clone()
                },
                MockCall::Liveboard(to),
            ]
        );
        assert_eq!(
            client.count_calls(|c| matches!(c, MockCall::Liveboard(_))),
            1
        );
    }
}

//! Application context: owns every coordinator and sensor.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::config::{Config, ConnectionEntry, LiveboardEntry};
use crate::coordinator::{
    ConnectionSource, Coordinator, CoordinatorHandle, CoordinatorInfo, CoordinatorStatus,
    LiveboardSource, RefreshSource, UpdateFailed,
};
use crate::domain::{Station, StationId};
use crate::irail::IrailApi;
use crate::sensor::{
    ConnectionConfig, ConnectionSensor, LiveboardSensor, SensorEntity, SensorState,
};
use crate::services::Services;
use crate::stations::StationDirectory;

/// Why a monitored entry could not be set up.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("could not find station '{0}'")]
    StationNotFound(String),

    #[error("departure and arrival station are both {0}")]
    SameStation(String),

    #[error("{0} is already configured")]
    AlreadyConfigured(String),

    #[error("first refresh of {entry} failed: {source}")]
    FirstRefresh {
        entry: String,
        #[source]
        source: UpdateFailed,
    },
}

/// Outcome of setting up every configured entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupSummary {
    pub configured: usize,
    pub failed: usize,
}

struct Entry {
    coordinator: Arc<dyn CoordinatorInfo>,
    handle: CoordinatorHandle,
}

#[derive(Default)]
struct Registry {
    /// Keyed by entry id (`connection_<from>_<to>[_excl_vias]` or
    /// `liveboard_<station>`).
    entries: BTreeMap<String, Entry>,
    /// Keyed by sensor unique id.
    entities: BTreeMap<String, SensorEntity>,
}

/// Owns the API client, the station directory, and every running
/// coordinator with its sensors.
pub struct AppContext {
    api: Arc<dyn IrailApi>,
    stations: StationDirectory,
    services: Services,
    update_interval: Duration,
    registry: Mutex<Registry>,
}

impl AppContext {
    pub fn new(
        api: Arc<dyn IrailApi>,
        stations: StationDirectory,
        update_interval: Duration,
    ) -> Self {
        let services = Services::new(Arc::clone(&api), stations.clone());
        Self {
            api,
            stations,
            services,
            update_interval,
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Resolve a station reference: an iRail id, or else a name.
    pub async fn resolve_station(&self, reference: &str) -> Result<Station, SetupError> {
        if let Ok(id) = StationId::parse(reference) {
            if let Some(station) = self.stations.find_by_id(&id).await {
                return Ok(station);
            }
        }

        self.stations
            .find_by_name(reference)
            .await
            .ok_or_else(|| SetupError::StationNotFound(reference.to_string()))
    }

    /// Set up every configured entry.
    ///
    /// Entries are independent: one failing does not stop the others.
    /// Configured boards go first, so a connection asking for the same
    /// board finds it in place instead of racing it.
    pub async fn setup_from_config(&self, config: &Config) -> SetupSummary {
        let liveboards =
            join_all(config.liveboards.iter().map(|e| self.setup_liveboard(e))).await;
        let connections =
            join_all(config.connections.iter().map(|e| self.setup_connection(e))).await;

        let mut summary = SetupSummary {
            configured: 0,
            failed: 0,
        };
        for result in connections.into_iter().chain(liveboards) {
            match result {
                Ok(_) => summary.configured += 1,
                Err(e) => {
                    error!(error = %e, "Failed to set up entry");
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Set up a station pair: one coordinator, the ride sensor and both
    /// endpoint boards.
    ///
    /// Nothing is registered unless the first refresh succeeds. Returns the
    /// entry id.
    pub async fn setup_connection(&self, entry: &ConnectionEntry) -> Result<String, SetupError> {
        let from = self.resolve_station(&entry.station_from).await?;
        let to = self.resolve_station(&entry.station_to).await?;
        if from.id == to.id {
            return Err(SetupError::SameStation(from.standard_name));
        }

        let config = ConnectionConfig::new(from.clone(), to.clone())
            .with_exclude_vias(entry.exclude_vias)
            .with_show_on_map(entry.show_on_map)
            .with_name(entry.name.clone());
        let id = format!("connection_{}_{}{}", from.id, to.id, config.vias_suffix());
        self.ensure_vacant(&id)?;

        let source = ConnectionSource::new(Arc::clone(&self.api), from.clone(), to.clone());
        let coordinator = self.first_refresh(&id, source).await?;

        let entities = vec![
            SensorEntity::attach(&coordinator, LiveboardSensor::for_pair(from.clone(), &config)),
            SensorEntity::attach(&coordinator, LiveboardSensor::for_pair(to.clone(), &config)),
            SensorEntity::attach(&coordinator, ConnectionSensor::new(config)),
        ];
        self.register(&id, coordinator, entities)?;
        info!(entry = %id, from = %from.standard_name, to = %to.standard_name, "Connection set up");

        if entry.add_departure_liveboard {
            self.ensure_liveboard(from).await;
        }
        if entry.add_arrival_liveboard {
            self.ensure_liveboard(to).await;
        }

        Ok(id)
    }

    /// Set up a standalone board. Returns the entry id.
    pub async fn setup_liveboard(&self, entry: &LiveboardEntry) -> Result<String, SetupError> {
        let station = self.resolve_station(&entry.station).await?;
        self.setup_liveboard_for(station).await
    }

    async fn setup_liveboard_for(&self, station: Station) -> Result<String, SetupError> {
        let id = format!("liveboard_{}", station.id);
        self.ensure_vacant(&id)?;

        let source = LiveboardSource::new(Arc::clone(&self.api), station.clone());
        let coordinator = self.first_refresh(&id, source).await?;

        let entities = vec![SensorEntity::attach(
            &coordinator,
            LiveboardSensor::standalone(station.clone()),
        )];
        self.register(&id, coordinator, entities)?;
        info!(entry = %id, station = %station.standard_name, "Liveboard set up");

        Ok(id)
    }

    /// Board requested alongside a connection; an existing one is kept.
    async fn ensure_liveboard(&self, station: Station) {
        match self.setup_liveboard_for(station).await {
            Ok(_) | Err(SetupError::AlreadyConfigured(_)) => {}
            Err(e) => warn!(error = %e, "Failed to add liveboard for connection"),
        }
    }

    fn ensure_vacant(&self, id: &str) -> Result<(), SetupError> {
        if self.lock().entries.contains_key(id) {
            return Err(SetupError::AlreadyConfigured(id.to_string()));
        }
        Ok(())
    }

    async fn first_refresh<S: RefreshSource>(
        &self,
        id: &str,
        source: S,
    ) -> Result<Arc<Coordinator<S>>, SetupError> {
        let coordinator = Arc::new(Coordinator::new(id, source, self.update_interval));
        coordinator
            .first_refresh()
            .await
            .map_err(|source| SetupError::FirstRefresh {
                entry: id.to_string(),
                source,
            })?;
        Ok(coordinator)
    }

    /// Publish an entry and start its periodic refresh.
    ///
    /// Checked again under the lock: two setups of the same entry may have
    /// raced through their first refresh.
    fn register<S: RefreshSource>(
        &self,
        id: &str,
        coordinator: Arc<Coordinator<S>>,
        entities: Vec<SensorEntity>,
    ) -> Result<(), SetupError> {
        let mut registry = self.lock();
        if registry.entries.contains_key(id) {
            return Err(SetupError::AlreadyConfigured(id.to_string()));
        }

        for entity in entities {
            registry
                .entities
                .insert(entity.unique_id().to_string(), entity);
        }
        let handle = coordinator.start();
        registry.entries.insert(
            id.to_string(),
            Entry {
                coordinator,
                handle,
            },
        );
        Ok(())
    }

    /// Current state of every sensor, ordered by unique id.
    pub fn sensors(&self) -> Vec<SensorState> {
        self.lock().entities.values().map(SensorEntity::state).collect()
    }

    pub fn sensor(&self, unique_id: &str) -> Option<SensorState> {
        self.lock().entities.get(unique_id).map(SensorEntity::state)
    }

    /// Status of every coordinator, ordered by entry id.
    pub fn coordinators(&self) -> Vec<CoordinatorStatus> {
        self.lock()
            .entries
            .values()
            .map(|entry| entry.coordinator.status())
            .collect()
    }

    /// Stop every coordinator and drop every sensor.
    pub fn shutdown(&self) {
        let mut registry = self.lock();
        let count = registry.entries.len();

        for (_, entry) in std::mem::take(&mut registry.entries) {
            entry.handle.shutdown();
        }
        registry.entities.clear();

        info!(coordinators = count, "Shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionResult, LiveboardResult};
    use crate::irail::{MockCall, MockIrailClient, MockResponse};

    const BRUSSELS: &str = "BE.NMBS.008812005";
    const GHENT: &str = "BE.NMBS.008892007";
    const ANTWERP: &str = "BE.NMBS.008821006";

    fn station(id: &str, name: &str) -> Station {
        Station {
            id: StationId::parse(id).unwrap(),
            name: name.to_string(),
            standard_name: name.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    /// A mock that answers every pair and board between the three stations.
    fn mock() -> MockIrailClient {
        let mock = MockIrailClient::new();
        for from in [BRUSSELS, GHENT, ANTWERP] {
            mock.set_liveboard(&id(from), MockResponse::Data(LiveboardResult::default()));
            for to in [BRUSSELS, GHENT, ANTWERP] {
                mock.set_connections(
                    &id(from),
                    &id(to),
                    MockResponse::Data(ConnectionResult::default()),
                );
            }
        }
        mock
    }

    fn context(mock: &MockIrailClient) -> AppContext {
        let api: Arc<dyn IrailApi> = Arc::new(mock.clone());
        let stations = StationDirectory::from_stations(
            Arc::clone(&api),
            vec![
                station(BRUSSELS, "Brussels-Central"),
                station(GHENT, "Ghent-Sint-Pieters"),
                station(ANTWERP, "Antwerp-Central"),
            ],
        );
        AppContext::new(api, stations, Duration::from_secs(60))
    }

    fn connection(from: &str, to: &str) -> ConnectionEntry {
        ConnectionEntry {
            station_from: from.to_string(),
            station_to: to.to_string(),
            exclude_vias: false,
            show_on_map: false,
            name: None,
            add_departure_liveboard: false,
            add_arrival_liveboard: false,
        }
    }

    #[tokio::test]
    async fn connection_registers_three_sensors() {
        let mock = mock();
        let app = context(&mock);

        let id = app
            .setup_connection(&connection("Brussels-Central", GHENT))
            .await
            .unwrap();
        assert_eq!(id, format!("connection_{BRUSSELS}_{GHENT}"));

        let sensors = app.sensors();
        assert_eq!(sensors.len(), 3);
        let ride = app
            .sensor(&format!("nmbs_connection_{BRUSSELS}_{GHENT}"))
            .unwrap();
        assert!(ride.available);
        assert!(ride.enabled_by_default);
        assert_eq!(
            sensors.iter().filter(|s| !s.enabled_by_default).count(),
            2
        );

        let coordinators = app.coordinators();
        assert_eq!(coordinators.len(), 1);
        assert!(coordinators[0].last_update_success);
    }

    #[tokio::test]
    async fn unknown_station_is_rejected() {
        let app = context(&mock());
        let err = app
            .setup_connection(&connection("Atlantis", GHENT))
            .await
            .unwrap_err();
        assert!(matches!(err, SetupError::StationNotFound(s) if s == "Atlantis"));
    }

    #[tokio::test]
    async fn same_station_is_rejected() {
        let app = context(&mock());
        let err = app
            .setup_connection(&connection(BRUSSELS, "Brussels-Central"))
            .await
            .unwrap_err();
        assert!(matches!(err, SetupError::SameStation(_)));
        assert!(app.coordinators().is_empty());
    }

    #[tokio::test]
    async fn duplicate_entry_is_rejected() {
        let app = context(&mock());
        app.setup_connection(&connection(BRUSSELS, GHENT))
            .await
            .unwrap();

        let err = app
            .setup_connection(&connection(BRUSSELS, GHENT))
            .await
            .unwrap_err();
        assert!(matches!(err, SetupError::AlreadyConfigured(_)));

        // Excluding vias makes it a different entry.
        let mut excl = connection(BRUSSELS, GHENT);
        excl.exclude_vias = true;
        app.setup_connection(&excl).await.unwrap();
        assert_eq!(app.coordinators().len(), 2);
    }

    #[tokio::test]
    async fn failed_first_refresh_registers_nothing() {
        let mock = mock();
        mock.set_connections(&id(BRUSSELS), &id(GHENT), MockResponse::Empty);
        let app = context(&mock);

        let err = app
            .setup_connection(&connection(BRUSSELS, GHENT))
            .await
            .unwrap_err();
        match err {
            SetupError::FirstRefresh { source, .. } => {
                assert_eq!(source.message(), "Failed to fetch connection data")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(app.sensors().is_empty());
        assert!(app.coordinators().is_empty());
    }

    #[tokio::test]
    async fn one_failing_entry_does_not_stop_the_others() {
        let mock = mock();
        mock.set_liveboard(&id(ANTWERP), MockResponse::Error("down".into()));
        let app = context(&mock);

        let config = Config::parse(&format!(
            "connections:\n  - station_from: {BRUSSELS}\n    station_to: {GHENT}\n  - station_from: Nowhere\n    station_to: {GHENT}\nliveboards:\n  - station: {ANTWERP}\n  - station: {GHENT}\n"
        ))
        .unwrap();

        let summary = app.setup_from_config(&config).await;
        assert_eq!(
            summary,
            SetupSummary {
                configured: 2,
                failed: 2
            }
        );
        assert!(app.sensor(&format!("nmbs_liveboard_{GHENT}")).is_some());
        assert!(app.sensor(&format!("nmbs_liveboard_{ANTWERP}")).is_none());
    }

    #[tokio::test]
    async fn connection_can_add_standalone_liveboards() {
        let mock = mock();
        let app = context(&mock);
        app.setup_liveboard(&LiveboardEntry {
            station: GHENT.to_string(),
        })
        .await
        .unwrap();

        let mut entry = connection(BRUSSELS, GHENT);
        entry.add_departure_liveboard = true;
        entry.add_arrival_liveboard = true;
        app.setup_connection(&entry).await.unwrap();

        assert!(app.sensor(&format!("nmbs_liveboard_{BRUSSELS}")).is_some());
        assert!(app.sensor(&format!("nmbs_liveboard_{GHENT}")).is_some());
        assert_eq!(app.coordinators().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn configured_board_also_requested_by_a_connection_counts_once() {
        let mock = mock().with_latency(Duration::from_secs(1));
        let app = context(&mock);

        let config = Config::parse(&format!(
            "connections:\n  - station_from: {BRUSSELS}\n    station_to: {GHENT}\n    add_departure_liveboard: true\nliveboards:\n  - station: {BRUSSELS}\n"
        ))
        .unwrap();

        let summary = app.setup_from_config(&config).await;
        assert_eq!(
            summary,
            SetupSummary {
                configured: 2,
                failed: 0
            }
        );
        assert!(app.sensor(&format!("nmbs_liveboard_{BRUSSELS}")).is_some());
        assert_eq!(app.coordinators().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_every_coordinator() {
        let mock = mock();
        let app = context(&mock);
        app.setup_connection(&connection(BRUSSELS, GHENT))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        let refreshed = mock.count_calls(|c| matches!(c, MockCall::Connections { .. }));
        assert_eq!(refreshed, 2);

        app.shutdown();
        assert!(app.coordinators().is_empty());
        assert!(app.sensors().is_empty());

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(
            mock.count_calls(|c| matches!(c, MockCall::Connections { .. })),
            refreshed
        );
    }

    #[test]
    fn setup_error_messages() {
        let err = SetupError::FirstRefresh {
            entry: "liveboard_BE.NMBS.008812005".into(),
            source: UpdateFailed::new("Failed to fetch liveboard data for Brussels-Central"),
        };
        assert_eq!(
            err.to_string(),
            "first refresh of liveboard_BE.NMBS.008812005 failed: Failed to fetch liveboard data for Brussels-Central"
        );
    }
}

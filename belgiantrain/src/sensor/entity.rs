//! Keeps a sensor in step with its coordinator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::coordinator::{Coordinator, CoordinatorState, RefreshSource};

use super::{ATTRIBUTION, Projects, Sensor, SensorValue};

/// Everything a host needs to display one sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub name: String,
    pub icon: &'static str,
    pub state: Option<SensorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<&'static str>,
    pub attributes: Option<serde_json::Value>,
    /// Whether the coordinator's latest refresh succeeded.
    pub available: bool,
    pub enabled_by_default: bool,
    pub attribution: &'static str,
    pub coordinator: String,
}

struct Shared<P> {
    sensor: RwLock<P>,
    available: AtomicBool,
}

impl<P: Sensor> Shared<P> {
    fn apply<T>(&self, state: &CoordinatorState<T>)
    where
        P: Projects<T>,
    {
        self.available
            .store(state.last_update_success, Ordering::Relaxed);

        if let Some(data) = &state.data {
            let mut sensor = self.sensor.write().unwrap_or_else(|e| e.into_inner());
            sensor.handle_update(data);
            trace!(sensor = %sensor.unique_id(), "Applied coordinator update");
        }
    }
}

/// Read side of a [`Shared`], with the projection type erased.
trait StateView: Send + Sync {
    fn state(&self, coordinator: &str, now: DateTime<Utc>) -> SensorState;
}

impl<P: Sensor> StateView for Shared<P> {
    fn state(&self, coordinator: &str, now: DateTime<Utc>) -> SensorState {
        let sensor = self.sensor.read().unwrap_or_else(|e| e.into_inner());
        SensorState {
            unique_id: sensor.unique_id(),
            name: sensor.name(),
            icon: sensor.icon(),
            state: sensor.native_value(),
            unit_of_measurement: sensor.unit_of_measurement(),
            attributes: sensor.extra_state_attributes(now),
            available: self.available.load(Ordering::Relaxed),
            enabled_by_default: sensor.enabled_by_default(),
            attribution: ATTRIBUTION,
            coordinator: coordinator.to_string(),
        }
    }
}

/// A sensor attached to a coordinator.
///
/// The current coordinator state is applied on attach; afterwards a
/// background task applies every published update until the entity is
/// dropped or the coordinator goes away.
pub struct SensorEntity {
    unique_id: String,
    coordinator: String,
    view: Arc<dyn StateView>,
    task: JoinHandle<()>,
}

impl SensorEntity {
    pub fn attach<S, P>(coordinator: &Coordinator<S>, sensor: P) -> Self
    where
        S: RefreshSource,
        P: Projects<S::Snapshot>,
    {
        let unique_id = sensor.unique_id();
        let shared = Arc::new(Shared {
            sensor: RwLock::new(sensor),
            available: AtomicBool::new(false),
        });

        let mut rx = coordinator.subscribe();
        let current = rx.borrow_and_update().clone();
        shared.apply(&current);

        let task_shared = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                task_shared.apply(&state);
            }
        });

        Self {
            unique_id,
            coordinator: coordinator.name().to_string(),
            view: shared,
            task,
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> SensorState {
        self.view.state(&self.coordinator, now)
    }

    pub fn state(&self) -> SensorState {
        self.state_at(Utc::now())
    }
}

impl Drop for SensorEntity {
    fn drop(&mut self) {
        self.task.abort();
    }
}

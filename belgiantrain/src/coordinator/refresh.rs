//! The coordinator and its periodic task.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::error::UpdateFailed;
use super::source::RefreshSource;

/// What subscribers see after every refresh attempt.
#[derive(Debug)]
pub struct CoordinatorState<T> {
    /// Last successfully fetched snapshot. Survives failed attempts.
    pub data: Option<Arc<T>>,
    /// Whether the most recent attempt succeeded.
    pub last_update_success: bool,
    /// Why the most recent attempt failed, if it did.
    pub last_error: Option<UpdateFailed>,
    /// When `data` was last replaced.
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for CoordinatorState<T> {
    fn default() -> Self {
        Self {
            data: None,
            last_update_success: false,
            last_error: None,
            last_updated: None,
        }
    }
}

impl<T> Clone for CoordinatorState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            last_update_success: self.last_update_success,
            last_error: self.last_error.clone(),
            last_updated: self.last_updated,
        }
    }
}

/// Type-erased coordinator status, for listing and monitoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorStatus {
    pub name: String,
    pub last_update_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub data_available: bool,
    pub update_interval_secs: u64,
}

/// Anything that can report a [`CoordinatorStatus`].
pub trait CoordinatorInfo: Send + Sync {
    fn status(&self) -> CoordinatorStatus;
}

/// Owns the latest snapshot for one monitored entity.
///
/// ```text
/// Idle -> Refreshing -> (Success | Failed) -> Idle, on a fixed timer
/// ```
///
/// Failed cycles are retried at the same cadence as successful ones.
pub struct Coordinator<S: RefreshSource> {
    name: String,
    source: S,
    interval: Duration,
    state: watch::Sender<CoordinatorState<S::Snapshot>>,
}

impl<S: RefreshSource> Coordinator<S> {
    pub fn new(name: impl Into<String>, source: S, interval: Duration) -> Self {
        let (state, _) = watch::channel(CoordinatorState::default());
        Self {
            name: name.into(),
            source,
            interval,
            state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one refresh cycle and publish the outcome.
    ///
    /// On success the snapshot is replaced wholesale. On failure the
    /// previous snapshot stays published and only the failure is recorded.
    /// Subscribers are notified either way.
    pub async fn refresh(&self) -> Result<(), UpdateFailed> {
        match self.source.fetch().await {
            Ok(snapshot) => {
                let recovered = self.state.borrow().last_error.is_some();
                self.state.send_replace(CoordinatorState {
                    data: Some(Arc::new(snapshot)),
                    last_update_success: true,
                    last_error: None,
                    last_updated: Some(Utc::now()),
                });

                if recovered {
                    info!(coordinator = %self.name, "Fetching data recovered");
                } else {
                    debug!(coordinator = %self.name, source = %self.source.describe(), "Refreshed");
                }
                Ok(())
            }
            Err(e) => {
                warn!(coordinator = %self.name, error = %e, "Error fetching data");
                self.state.send_modify(|state| {
                    state.last_update_success = false;
                    state.last_error = Some(e.clone());
                });
                Err(e)
            }
        }
    }

    /// The refresh that must succeed before the coordinator serves
    /// dependents.
    pub async fn first_refresh(&self) -> Result<(), UpdateFailed> {
        self.refresh().await
    }

    /// Latest successfully fetched snapshot.
    pub fn current_snapshot(&self) -> Option<Arc<S::Snapshot>> {
        self.state.borrow().data.clone()
    }

    /// Full current state.
    pub fn state(&self) -> CoordinatorState<S::Snapshot> {
        self.state.borrow().clone()
    }

    pub fn last_update_success(&self) -> bool {
        self.state.borrow().last_update_success
    }

    /// Receiver that is notified after every refresh attempt.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState<S::Snapshot>> {
        self.state.subscribe()
    }

    /// Spawn the periodic refresh task.
    ///
    /// The first tick fires one interval from now; the first refresh is
    /// expected to have run already.
    pub fn start(self: &Arc<Self>) -> CoordinatorHandle {
        let coordinator = Arc::clone(self);
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                // Failures are published to subscribers; nothing to do here.
                let _ = coordinator.refresh().await;
            }
        });

        info!(
            coordinator = %self.name,
            interval_secs = interval.as_secs(),
            "Started coordinator"
        );

        CoordinatorHandle {
            name: self.name.clone(),
            handle,
        }
    }
}

impl<S: RefreshSource> CoordinatorInfo for Coordinator<S> {
    fn status(&self) -> CoordinatorStatus {
        let state = self.state.borrow();
        CoordinatorStatus {
            name: self.name.clone(),
            last_update_success: state.last_update_success,
            last_error: state.last_error.as_ref().map(|e| e.to_string()),
            last_updated: state.last_updated,
            data_available: state.data.is_some(),
            update_interval_secs: self.interval.as_secs(),
        }
    }
}

/// Handle to a running coordinator task.
///
/// Dropping the handle stops the task, as does [`shutdown`](Self::shutdown).
/// A refresh in flight is abandoned; it never publishes a partial snapshot.
#[derive(Debug)]
pub struct CoordinatorHandle {
    name: String,
    handle: JoinHandle<()>,
}

impl CoordinatorHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the periodic task.
    pub fn shutdown(self) {
        // Drop does the work.
        info!(coordinator = %self.name, "Stopping coordinator");
    }
}

impl Drop for CoordinatorHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    /// Source that fails on demand.
    struct ScriptedSource {
        fail: Arc<std::sync::atomic::AtomicBool>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RefreshSource for ScriptedSource {
        type Snapshot = usize;

        fn describe(&self) -> String {
            "scripted".to_string()
        }

        async fn fetch(&self) -> Result<usize, UpdateFailed> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                Err(UpdateFailed::new("Failed to fetch connection data"))
            } else {
                Ok(n)
            }
        }
    }

    fn coordinator() -> (
        Arc<Coordinator<ScriptedSource>>,
        Arc<std::sync::atomic::AtomicBool>,
        Arc<AtomicUsize>,
    ) {
        let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let calls = Arc::new(AtomicUsize::new(0));
        let source = ScriptedSource {
            fail: fail.clone(),
            calls: calls.clone(),
        };
        let coordinator = Arc::new(Coordinator::new(
            "test",
            source,
            Duration::from_secs(60),
        ));
        (coordinator, fail, calls)
    }

    #[tokio::test]
    async fn successful_refresh_publishes_snapshot() {
        let (coordinator, _, _) = coordinator();
        assert!(coordinator.current_snapshot().is_none());

        coordinator.refresh().await.unwrap();

        assert_eq!(coordinator.current_snapshot().as_deref(), Some(&1));
        let state = coordinator.state();
        assert!(state.last_update_success);
        assert!(state.last_error.is_none());
        assert!(state.last_updated.is_some());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let (coordinator, fail, _) = coordinator();
        coordinator.refresh().await.unwrap();
        let before = coordinator.state();

        fail.store(true, Ordering::SeqCst);
        let err = coordinator.refresh().await.unwrap_err();
        assert_eq!(err.message(), "Failed to fetch connection data");

        let after = coordinator.state();
        assert_eq!(after.data.as_deref(), Some(&1));
        assert_eq!(after.last_updated, before.last_updated);
        assert!(!after.last_update_success);
        assert_eq!(after.last_error, Some(err));
    }

    #[tokio::test]
    async fn failed_first_refresh_leaves_no_snapshot() {
        let (coordinator, fail, _) = coordinator();
        fail.store(true, Ordering::SeqCst);

        assert!(coordinator.first_refresh().await.is_err());
        assert!(coordinator.current_snapshot().is_none());
        assert!(!coordinator.status().data_available);
    }

    #[tokio::test]
    async fn recovery_clears_the_error() {
        let (coordinator, fail, _) = coordinator();
        fail.store(true, Ordering::SeqCst);
        let _ = coordinator.refresh().await;

        fail.store(false, Ordering::SeqCst);
        coordinator.refresh().await.unwrap();

        let status = coordinator.status();
        assert!(status.last_update_success);
        assert!(status.last_error.is_none());
        assert_eq!(coordinator.current_snapshot().as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn subscribers_are_notified_on_success_and_failure() {
        let (coordinator, fail, _) = coordinator();
        let mut rx = coordinator.subscribe();

        coordinator.refresh().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().last_update_success);

        fail.store(true, Ordering::SeqCst);
        let _ = coordinator.refresh().await;
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().last_update_success);
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_task_refreshes_on_the_interval_until_shutdown() {
        let (coordinator, fail, calls) = coordinator();
        coordinator.first_refresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let handle = coordinator.start();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // A failed cycle is retried at the same cadence.
        fail.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(!coordinator.last_update_success());

        handle.shutdown();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn status_serializes_without_empty_error() {
        let status = CoordinatorStatus {
            name: "Brussels-Central -> Ghent-Sint-Pieters".into(),
            last_update_success: true,
            last_error: None,
            last_updated: None,
            data_available: true,
            update_interval_secs: 60,
        };

        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("last_error").is_none());
        assert_eq!(json["update_interval_secs"], 60);
    }
}

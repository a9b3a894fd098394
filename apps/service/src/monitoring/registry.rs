use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use super::executor::{ProbeExecutor, ProbeTarget};
use crate::database::models::{MAX_CHECK_INTERVAL, MIN_CHECK_INTERVAL, MonitoredTarget, TargetId};

/// Snapshot of the registry for the admin UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatus {
    pub is_initialized: bool,
    pub active_monitors: usize,
    pub monitored_apis: Vec<TargetId>,
}

#[derive(Default)]
struct RegistryState {
    handles: HashMap<TargetId, JoinHandle<()>>,
    initialized: bool,
}

/// Owns the periodic probe task of every scheduled target.
///
/// Holds at most one task per target id: `start` on an id that is already
/// scheduled aborts the old task before spawning the new one.
pub struct MonitorRegistry {
    executor: ProbeExecutor,
    state: Mutex<RegistryState>,
}

impl MonitorRegistry {
    pub fn new(executor: ProbeExecutor) -> Self {
        Self { executor, state: Mutex::new(RegistryState::default()) }
    }

    /// Schedule periodic probing of `target`, replacing any existing
    /// schedule for the same id. The first probe runs immediately.
    pub async fn start(&self, target: &MonitoredTarget) {
        let interval_secs = target.check_interval.clamp(MIN_CHECK_INTERVAL, MAX_CHECK_INTERVAL);
        let period = Duration::from_secs(u64::from(interval_secs));
        let probe_target = ProbeTarget::from(target);

        let mut state = self.state.lock().await;
        if let Some(previous) = state.handles.remove(&target.id) {
            previous.abort();
            debug!("Cancelled previous schedule for API ID: {}", target.id);
        }

        let handle = spawn_schedule(self.executor.clone(), probe_target, period);
        state.handles.insert(target.id, handle);

        info!(
            "Started monitoring API: {} ({}) - Interval: {}s",
            target.name, target.url, interval_secs
        );
    }

    /// Cancel the schedule for `id`; no-op if none exists
    pub async fn stop(&self, id: TargetId) -> bool {
        let mut state = self.state.lock().await;
        match state.handles.remove(&id) {
            Some(handle) => {
                handle.abort();
                info!("Stopped monitoring API ID: {}", id);
                true
            }
            None => false,
        }
    }

    /// Cancel every schedule and forget that initialization happened
    pub async fn stop_all(&self) {
        let mut state = self.state.lock().await;
        for (_, handle) in state.handles.drain() {
            handle.abort();
        }
        state.initialized = false;
        info!("Stopped all API monitoring");
    }

    pub async fn status(&self) -> RegistryStatus {
        let state = self.state.lock().await;
        let mut monitored_apis: Vec<_> = state.handles.keys().copied().collect();
        monitored_apis.sort_unstable();

        RegistryStatus {
            is_initialized: state.initialized,
            active_monitors: monitored_apis.len(),
            monitored_apis,
        }
    }

    pub async fn is_scheduled(&self, id: TargetId) -> bool {
        self.state.lock().await.handles.contains_key(&id)
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.initialized
    }

    /// Record that the initial bulk start has completed
    pub async fn mark_initialized(&self) {
        self.state.lock().await.initialized = true;
    }
}

impl Drop for MonitorRegistry {
    fn drop(&mut self) {
        for (_, handle) in self.state.get_mut().handles.drain() {
            handle.abort();
        }
    }
}

/// One task per target carrying two triggers: an immediate probe, then a
/// recurring one every `period` measured from when the schedule started.
fn spawn_schedule(
    executor: ProbeExecutor,
    target: ProbeTarget,
    period: Duration,
) -> JoinHandle<()> {
    let first_tick = Instant::now() + period;

    tokio::spawn(async move {
        executor.execute_scheduled(&target).await;

        let mut ticker = interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            executor.execute_scheduled(&target).await;
        }
    })
}

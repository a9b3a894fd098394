use std::sync::Arc;
use tracing::{debug, error, warn};

use super::checker::Prober;
use super::types::{HealthStatus, ProbeOutcome};
use crate::database::models::{HealthUpdate, MonitoredTarget, TargetId, stored_now};
use crate::database::{StoreError, TargetStore};

/// What a probe needs to know about its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub id: TargetId,
    pub name: String,
    pub url: String,
}

impl From<&MonitoredTarget> for ProbeTarget {
    fn from(target: &MonitoredTarget) -> Self {
        Self { id: target.id, name: target.name.clone(), url: target.url.clone() }
    }
}

/// Runs a probe and writes its outcome back to the store.
///
/// Shared by scheduled ticks and on-demand admin checks so both record
/// health the same way.
#[derive(Clone)]
pub struct ProbeExecutor {
    prober: Arc<dyn Prober>,
    store: Arc<dyn TargetStore>,
}

impl ProbeExecutor {
    pub fn new(prober: Arc<dyn Prober>, store: Arc<dyn TargetStore>) -> Self {
        Self { prober, store }
    }

    /// Probe and persist. Persistence failures are returned to the caller
    /// together with the outcome that could not be stored.
    pub async fn execute_check(
        &self,
        target: &ProbeTarget,
    ) -> Result<ProbeOutcome, (ProbeOutcome, StoreError)> {
        debug!("Checking API: {} ({})", target.name, target.url);
        let outcome = self.prober.probe(&target.url).await;
        log_outcome(target, &outcome);

        let health = HealthUpdate::from_outcome(&outcome, stored_now());
        match self.store.record_health(target.id, &health).await {
            Ok(true) => Ok(outcome),
            Ok(false) => {
                debug!(
                    "API {} (id {}) was removed before its result could be stored",
                    target.name, target.id
                );
                Ok(outcome)
            }
            Err(e) => Err((outcome, e)),
        }
    }

    /// Scheduled variant: a failed write is logged and the next tick retries
    pub async fn execute_scheduled(&self, target: &ProbeTarget) {
        if let Err((_, e)) = self.execute_check(target).await {
            error!("Failed to update API status for {}: {}", target.name, e);
        }
    }
}

fn log_outcome(target: &ProbeTarget, outcome: &ProbeOutcome) {
    let error = outcome.error.as_deref().unwrap_or_default();
    match outcome.status {
        HealthStatus::Up => {
            debug!("API {} is UP ({}ms)", target.name, outcome.response_time_ms.unwrap_or_default())
        }
        HealthStatus::Warning => warn!("API {} has WARNING ({})", target.name, error),
        HealthStatus::Down => warn!("API {} is DOWN ({})", target.name, error),
        HealthStatus::Unknown => debug!("API {} status unknown", target.name),
    }
}

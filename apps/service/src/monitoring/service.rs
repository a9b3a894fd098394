use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::checker::Prober;
use super::executor::{ProbeExecutor, ProbeTarget};
use super::registry::{MonitorRegistry, RegistryStatus};
use super::types::ProbeOutcome;
use crate::database::TargetStore;
use crate::database::models::{
    HealthSummary, MonitoredTarget, NewTarget, TargetFilter, TargetId, TargetPatch,
};
use crate::error::{MonitorError, MonitorResult};

/// Keeps the target store and the schedule registry consistent.
///
/// Every administrative mutation writes the store first and then
/// restarts or stops the matching schedule.
pub struct MonitorService {
    store: Arc<dyn TargetStore>,
    executor: ProbeExecutor,
    registry: MonitorRegistry,
    init_lock: Mutex<()>,
}

impl MonitorService {
    pub fn new(store: Arc<dyn TargetStore>, prober: Arc<dyn Prober>) -> Self {
        let executor = ProbeExecutor::new(prober, store.clone());
        let registry = MonitorRegistry::new(executor.clone());

        Self { store, executor, registry, init_lock: Mutex::new(()) }
    }

    /// Schedule every active target. Later calls are no-ops until `shutdown`.
    pub async fn initialize(&self) -> MonitorResult<()> {
        let _guard = self.init_lock.lock().await;
        if self.registry.is_initialized().await {
            return Ok(());
        }

        info!("Initializing API monitoring service...");
        let targets = self.store.list_active().await?;
        for target in &targets {
            self.registry.start(target).await;
        }
        self.registry.mark_initialized().await;

        info!("API monitoring service initialized with {} APIs", targets.len());
        Ok(())
    }

    pub async fn add_target(&self, data: NewTarget) -> MonitorResult<MonitoredTarget> {
        data.validate()?;

        let target = self.store.create(data).await?;
        if target.is_active {
            self.registry.start(&target).await;
        }

        info!("Added API {} (id {})", target.name, target.id);
        Ok(target)
    }

    pub async fn update_target(
        &self,
        id: TargetId,
        patch: TargetPatch,
    ) -> MonitorResult<MonitoredTarget> {
        if self.store.find_by_id(id).await?.is_none() {
            return Err(MonitorError::NotFound(id));
        }
        patch.validate()?;

        let target = self.store.update(id, &patch).await?.ok_or(MonitorError::NotFound(id))?;

        self.registry.stop(id).await;
        if target.is_active {
            self.registry.start(&target).await;
        }

        Ok(target)
    }

    /// Stop the schedule and delete the record. Removing an id twice is a
    /// `NotFound` from the store; the registry side is a no-op.
    pub async fn remove_target(&self, id: TargetId) -> MonitorResult<()> {
        self.registry.stop(id).await;

        if !self.store.destroy(id).await? {
            return Err(MonitorError::NotFound(id));
        }

        info!("Removed API ID {} from monitoring", id);
        Ok(())
    }

    /// Probe `target` now and persist the result without touching its schedule
    pub async fn manual_check(&self, target: &MonitoredTarget) -> MonitorResult<ProbeOutcome> {
        self.executor.execute_check(&ProbeTarget::from(target)).await.map_err(|(_, e)| {
            warn!("Failed to store manual check for {}: {}", target.name, e);
            MonitorError::from(e)
        })
    }

    /// Look up, probe and return the refreshed record
    pub async fn check_target(&self, id: TargetId) -> MonitorResult<MonitoredTarget> {
        let target = self.get_target(id).await?;
        self.manual_check(&target).await?;
        self.get_target(id).await
    }

    pub async fn get_target(&self, id: TargetId) -> MonitorResult<MonitoredTarget> {
        self.store.find_by_id(id).await?.ok_or(MonitorError::NotFound(id))
    }

    pub async fn list_targets(&self, filter: &TargetFilter) -> MonitorResult<Vec<MonitoredTarget>> {
        Ok(self.store.find_all(filter).await?)
    }

    pub async fn dashboard_stats(&self) -> MonitorResult<HealthSummary> {
        Ok(self.store.health_summary().await?)
    }

    pub async fn monitoring_status(&self) -> RegistryStatus {
        self.registry.status().await
    }

    pub async fn shutdown(&self) {
        self.registry.stop_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryTargetStore;
    use crate::monitoring::types::HealthStatus;
    use crate::testing::{calls_to, counting_prober};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::time::sleep;

    fn service() -> (MonitorService, Arc<MemoryTargetStore>, Arc<StdMutex<Vec<String>>>) {
        let store = Arc::new(MemoryTargetStore::new());
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let service = MonitorService::new(store.clone(), Arc::new(counting_prober(calls.clone())));
        (service, store, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_schedules_each_active_target_once() {
        let (service, store, calls) = service();
        let a = store.create(NewTarget::new("a", "https://a.test")).await.unwrap();
        let b =
            store.create(NewTarget::new("b", "https://b.test").with_interval(600)).await.unwrap();
        store.create(NewTarget::new("c", "https://c.test").inactive()).await.unwrap();

        service.initialize().await.unwrap();
        service.initialize().await.unwrap();
        sleep(Duration::from_secs(1)).await;

        let status = service.monitoring_status().await;
        assert!(status.is_initialized);
        assert_eq!(status.monitored_apis, vec![a.id, b.id]);
        assert_eq!(calls_to(&calls, "https://a.test"), 1);
        assert_eq!(calls_to(&calls, "https://c.test"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_target_probes_immediately() {
        let (service, store, _calls) = service();

        let created = service
            .add_target(NewTarget::new("X", "https://good.test").with_interval(60))
            .await
            .unwrap();
        assert_eq!(created.status, HealthStatus::Unknown);
        assert!(created.last_check.is_none());

        sleep(Duration::from_secs(1)).await;
        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, HealthStatus::Up);
        assert!(stored.last_check.is_some());
        assert!(stored.response_time_ms.is_some());
        assert!(service.monitoring_status().await.monitored_apis.contains(&created.id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_inactive_target_is_not_scheduled() {
        let (service, _store, calls) = service();
        let created =
            service.add_target(NewTarget::new("X", "https://good.test").inactive()).await.unwrap();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(service.monitoring_status().await.active_monitors, 0);
        assert_eq!(calls_to(&calls, &created.url), 0);
    }

    #[tokio::test]
    async fn test_add_rejects_duplicates_and_bad_input() {
        let (service, _store, _calls) = service();
        service.add_target(NewTarget::new("X", "https://a.test").inactive()).await.unwrap();

        let err = service.add_target(NewTarget::new("X", "https://b.test")).await.unwrap_err();
        assert!(matches!(err, MonitorError::Conflict(name) if name == "X"));

        let err = service
            .add_target(NewTarget::new("Y", "https://b.test").with_interval(5))
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::Validation(_)));
        assert_eq!(service.monitoring_status().await.active_monitors, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivating_removes_schedule() {
        let (service, _store, calls) = service();
        let created = service
            .add_target(NewTarget::new("X", "https://good.test").with_interval(60))
            .await
            .unwrap();
        sleep(Duration::from_secs(1)).await;

        let updated = service
            .update_target(created.id, TargetPatch { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(!updated.is_active);
        assert!(!service.monitoring_status().await.monitored_apis.contains(&created.id));

        sleep(Duration::from_secs(600)).await;
        assert_eq!(calls_to(&calls, "https://good.test"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_restarts_with_new_settings() {
        let (service, _store, calls) = service();
        let created = service
            .add_target(NewTarget::new("X", "https://old.test").with_interval(600))
            .await
            .unwrap();
        sleep(Duration::from_secs(1)).await;

        let patch = TargetPatch {
            url: Some("https://new.test".into()),
            check_interval: Some(30),
            ..Default::default()
        };
        service.update_target(created.id, patch).await.unwrap();

        sleep(Duration::from_secs(61)).await;
        assert_eq!(calls_to(&calls, "https://old.test"), 1);
        // immediate + ticks at 30s and 60s
        assert_eq!(calls_to(&calls, "https://new.test"), 3);
        assert_eq!(service.monitoring_status().await.active_monitors, 1);
    }

    #[tokio::test]
    async fn test_update_missing_target() {
        let (service, _store, _calls) = service();
        let err = service.update_target(99, TargetPatch::default()).await.unwrap_err();
        assert!(matches!(err, MonitorError::NotFound(99)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_target() {
        let (service, store, _calls) = service();
        let created = service.add_target(NewTarget::new("X", "https://good.test")).await.unwrap();

        service.remove_target(created.id).await.unwrap();
        assert!(store.find_by_id(created.id).await.unwrap().is_none());
        assert_eq!(service.monitoring_status().await.active_monitors, 0);

        let err = service.remove_target(created.id).await.unwrap_err();
        assert!(matches!(err, MonitorError::NotFound(_)));
        assert_eq!(service.monitoring_status().await.active_monitors, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_check_only_touches_health() {
        let (service, _store, calls) = service();
        let created = service
            .add_target(NewTarget::new("X", "https://good.test").with_interval(120).inactive())
            .await
            .unwrap();

        let checked = service.check_target(created.id).await.unwrap();
        assert_eq!(checked.status, HealthStatus::Up);
        assert!(checked.last_check.is_some());
        assert_eq!(checked.check_interval, 120);
        assert!(!checked.is_active);
        assert_eq!(calls_to(&calls, "https://good.test"), 1);
        assert_eq!(service.monitoring_status().await.active_monitors, 0);

        assert!(matches!(service.check_target(1234).await, Err(MonitorError::NotFound(1234))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_allows_reinitialize() {
        let (service, _store, _calls) = service();
        service.add_target(NewTarget::new("X", "https://good.test")).await.unwrap();
        service.initialize().await.unwrap();

        service.shutdown().await;
        let status = service.monitoring_status().await;
        assert!(!status.is_initialized);
        assert_eq!(status.active_monitors, 0);

        service.initialize().await.unwrap();
        assert_eq!(service.monitoring_status().await.active_monitors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dashboard_stats() {
        let (service, _store, _calls) = service();
        service.add_target(NewTarget::new("a", "https://a.test")).await.unwrap();
        service.add_target(NewTarget::new("b", "https://b.test").inactive()).await.unwrap();
        sleep(Duration::from_secs(1)).await;

        let stats = service.dashboard_stats().await.unwrap();
        assert_eq!(stats, HealthSummary { total: 2, up: 1, down: 0, warning: 0, unknown: 1 });
    }
}

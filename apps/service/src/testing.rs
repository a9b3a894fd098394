//! Test doubles shared across the crate's unit tests

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::database::models::{
    HealthSummary, HealthUpdate, MonitoredTarget, NewTarget, TargetFilter, TargetId, TargetPatch,
};
use crate::database::{MemoryTargetStore, StoreError, StoreResult, TargetStore};
use crate::monitoring::checker::MockProber;
use crate::monitoring::types::ProbeOutcome;

/// Memory store whose health writes always fail
#[derive(Default)]
pub struct FailingHealthStore {
    inner: MemoryTargetStore,
    pub health_writes: AtomicUsize,
}

#[async_trait]
impl TargetStore for FailingHealthStore {
    async fn create(&self, target: NewTarget) -> StoreResult<MonitoredTarget> {
        self.inner.create(target).await
    }

    async fn find_all(&self, filter: &TargetFilter) -> StoreResult<Vec<MonitoredTarget>> {
        self.inner.find_all(filter).await
    }

    async fn find_by_id(&self, id: TargetId) -> StoreResult<Option<MonitoredTarget>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_url(&self, url: &str) -> StoreResult<Option<MonitoredTarget>> {
        self.inner.find_by_url(url).await
    }

    async fn update(
        &self,
        id: TargetId,
        patch: &TargetPatch,
    ) -> StoreResult<Option<MonitoredTarget>> {
        self.inner.update(id, patch).await
    }

    async fn record_health(&self, _id: TargetId, _health: &HealthUpdate) -> StoreResult<bool> {
        self.health_writes.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Corrupt("disk full".into()))
    }

    async fn destroy(&self, id: TargetId) -> StoreResult<bool> {
        self.inner.destroy(id).await
    }

    async fn count(&self, filter: &TargetFilter) -> StoreResult<u64> {
        self.inner.count(filter).await
    }

    async fn health_summary(&self) -> StoreResult<HealthSummary> {
        self.inner.health_summary().await
    }
}

/// Prober that answers `up` for every URL and counts calls per URL
pub fn counting_prober(calls: Arc<std::sync::Mutex<Vec<String>>>) -> MockProber {
    let mut prober = MockProber::new();
    prober.expect_probe().returning(move |url| {
        calls.lock().unwrap().push(url.to_string());
        Box::pin(async { ProbeOutcome::up(7) })
    });
    prober
}

/// How many recorded calls hit `url`
pub fn calls_to(calls: &std::sync::Mutex<Vec<String>>, url: &str) -> usize {
    calls.lock().unwrap().iter().filter(|u| *u == url).count()
}

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::models::{
    HealthSummary, HealthUpdate, MonitoredTarget, NewTarget, TargetFilter, TargetId, TargetPatch,
    stored_now,
};
use super::repository::{StoreError, StoreResult, TargetStore};

/// In-process target store for ephemeral runs and tests
#[derive(Default)]
pub struct MemoryTargetStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    next_id: TargetId,
    targets: BTreeMap<TargetId, MonitoredTarget>,
}

impl MemoryState {
    fn name_taken(&self, name: &str, except: Option<TargetId>) -> bool {
        self.targets.values().any(|t| t.name == name && Some(t.id) != except)
    }
}

impl MemoryTargetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TargetStore for MemoryTargetStore {
    async fn create(&self, target: NewTarget) -> StoreResult<MonitoredTarget> {
        let mut state = self.state.write().await;
        if state.name_taken(&target.name, None) {
            return Err(StoreError::DuplicateName(target.name));
        }

        state.next_id += 1;
        let record = target.into_target(state.next_id, stored_now());
        state.targets.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_all(&self, filter: &TargetFilter) -> StoreResult<Vec<MonitoredTarget>> {
        let state = self.state.read().await;
        let mut targets: Vec<_> =
            state.targets.values().filter(|t| filter.matches(t)).cloned().collect();
        targets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(targets)
    }

    async fn find_by_id(&self, id: TargetId) -> StoreResult<Option<MonitoredTarget>> {
        Ok(self.state.read().await.targets.get(&id).cloned())
    }

    async fn find_by_url(&self, url: &str) -> StoreResult<Option<MonitoredTarget>> {
        Ok(self.state.read().await.targets.values().find(|t| t.url == url).cloned())
    }

    async fn update(
        &self,
        id: TargetId,
        patch: &TargetPatch,
    ) -> StoreResult<Option<MonitoredTarget>> {
        let mut state = self.state.write().await;
        if let Some(name) = &patch.name {
            if state.name_taken(name, Some(id)) {
                return Err(StoreError::DuplicateName(name.clone()));
            }
        }

        let Some(target) = state.targets.get_mut(&id) else {
            return Ok(None);
        };
        target.apply(patch);
        target.updated_at = stored_now();
        Ok(Some(target.clone()))
    }

    async fn record_health(&self, id: TargetId, health: &HealthUpdate) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.targets.get_mut(&id) {
            Some(target) => {
                target.record(health);
                target.updated_at = stored_now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn destroy(&self, id: TargetId) -> StoreResult<bool> {
        Ok(self.state.write().await.targets.remove(&id).is_some())
    }

    async fn count(&self, filter: &TargetFilter) -> StoreResult<u64> {
        let state = self.state.read().await;
        Ok(state.targets.values().filter(|t| filter.matches(t)).count() as u64)
    }

    async fn health_summary(&self) -> StoreResult<HealthSummary> {
        let state = self.state.read().await;
        let mut summary = HealthSummary::default();
        for target in state.targets.values() {
            summary.add(target.status, 1);
        }
        Ok(summary)
    }
}

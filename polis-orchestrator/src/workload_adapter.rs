use async_trait::async_trait;
use polis_core::ScalingTarget;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkloadError {
    #[error("workload target not found")]
    NotFound,
    #[error("conflicting write to workload target")]
    Conflict,
    #[error("transient workload adapter error: {0}")]
    Transient(String),
}

/// The boundary between the reconciler and whatever actually runs the
/// workload. `set_replicas` must be idempotent in effect; concurrent
/// writers may surface `Conflict`, which the Reconciler retries on the
/// next tick rather than within the current one.
#[async_trait]
pub trait WorkloadAdapter: Send + Sync {
    async fn get_replicas(&self, target: &ScalingTarget) -> Result<u32, WorkloadError>;
    async fn set_replicas(&self, target: &ScalingTarget, n: u32) -> Result<(), WorkloadError>;
}

/// Reference `WorkloadAdapter` backed by an in-memory registry, with fault
/// injection for exercising the Reconciler's error paths in tests — the
/// real workload API's wire transport is out of scope.
#[derive(Default)]
pub struct InMemoryWorkloadAdapter {
    replicas: Mutex<HashMap<ScalingTarget, u32>>,
    conflict_once: Mutex<std::collections::HashSet<ScalingTarget>>,
    not_found: Mutex<std::collections::HashSet<ScalingTarget>>,
}

impl InMemoryWorkloadAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, target: ScalingTarget, replicas: u32) {
        self.replicas.lock().await.insert(target, replicas);
    }

    /// The next `set_replicas` call against this target returns `Conflict`
    /// once, then succeeds normally.
    pub async fn inject_conflict_once(&self, target: ScalingTarget) {
        self.conflict_once.lock().await.insert(target);
    }

    /// Every call against this target returns `NotFound` until cleared.
    pub async fn set_not_found(&self, target: ScalingTarget, not_found: bool) {
        let mut set = self.not_found.lock().await;
        if not_found {
            set.insert(target);
        } else {
            set.remove(&target);
        }
    }

    pub async fn current(&self, target: &ScalingTarget) -> Option<u32> {
        self.replicas.lock().await.get(target).copied()
    }
}

#[async_trait]
impl WorkloadAdapter for InMemoryWorkloadAdapter {
    async fn get_replicas(&self, target: &ScalingTarget) -> Result<u32, WorkloadError> {
        if self.not_found.lock().await.contains(target) {
            return Err(WorkloadError::NotFound);
        }
        self.replicas
            .lock()
            .await
            .get(target)
            .copied()
            .ok_or(WorkloadError::NotFound)
    }

    async fn set_replicas(&self, target: &ScalingTarget, n: u32) -> Result<(), WorkloadError> {
        if self.not_found.lock().await.contains(target) {
            return Err(WorkloadError::NotFound);
        }
        if self.conflict_once.lock().await.remove(target) {
            return Err(WorkloadError::Conflict);
        }
        let mut replicas = self.replicas.lock().await;
        if !replicas.contains_key(target) {
            return Err(WorkloadError::NotFound);
        }
        replicas.insert(target.clone(), n);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ScalingTarget {
        ScalingTarget {
            namespace: "default".to_string(),
            name: "web".to_string(),
            kind: "Deployment".to_string(),
        }
    }

    #[tokio::test]
    async fn get_replicas_reports_not_found_when_unseeded() {
        let adapter = InMemoryWorkloadAdapter::new();
        assert_eq!(adapter.get_replicas(&target()).await, Err(WorkloadError::NotFound));
    }

    #[tokio::test]
    async fn seeded_target_round_trips() {
        let adapter = InMemoryWorkloadAdapter::new();
        adapter.seed(target(), 3).await;
        assert_eq!(adapter.get_replicas(&target()).await, Ok(3));
        adapter.set_replicas(&target(), 7).await.unwrap();
        assert_eq!(adapter.get_replicas(&target()).await, Ok(7));
    }

    #[tokio::test]
    async fn injected_conflict_fires_once() {
        let adapter = InMemoryWorkloadAdapter::new();
        adapter.seed(target(), 3).await;
        adapter.inject_conflict_once(target()).await;
        assert_eq!(adapter.set_replicas(&target(), 5).await, Err(WorkloadError::Conflict));
        assert!(adapter.set_replicas(&target(), 5).await.is_ok());
        assert_eq!(adapter.get_replicas(&target()).await, Ok(5));
    }

    #[tokio::test]
    async fn not_found_can_be_toggled() {
        let adapter = InMemoryWorkloadAdapter::new();
        adapter.seed(target(), 3).await;
        adapter.set_not_found(target(), true).await;
        assert_eq!(adapter.get_replicas(&target()).await, Err(WorkloadError::NotFound));
        adapter.set_not_found(target(), false).await;
        assert_eq!(adapter.get_replicas(&target()).await, Ok(3));
    }
}

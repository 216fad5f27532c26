use crate::binding::RuntimeBinding;
use crate::intent_store::IntentStore;
use crate::reconciler::{run_intent_task, IntentContext, ReconcilerCommand};
use crate::safe_scaler::SafeScaler;
use crate::workload_adapter::WorkloadAdapter;
use polis_core::IntentKey;
use polis_metrics::MetricSourceRegistry;
use polis_policy::PolicyRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

struct IntentHandle {
    join: JoinHandle<()>,
    mailbox: mpsc::UnboundedSender<ReconcilerCommand>,
    // Shared with the task's `IntentContext`, so its metric source can be
    // closed here even if the task itself has to be force-aborted and
    // never reaches its own teardown path.
    binding: Arc<Mutex<Option<RuntimeBinding>>>,
}

/// Owns the per-intent task registry and keeps it synchronized with the
/// `IntentStore`: one task per live intent, spawned on first observation
/// and aborted on deletion or controller shutdown.
pub struct ReconcilerManager {
    store: Arc<dyn IntentStore>,
    workload: Arc<dyn WorkloadAdapter>,
    metric_registry: Arc<MetricSourceRegistry>,
    policy_registry: Arc<PolicyRegistry>,
    safe_scaler: Arc<SafeScaler>,
    handles: Mutex<HashMap<IntentKey, IntentHandle>>,
}

impl ReconcilerManager {
    pub fn new(
        store: Arc<dyn IntentStore>,
        workload: Arc<dyn WorkloadAdapter>,
        metric_registry: Arc<MetricSourceRegistry>,
        policy_registry: Arc<PolicyRegistry>,
    ) -> Self {
        Self {
            store,
            workload,
            metric_registry,
            policy_registry,
            safe_scaler: Arc::new(SafeScaler::new()),
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Brings the task registry in line with the store's current intent
    /// set: spawns tasks for newly observed intents, forwards
    /// `SpecChanged` to intents whose spec differs, and tears down tasks
    /// for intents no longer listed.
    pub async fn sync(&self) {
        let intents = self.store.list().await;
        let mut handles = self.handles.lock().await;

        let mut seen = std::collections::HashSet::new();
        for intent in intents {
            seen.insert(intent.key.clone());
            match handles.get(&intent.key) {
                Some(handle) => {
                    // Spec-changed notifications are cheap to send
                    // unconditionally; the per-intent task treats every
                    // SpecChanged the same whether or not fields differ.
                    let _ = handle.mailbox.send(ReconcilerCommand::SpecChanged(intent.spec));
                }
                None => {
                    self.spawn_intent(intent.key.clone(), intent.spec, &mut handles);
                }
            }
        }

        let stale: Vec<IntentKey> = handles.keys().filter(|k| !seen.contains(*k)).cloned().collect();
        for key in stale {
            if let Some(handle) = handles.remove(&key) {
                let _ = handle.mailbox.send(ReconcilerCommand::Shutdown);
                info!(intent = %key, "intent removed, task tearing down");
            }
        }
    }

    fn spawn_intent(
        &self,
        key: IntentKey,
        spec: polis_core::IntentSpec,
        handles: &mut HashMap<IntentKey, IntentHandle>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = IntentContext::new(
            key.clone(),
            spec,
            self.store.clone(),
            self.workload.clone(),
            self.metric_registry.clone(),
            self.policy_registry.clone(),
            self.safe_scaler.clone(),
        );
        let binding = ctx.binding_handle();

        let join = tokio::spawn(run_intent_task(ctx, rx));
        info!(intent = %key, "intent task spawned");
        handles.insert(key, IntentHandle { join, mailbox: tx, binding });
    }

    /// Sends `Shutdown` to every mailbox, then waits up to the grace
    /// period for each task to run its own teardown (which closes its
    /// binding's metric source) and exit. A task still running past the
    /// grace period is aborted; since every external call inside a tick
    /// already carries its own 10s deadline, the grace period is sized to
    /// let an in-flight tick finish and teardown run before that happens.
    /// Abort drops the task's future at its next await point, skipping
    /// whatever is left of its own teardown, so the binding's metric
    /// source is closed here instead, directly off the shared handle.
    pub async fn shutdown(&self) {
        let mut handles = self.handles.lock().await;
        for handle in handles.values() {
            let _ = handle.mailbox.send(ReconcilerCommand::Shutdown);
        }

        for (key, handle) in handles.drain() {
            let abort_handle = handle.join.abort_handle();
            if tokio::time::timeout(SHUTDOWN_GRACE, handle.join).await.is_err() {
                abort_handle.abort();
                warn!(intent = %key, "task did not exit within shutdown grace period, aborted");
                if let Some(binding) = handle.binding.lock().await.take() {
                    binding.metric_source.close().await;
                    info!(intent = %key, "closed binding's metric source after forced abort");
                }
            }
        }
    }

    pub async fn active_intent_count(&self) -> usize {
        self.handles.lock().await.len()
    }
}

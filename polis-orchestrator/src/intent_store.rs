use async_trait::async_trait;
use polis_core::{Intent, IntentKey, IntentStatus};
use std::collections::HashMap;
use tokio::sync::{watch, Mutex};

/// Declarative-object-schema boundary: stands in for the orchestrator's
/// real intent CRD store. The Reconciler only ever needs list/get/patch
/// plus change notification; the real registration and admission path is
/// out of scope.
#[async_trait]
pub trait IntentStore: Send + Sync {
    async fn list(&self) -> Vec<Intent>;
    async fn get(&self, key: &IntentKey) -> Option<Intent>;
    async fn patch_status(&self, key: &IntentKey, status: IntentStatus);

    /// Fires whenever the set of intents or any intent's spec changes.
    /// The receiver only needs to re-`list()`; the payload itself is not
    /// meaningful, it's a wakeup.
    fn watch(&self) -> watch::Receiver<()>;
}

pub struct InMemoryIntentStore {
    intents: Mutex<HashMap<IntentKey, Intent>>,
    notify_tx: watch::Sender<()>,
}

impl InMemoryIntentStore {
    pub fn new() -> Self {
        let (notify_tx, _rx) = watch::channel(());
        Self {
            intents: Mutex::new(HashMap::new()),
            notify_tx,
        }
    }

    pub async fn put(&self, intent: Intent) {
        self.intents.lock().await.insert(intent.key.clone(), intent);
        let _ = self.notify_tx.send(());
    }

    pub async fn remove(&self, key: &IntentKey) {
        self.intents.lock().await.remove(key);
        let _ = self.notify_tx.send(());
    }
}

impl Default for InMemoryIntentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntentStore for InMemoryIntentStore {
    async fn list(&self) -> Vec<Intent> {
        self.intents.lock().await.values().cloned().collect()
    }

    async fn get(&self, key: &IntentKey) -> Option<Intent> {
        self.intents.lock().await.get(key).cloned()
    }

    async fn patch_status(&self, key: &IntentKey, status: IntentStatus) {
        if let Some(intent) = self.intents.lock().await.get_mut(key) {
            intent.status = status;
        }
    }

    fn watch(&self) -> watch::Receiver<()> {
        self.notify_tx.subscribe()
    }
}

pub mod binding;
pub mod intent_store;
pub mod manager;
pub mod reconciler;
pub mod safe_scaler;
pub mod workload_adapter;

pub use binding::RuntimeBinding;
pub use intent_store::{InMemoryIntentStore, IntentStore};
pub use manager::ReconcilerManager;
pub use reconciler::{IntentContext, ReconcilerCommand};
pub use safe_scaler::{Decision, Direction, SafeScaler};
pub use workload_adapter::{InMemoryWorkloadAdapter, WorkloadAdapter, WorkloadError};

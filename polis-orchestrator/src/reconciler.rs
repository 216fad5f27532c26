use crate::binding::RuntimeBinding;
use crate::intent_store::IntentStore;
use crate::safe_scaler::SafeScaler;
use crate::workload_adapter::{WorkloadAdapter, WorkloadError};
use chrono::Utc;
use polis_core::{
    log_binding_established, log_binding_torn_down, log_condition, log_scaling_blocked,
    log_scaling_decision, log_tick_started,
};
use polis_core::{Condition, ConditionType, IntentKey, IntentSpec};
use polis_metrics::MetricSourceRegistry;
use polis_policy::{PolicyInput, PolicyRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;

const EXTERNAL_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Command delivered through an intent's mailbox. Tick and spec-change
/// handling share this single-consumer channel, which is what makes them
/// mutually exclusive without an explicit lock.
pub enum ReconcilerCommand {
    Tick,
    SpecChanged(IntentSpec),
    Shutdown,
}

/// Per-intent reconciliation state: exactly one task owns this and is the
/// sole writer of its binding and cooldown entry.
pub struct IntentContext {
    pub key: IntentKey,
    pub spec: IntentSpec,
    binding: Arc<Mutex<Option<RuntimeBinding>>>,
    store: Arc<dyn IntentStore>,
    workload: Arc<dyn WorkloadAdapter>,
    metric_registry: Arc<MetricSourceRegistry>,
    policy_registry: Arc<PolicyRegistry>,
    safe_scaler: Arc<SafeScaler>,
}

impl IntentContext {
    pub fn new(
        key: IntentKey,
        spec: IntentSpec,
        store: Arc<dyn IntentStore>,
        workload: Arc<dyn WorkloadAdapter>,
        metric_registry: Arc<MetricSourceRegistry>,
        policy_registry: Arc<PolicyRegistry>,
        safe_scaler: Arc<SafeScaler>,
    ) -> Self {
        Self {
            key,
            spec,
            binding: Arc::new(Mutex::new(None)),
            store,
            workload,
            metric_registry,
            policy_registry,
            safe_scaler,
        }
    }

    /// A shared handle onto this context's binding slot. The
    /// `ReconcilerManager` holds one per spawned task so it can force-close
    /// the binding's metric source if the task has to be aborted past its
    /// shutdown grace period, rather than relying on the task's own
    /// teardown path (which an abort cuts off mid-flight).
    pub fn binding_handle(&self) -> Arc<Mutex<Option<RuntimeBinding>>> {
        self.binding.clone()
    }

    /// *On intent observed (new)* and *on spec change*: validate shape,
    /// build the metric source and policy, validate the metric source,
    /// and install the binding. Any failure is recorded as `InvalidConfig`
    /// and leaves no binding installed.
    pub async fn establish_binding(&mut self) {
        if let Err(reason) = self.spec.validate_shape() {
            self.set_condition(ConditionType::InvalidConfig, false, "InvalidSpec", &reason)
                .await;
            return;
        }

        let metric_source = match self.metric_registry.build(&self.spec.metric) {
            Ok(source) => source,
            Err(err) => {
                self.set_condition(ConditionType::InvalidConfig, false, "MetricConstructionFailed", &err.to_string())
                    .await;
                return;
            }
        };

        if let Err(err) = metric_source.validate().await {
            self.set_condition(ConditionType::InvalidConfig, false, "MetricValidationFailed", &err.to_string())
                .await;
            return;
        }

        let policy = match self.policy_registry.build(&self.spec.policy) {
            Ok(policy) => policy,
            Err(err) => {
                self.set_condition(ConditionType::InvalidConfig, false, "PolicyConstructionFailed", &err.to_string())
                    .await;
                return;
            }
        };

        log_binding_established(&self.key.to_string(), self.spec.metric.type_tag(), self.spec.policy.type_tag());
        *self.binding.lock().await = Some(RuntimeBinding::new(metric_source, policy));
        self.set_condition(ConditionType::Ready, true, "BindingEstablished", "runtime binding established")
            .await;
    }

    /// Installs a binding directly, bypassing the registries. Lets tests
    /// drive a tick with a `StaticMetricSource` or other test double that
    /// has no tagged `MetricSpec`/`PolicySpec` to construct from.
    pub async fn install_binding(&self, binding: RuntimeBinding) {
        *self.binding.lock().await = Some(binding);
    }

    /// *On spec change*: unconditionally tear down and rebuild, so the
    /// live binding always reflects the live spec.
    pub async fn rebuild_binding(&mut self, new_spec: IntentSpec) {
        self.teardown_binding().await;
        self.spec = new_spec;
        self.establish_binding().await;
    }

    /// *On intent deletion*: close the metric source and drop all
    /// per-intent state, including the cooldown clock.
    pub async fn teardown(&mut self) {
        self.teardown_binding().await;
        self.safe_scaler.remove(&self.key).await;
    }

    async fn teardown_binding(&self) {
        if let Some(binding) = self.binding.lock().await.take() {
            binding.metric_source.close().await;
            log_binding_torn_down(&self.key.to_string());
        }
    }

    pub async fn tick(&mut self) {
        log_tick_started(&self.key.to_string());

        let Some(binding) = self.binding.lock().await.clone() else {
            // Pending/InvalidConfig: nothing to reconcile until the spec
            // is fixed and a new binding is established.
            return;
        };

        // Step 1: read current replicas.
        let current = match timeout(self.workload.get_replicas(&self.spec.target)).await {
            Ok(Ok(replicas)) => replicas,
            Ok(Err(WorkloadError::Transient(_))) | Err(_) => return,
            Ok(Err(WorkloadError::NotFound)) => {
                self.set_condition(ConditionType::TargetMissing, false, "TargetNotFound", "workload target not found")
                    .await;
                return;
            }
            Ok(Err(WorkloadError::Conflict)) => return,
        };

        // Step 2: sample the metric.
        let metric_value = match timeout(binding.metric_source.sample()).await {
            Ok(Ok(value)) => value,
            Ok(Err(_)) | Err(_) => {
                self.set_condition(ConditionType::MetricUnavailable, false, "MetricUnavailable", "metric sample unavailable")
                    .await;
                return;
            }
        };

        // Step 3: compute the policy's desired count. No bundled metric
        // source implements the SLO side channel, so `observed` degrades
        // every policy to proportional unless a caller supplies its own
        // `ObservedReadingSource`-implementing source.
        let observed = None;
        let policy_decision = binding.policy.decide(PolicyInput {
            current_replicas: current,
            current_metric: metric_value,
            target_metric: self.spec.metric.target_value(),
            min: self.spec.min_replicas,
            max: self.spec.max_replicas,
            observed,
        });

        // Step 4: consult the Safe Scaler.
        let now = Utc::now();
        let decision = self
            .safe_scaler
            .decide(
                &self.key,
                current,
                policy_decision.desired,
                self.spec.min_replicas,
                self.spec.max_replicas,
                &self.spec.behavior,
                now,
            )
            .await;

        // Step 5: apply the decision, if any.
        let mut scaling_condition = None;
        if decision.act {
            match timeout(self.workload.set_replicas(&self.spec.target, decision.target)).await {
                Ok(Ok(())) => {
                    self.safe_scaler.record_scale(&self.key, now).await;
                    log_scaling_decision(&self.key.to_string(), current, decision.target, &decision.reason);
                    scaling_condition = Some((ConditionType::ScalingSucceeded, true, "ScalingApplied"));
                }
                Ok(Err(WorkloadError::NotFound)) => {
                    scaling_condition = Some((ConditionType::TargetMissing, false, "TargetNotFound"));
                }
                Ok(Err(_)) | Err(_) => {
                    scaling_condition = Some((ConditionType::ScalingFailed, false, "ScalingWriteFailed"));
                }
            }
        } else {
            log_scaling_blocked(&self.key.to_string(), current, &decision.reason);
        }

        // Step 6: patch status.
        let mut status = self.store.get(&self.key).await.map(|i| i.status).unwrap_or_default();
        status.current_replicas = Some(current);
        status.desired_replicas = Some(decision.target);
        status.current_metric_value = Some(metric_value);
        status.last_scale_time = self.safe_scaler.last_scale_time(&self.key).await;
        if let Some((condition_type, ok, reason)) = scaling_condition {
            status.set_condition(Condition::new(condition_type, ok, reason, decision.reason.clone(), now));
            log_condition(&self.key.to_string(), reason, &decision.reason);
        } else {
            status.set_condition(Condition::new(
                ConditionType::Ready,
                true,
                "Reconciled",
                decision.reason.clone(),
                now,
            ));
        }

        // Advisory: the cost-bounded policy's budget capped the count below
        // what the baseline (or `min`) would otherwise call for. Kept in
        // sync every tick, including dropping back to false once the
        // budget stops binding.
        if policy_decision.cost_budget_exceeded {
            let message = format!(
                "desired replica count capped by monthly cost budget (policy wanted more than {} is affordable)",
                decision.target
            );
            log_condition(&self.key.to_string(), "CostBudgetExceeded", &message);
            status.set_condition(Condition::new(
                ConditionType::CostBudgetExceeded,
                true,
                "CostBudgetExceeded",
                message,
                now,
            ));
        } else {
            status.set_condition(Condition::new(
                ConditionType::CostBudgetExceeded,
                false,
                "WithinBudget",
                "desired replica count is within the monthly cost budget",
                now,
            ));
        }

        self.store.patch_status(&self.key, status).await;
    }

    async fn set_condition(&self, condition_type: ConditionType, ok: bool, reason: &str, message: &str) {
        let mut status = self.store.get(&self.key).await.map(|i| i.status).unwrap_or_default();
        status.set_condition(Condition::new(condition_type, ok, reason, message, Utc::now()));
        log_condition(&self.key.to_string(), reason, message);
        self.store.patch_status(&self.key, status).await;
    }
}

async fn timeout<F, T, E>(future: F) -> Result<Result<T, E>, tokio::time::error::Elapsed>
where
    F: std::future::Future<Output = Result<T, E>>,
{
    tokio::time::timeout(EXTERNAL_CALL_TIMEOUT, future).await
}

/// Drives one intent's task: establishes the binding, then alternates
/// between its own sync-interval ticker and commands from its mailbox
/// until told to shut down.
pub async fn run_intent_task(mut ctx: IntentContext, mut commands: mpsc::UnboundedReceiver<ReconcilerCommand>) {
    ctx.establish_binding().await;

    let mut interval = tokio::time::interval(Duration::from_secs(ctx.spec.sync_interval_seconds.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // first tick fires immediately; consume it up front

    loop {
        tokio::select! {
            _ = interval.tick() => {
                ctx.tick().await;
            }
            cmd = commands.recv() => {
                match cmd {
                    Some(ReconcilerCommand::Tick) => ctx.tick().await,
                    Some(ReconcilerCommand::SpecChanged(new_spec)) => {
                        let new_interval = Duration::from_secs(new_spec.sync_interval_seconds.max(1));
                        ctx.rebuild_binding(new_spec).await;
                        interval = tokio::time::interval(new_interval);
                        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        interval.tick().await;
                    }
                    Some(ReconcilerCommand::Shutdown) | None => break,
                }
            }
        }
    }

    ctx.teardown().await;
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one intent by its namespace and name. Used as the map key
/// everywhere controller state is partitioned per-intent: runtime
/// bindings, cooldown clocks, and the per-intent task registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntentKey {
    pub namespace: String,
    pub name: String,
}

impl IntentKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for IntentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Observed latency/error-rate side channel a metric source may expose
/// alongside its scalar sample, consumed by the SLO-aware scaling policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedReading {
    pub latency_ms: f64,
    pub error_rate: f64,
}

/// Reference to the workload an intent scales.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalingTarget {
    pub namespace: String,
    pub name: String,
    pub kind: String,
}

/// Tagged metric source configuration, one variant per backend family.
/// `target_value` is shared across variants: the dimensional meaning is
/// metric-specific (requests/sec/pod, items/pod, transactions/pod) but the
/// policy layer only ever sees it as a positive real.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MetricSpec {
    QueueDepth {
        target_value: f64,
        host: String,
        port: u16,
        queue: String,
        #[serde(default)]
        use_tls: bool,
    },
    TimeSeries {
        target_value: f64,
        endpoint: String,
        query: String,
        #[serde(default)]
        headers: std::collections::HashMap<String, String>,
    },
    SubscriptionBacklog {
        target_value: f64,
        project_id: String,
        subscription_id: String,
        credentials_ref: String,
    },
}

impl MetricSpec {
    pub fn target_value(&self) -> f64 {
        match self {
            MetricSpec::QueueDepth { target_value, .. } => *target_value,
            MetricSpec::TimeSeries { target_value, .. } => *target_value,
            MetricSpec::SubscriptionBacklog { target_value, .. } => *target_value,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            MetricSpec::QueueDepth { .. } => "queueDepth",
            MetricSpec::TimeSeries { .. } => "timeSeries",
            MetricSpec::SubscriptionBacklog { .. } => "subscriptionBacklog",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum PreferredDirection {
    Up,
    Down,
    Balanced,
}

/// Tagged scaling policy configuration, one variant per policy family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PolicySpec {
    Proportional,
    SloAware {
        target_latency_ms: f64,
        target_error_rate: f64,
    },
    CostBounded {
        max_monthly_cost: f64,
        cost_per_pod_per_hour: f64,
        preferred_direction: PreferredDirection,
    },
}

impl PolicySpec {
    pub fn type_tag(&self) -> &'static str {
        match self {
            PolicySpec::Proportional => "proportional",
            PolicySpec::SloAware { .. } => "sloAware",
            PolicySpec::CostBounded { .. } => "costBounded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionBehavior {
    #[serde(default = "default_max_delta")]
    pub max_delta: u32,
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
}

impl Default for DirectionBehavior {
    fn default() -> Self {
        Self {
            max_delta: default_max_delta(),
            cooldown_seconds: default_cooldown_seconds(),
        }
    }
}

fn default_max_delta() -> u32 {
    4
}

fn default_cooldown_seconds() -> u64 {
    300
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorSpec {
    #[serde(default)]
    pub scale_up: DirectionBehavior,
    #[serde(default)]
    pub scale_down: DirectionBehavior,
}

fn default_sync_interval_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentSpec {
    pub target: ScalingTarget,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub metric: MetricSpec,
    pub policy: PolicySpec,
    #[serde(default)]
    pub behavior: BehaviorSpec,
    #[serde(default = "default_sync_interval_seconds")]
    pub sync_interval_seconds: u64,
}

impl IntentSpec {
    /// Shape validation only (spec.md's "validate spec shape" step). Does
    /// not touch the metric source or policy; that validation happens at
    /// binding time via their own `validate()`.
    pub fn validate_shape(&self) -> Result<(), String> {
        if self.min_replicas < 1 {
            return Err("minReplicas must be at least 1".to_string());
        }
        if self.min_replicas > self.max_replicas {
            return Err("minReplicas must be <= maxReplicas".to_string());
        }
        if self.metric.target_value() <= 0.0 {
            return Err("metric targetValue must be positive".to_string());
        }
        if self.sync_interval_seconds == 0 {
            return Err("syncIntervalSeconds must be positive".to_string());
        }
        Ok(())
    }
}

/// Closed condition vocabulary (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionType {
    Ready,
    InvalidConfig,
    TargetMissing,
    MetricUnavailable,
    ScalingSucceeded,
    ScalingFailed,
    CostBudgetExceeded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub status: bool,
    pub reason: String,
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    pub fn new(
        condition_type: ConditionType,
        status: bool,
        reason: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            condition_type,
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentStatus {
    pub current_replicas: Option<u32>,
    pub desired_replicas: Option<u32>,
    pub current_metric_value: Option<f64>,
    pub last_scale_time: Option<DateTime<Utc>>,
    pub conditions: Vec<Condition>,
}

impl IntentStatus {
    /// Replaces the condition of the same type, or appends it, matching
    /// Kubernetes-style condition-list semantics: one live entry per type.
    pub fn set_condition(&mut self, condition: Condition) {
        if let Some(existing) = self
            .conditions
            .iter_mut()
            .find(|c| c.condition_type == condition.condition_type)
        {
            *existing = condition;
        } else {
            self.conditions.push(condition);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub key: IntentKey,
    pub spec: IntentSpec,
    pub status: IntentStatus,
}

impl Intent {
    pub fn new(key: IntentKey, spec: IntentSpec) -> Self {
        Self {
            key,
            spec,
            status: IntentStatus::default(),
        }
    }
}

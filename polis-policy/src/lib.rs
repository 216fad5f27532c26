pub mod cost_bounded;
pub mod proportional;
pub mod registry;
pub mod slo_aware;

pub use cost_bounded::CostBoundedPolicy;
pub use polis_core::{ObservedReading, PreferredDirection};
pub use proportional::ProportionalPolicy;
pub use registry::{register_defaults, PolicyCtor, PolicyRegistry};
pub use slo_aware::SloAwarePolicy;

/// Everything a `ScalingPolicy` needs to compute a desired replica count.
/// Carries no I/O; every field is a plain value so `decide` can stay pure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyInput {
    pub current_replicas: u32,
    pub current_metric: f64,
    pub target_metric: f64,
    pub min: u32,
    pub max: u32,
    pub observed: Option<ObservedReading>,
}

/// Result of a policy's `decide`: the desired replica count plus any
/// advisory signal the Reconciler should surface as a condition.
/// `cost_budget_exceeded` is only ever set by `CostBoundedPolicy`, when its
/// monthly budget caps the count below what the baseline or `min` would
/// otherwise call for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyDecision {
    pub desired: u32,
    pub cost_budget_exceeded: bool,
}

impl PolicyDecision {
    fn within_budget(desired: u32) -> Self {
        Self {
            desired,
            cost_budget_exceeded: false,
        }
    }
}

/// A pure function from current state and a metric reading to a desired
/// replica count. No I/O, no hidden state, deterministic, total over any
/// input with `target_metric > 0` and `min <= max`.
pub trait ScalingPolicy: Send + Sync {
    fn decide(&self, input: PolicyInput) -> PolicyDecision;
}

/// Shared baseline used by every variant: `ceil(ratio * max(current, 1))`,
/// or `min` when the metric reads zero.
fn baseline_ceil(input: &PolicyInput) -> u32 {
    if input.current_metric == 0.0 {
        return input.min;
    }
    let ratio = input.current_metric / input.target_metric;
    let multiplier = input.current_replicas.max(1) as f64;
    (ratio * multiplier).ceil() as u32
}

fn baseline_floor(input: &PolicyInput) -> u32 {
    if input.current_metric == 0.0 {
        return input.min;
    }
    let ratio = input.current_metric / input.target_metric;
    let multiplier = input.current_replicas.max(1) as f64;
    (ratio * multiplier).floor() as u32
}

fn clamp(value: u32, min: u32, max: u32) -> u32 {
    value.clamp(min, max)
}

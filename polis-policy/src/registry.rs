use crate::{CostBoundedPolicy, ProportionalPolicy, ScalingPolicy, SloAwarePolicy};
use polis_core::{PolicySpec, PolisError};
use std::collections::HashMap;
use std::sync::Arc;

/// Constructs a `ScalingPolicy` from its tagged spec. Registered under the
/// spec's type tag (`PolicySpec::type_tag`), mirroring the metric source
/// registry's plug-in shape.
pub type PolicyCtor = Arc<dyn Fn(&PolicySpec) -> Result<Arc<dyn ScalingPolicy>, PolisError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct PolicyRegistry {
    ctors: HashMap<String, PolicyCtor>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self {
            ctors: HashMap::new(),
        }
    }

    pub fn register(&mut self, tag: impl Into<String>, ctor: PolicyCtor) {
        self.ctors.insert(tag.into(), ctor);
    }

    pub fn build(&self, spec: &PolicySpec) -> Result<Arc<dyn ScalingPolicy>, PolisError> {
        let tag = spec.type_tag();
        let ctor = self
            .ctors
            .get(tag)
            .ok_or_else(|| PolisError::Config(format!("unknown scaling policy type: {}", tag)))?;
        ctor(spec)
    }
}

/// Populates a registry with the three bundled policy variants.
pub fn register_defaults(registry: &mut PolicyRegistry) {
    registry.register(
        "proportional",
        Arc::new(|spec: &PolicySpec| match spec {
            PolicySpec::Proportional => Ok(Arc::new(ProportionalPolicy) as Arc<dyn ScalingPolicy>),
            _ => Err(PolisError::Config(
                "proportional constructor invoked with mismatched spec".to_string(),
            )),
        }),
    );

    registry.register(
        "sloAware",
        Arc::new(|spec: &PolicySpec| match spec {
            PolicySpec::SloAware {
                target_latency_ms,
                target_error_rate,
            } => Ok(Arc::new(SloAwarePolicy {
                target_latency_ms: *target_latency_ms,
                target_error_rate: *target_error_rate,
            }) as Arc<dyn ScalingPolicy>),
            _ => Err(PolisError::Config(
                "sloAware constructor invoked with mismatched spec".to_string(),
            )),
        }),
    );

    registry.register(
        "costBounded",
        Arc::new(|spec: &PolicySpec| match spec {
            PolicySpec::CostBounded {
                max_monthly_cost,
                cost_per_pod_per_hour,
                preferred_direction,
            } => Ok(Arc::new(CostBoundedPolicy {
                max_monthly_cost: *max_monthly_cost,
                cost_per_pod_per_hour: *cost_per_pod_per_hour,
                preferred_direction: *preferred_direction,
            }) as Arc<dyn ScalingPolicy>),
            _ => Err(PolisError::Config(
                "costBounded constructor invoked with mismatched spec".to_string(),
            )),
        }),
    );
}

use polis_metrics::MetricSource;
use polis_policy::ScalingPolicy;
use std::sync::Arc;

/// The live pairing of a constructed metric source and scaling policy for
/// one intent. Rebuilt wholesale on spec change; torn down (its metric
/// source `close()`d) on deletion or rebuild.
#[derive(Clone)]
pub struct RuntimeBinding {
    pub metric_source: Arc<dyn MetricSource>,
    pub policy: Arc<dyn ScalingPolicy>,
}

impl RuntimeBinding {
    pub fn new(metric_source: Arc<dyn MetricSource>, policy: Arc<dyn ScalingPolicy>) -> Self {
        Self { metric_source, policy }
    }
}

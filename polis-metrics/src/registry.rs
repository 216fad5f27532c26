use crate::{MetricSource, QueueDepthSource, SubscriptionBacklogSource, TimeSeriesSource};
use polis_core::{MetricSpec, PolisError};
use std::collections::HashMap;
use std::sync::Arc;

/// Constructs a `MetricSource` from its tagged spec. Registered under the
/// spec's type tag (`MetricSpec::type_tag`), mirroring spec.md §9's
/// "registry mapping the tagged type string to a constructor."
pub type MetricSourceCtor =
    Arc<dyn Fn(&MetricSpec) -> Result<Arc<dyn MetricSource>, PolisError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct MetricSourceRegistry {
    ctors: HashMap<String, MetricSourceCtor>,
}

impl MetricSourceRegistry {
    pub fn new() -> Self {
        Self {
            ctors: HashMap::new(),
        }
    }

    pub fn register(&mut self, tag: impl Into<String>, ctor: MetricSourceCtor) {
        self.ctors.insert(tag.into(), ctor);
    }

    pub fn build(&self, spec: &MetricSpec) -> Result<Arc<dyn MetricSource>, PolisError> {
        let tag = spec.type_tag();
        let ctor = self.ctors.get(tag).ok_or_else(|| {
            PolisError::Config(format!("unknown metric source type: {}", tag))
        })?;
        ctor(spec)
    }
}

/// Populates a registry with the three bundled metric source variants.
pub fn register_defaults(registry: &mut MetricSourceRegistry) {
    registry.register(
        "queueDepth",
        Arc::new(|spec: &MetricSpec| match spec {
            MetricSpec::QueueDepth {
                host,
                port,
                queue,
                use_tls,
                ..
            } => Ok(Arc::new(QueueDepthSource::new(
                host.clone(),
                *port,
                queue.clone(),
                *use_tls,
            )) as Arc<dyn MetricSource>),
            _ => Err(PolisError::Config(
                "queueDepth constructor invoked with mismatched spec".to_string(),
            )),
        }),
    );

    registry.register(
        "timeSeries",
        Arc::new(|spec: &MetricSpec| match spec {
            MetricSpec::TimeSeries {
                endpoint,
                query,
                headers,
                ..
            } => Ok(Arc::new(TimeSeriesSource::new(
                endpoint.clone(),
                query.clone(),
                headers.clone(),
            )?) as Arc<dyn MetricSource>),
            _ => Err(PolisError::Config(
                "timeSeries constructor invoked with mismatched spec".to_string(),
            )),
        }),
    );

    registry.register(
        "subscriptionBacklog",
        Arc::new(|spec: &MetricSpec| match spec {
            MetricSpec::SubscriptionBacklog {
                project_id,
                subscription_id,
                credentials_ref,
                ..
            } => Ok(Arc::new(SubscriptionBacklogSource::new(
                project_id.clone(),
                subscription_id.clone(),
                credentials_ref.clone(),
            )) as Arc<dyn MetricSource>),
            _ => Err(PolisError::Config(
                "subscriptionBacklog constructor invoked with mismatched spec".to_string(),
            )),
        }),
    );
}

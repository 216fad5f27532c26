pub mod queue_depth;
pub mod registry;
pub mod subscription_backlog;
pub mod testing;
pub mod time_series;

use async_trait::async_trait;
use thiserror::Error;

pub use queue_depth::QueueDepthSource;
pub use registry::{register_defaults, MetricSourceCtor, MetricSourceRegistry};
pub use subscription_backlog::{CredentialResolver, EnvCredentialResolver, SubscriptionBacklogSource};
pub use testing::StaticMetricSource;
pub use time_series::TimeSeriesSource;

pub use polis_core::ObservedReading;

/// Failure reported by a metric source. `Unavailable` is a transient
/// *skip* signal to the reconciler, never a terminal error; `Config`
/// fails the binding and is surfaced as `InvalidConfig`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricError {
    #[error("metric unavailable")]
    Unavailable,
    #[error("metric source config error: {0}")]
    Config(String),
}

/// A polymorphic capability that, on demand, returns a single
/// non-negative floating-point sample representing current load.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Returns a finite, non-negative sample, or `Unavailable` for any
    /// transient backend fault. Implementations must not block
    /// indefinitely; the reconciler applies its own deadline around this
    /// call, but a well-behaved source should not rely on that alone.
    async fn sample(&self) -> Result<f64, MetricError>;

    /// Called once at binding time. Failure prevents the binding from
    /// being established.
    async fn validate(&self) -> Result<(), MetricError>;

    /// Releases backend resources. Must be safe to call after any error
    /// and exactly once per binding lifecycle, and idempotent beyond that.
    async fn close(&self);
}

/// Marker capability a `MetricSource` may additionally implement to feed
/// the SLO-aware policy's latency/error-rate inputs. Sources that don't
/// implement it leave the policy degrading to proportional, per spec.md.
#[async_trait]
pub trait ObservedReadingSource: MetricSource {
    async fn observed(&self) -> Option<ObservedReading> {
        None
    }
}

fn finite_non_negative(value: f64) -> Result<f64, MetricError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MetricError::Unavailable)
    }
}

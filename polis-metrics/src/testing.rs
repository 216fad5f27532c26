use crate::{MetricError, MetricSource, ObservedReading, ObservedReadingSource};
use async_trait::async_trait;
use std::sync::Mutex;

/// A `MetricSource` test double that returns a scripted sequence of
/// samples, repeating the last entry once exhausted. Exported (not
/// `#[cfg(test)]`-gated) so integration tests in other crates can drive
/// the reconciler deterministically without a real backend.
pub struct StaticMetricSource {
    script: Mutex<Vec<Result<f64, MetricError>>>,
    observed: Mutex<Option<ObservedReading>>,
    validate_result: Result<(), MetricError>,
    close_calls: Mutex<u32>,
}

impl StaticMetricSource {
    /// Always returns the same value.
    pub fn constant(value: f64) -> Self {
        Self::scripted(vec![Ok(value)])
    }

    /// Returns each entry in order, then repeats the last one forever.
    pub fn scripted(script: Vec<Result<f64, MetricError>>) -> Self {
        assert!(!script.is_empty(), "scripted source needs at least one reading");
        Self {
            script: Mutex::new(script),
            observed: Mutex::new(None),
            validate_result: Ok(()),
            close_calls: Mutex::new(0),
        }
    }

    pub fn failing_validate(message: &str) -> Self {
        Self {
            script: Mutex::new(vec![Err(MetricError::Unavailable)]),
            observed: Mutex::new(None),
            validate_result: Err(MetricError::Config(message.to_string())),
            close_calls: Mutex::new(0),
        }
    }

    pub fn with_observed(self, reading: ObservedReading) -> Self {
        *self.observed.lock().unwrap() = Some(reading);
        self
    }

    pub fn close_call_count(&self) -> u32 {
        *self.close_calls.lock().unwrap()
    }
}

#[async_trait]
impl MetricSource for StaticMetricSource {
    async fn sample(&self) -> Result<f64, MetricError> {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.remove(0)
        } else {
            script[0].clone()
        }
    }

    async fn validate(&self) -> Result<(), MetricError> {
        self.validate_result.clone()
    }

    async fn close(&self) {
        *self.close_calls.lock().unwrap() += 1;
    }
}

#[async_trait]
impl ObservedReadingSource for StaticMetricSource {
    async fn observed(&self) -> Option<ObservedReading> {
        *self.observed.lock().unwrap()
    }
}

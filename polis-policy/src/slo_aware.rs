use crate::{baseline_ceil, clamp, PolicyDecision, PolicyInput, ScalingPolicy};

/// Proportional baseline with an escalation-only SLO guard: a latency or
/// error-rate violation multiplies the baseline by 1.5 before clamping.
/// SLO compliance never pulls the count below baseline — the asymmetry is
/// intentional.
#[derive(Debug, Clone, Copy)]
pub struct SloAwarePolicy {
    pub target_latency_ms: f64,
    pub target_error_rate: f64,
}

impl ScalingPolicy for SloAwarePolicy {
    fn decide(&self, input: PolicyInput) -> PolicyDecision {
        let baseline = baseline_ceil(&input);
        let (latency_ms, error_rate) = match input.observed {
            Some(reading) => (reading.latency_ms, reading.error_rate),
            None => (0.0, 0.0),
        };

        let violating = latency_ms > self.target_latency_ms || error_rate > self.target_error_rate;
        let desired = if violating {
            ((baseline as f64) * 1.5).ceil() as u32
        } else {
            baseline
        };

        PolicyDecision::within_budget(clamp(desired, input.min, input.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polis_core::ObservedReading;

    fn input(current_replicas: u32, current_metric: f64, target_metric: f64) -> PolicyInput {
        PolicyInput {
            current_replicas,
            current_metric,
            target_metric,
            min: 1,
            max: 100,
            observed: None,
        }
    }

    #[test]
    fn degrades_to_proportional_without_observed_reading() {
        let policy = SloAwarePolicy {
            target_latency_ms: 200.0,
            target_error_rate: 0.01,
        };
        assert_eq!(policy.decide(input(4, 16.0, 4.0)).desired, 16);
    }

    #[test]
    fn compliance_does_not_override_baseline() {
        let policy = SloAwarePolicy {
            target_latency_ms: 200.0,
            target_error_rate: 0.01,
        };
        let mut i = input(4, 16.0, 4.0);
        i.observed = Some(ObservedReading {
            latency_ms: 50.0,
            error_rate: 0.0,
        });
        assert_eq!(policy.decide(i).desired, 16);
    }

    #[test]
    fn latency_violation_escalates_by_1_5x() {
        let policy = SloAwarePolicy {
            target_latency_ms: 200.0,
            target_error_rate: 0.01,
        };
        let mut i = input(4, 16.0, 4.0); // baseline 16
        i.observed = Some(ObservedReading {
            latency_ms: 500.0,
            error_rate: 0.0,
        });
        assert_eq!(policy.decide(i).desired, 24); // ceil(16 * 1.5)
    }

    #[test]
    fn error_rate_violation_escalates() {
        let policy = SloAwarePolicy {
            target_latency_ms: 200.0,
            target_error_rate: 0.01,
        };
        let mut i = input(1, 5.0, 5.0); // baseline 1
        i.observed = Some(ObservedReading {
            latency_ms: 0.0,
            error_rate: 0.5,
        });
        assert_eq!(policy.decide(i).desired, 2); // ceil(1 * 1.5)
    }

    #[test]
    fn escalation_still_clamps_to_max() {
        let policy = SloAwarePolicy {
            target_latency_ms: 1.0,
            target_error_rate: 0.0,
        };
        let mut i = input(10, 100.0, 1.0);
        i.max = 50;
        i.observed = Some(ObservedReading {
            latency_ms: 999.0,
            error_rate: 0.0,
        });
        assert_eq!(policy.decide(i).desired, 50);
    }
}

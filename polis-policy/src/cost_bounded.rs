use crate::{baseline_ceil, baseline_floor, clamp, PolicyDecision, PolicyInput, ScalingPolicy};
use polis_core::PreferredDirection;

const HOURS_PER_MONTH: f64 = 730.0;

/// Proportional baseline bounded by a monthly budget. `preferredDirection
/// == down` switches the baseline's rounding from ceiling to floor, biasing
/// toward fewer replicas; the budget itself only ever pulls the count down,
/// never up past `min` — the bound is contractual, the budget advisory.
#[derive(Debug, Clone, Copy)]
pub struct CostBoundedPolicy {
    pub max_monthly_cost: f64,
    pub cost_per_pod_per_hour: f64,
    pub preferred_direction: PreferredDirection,
}

impl CostBoundedPolicy {
    /// `None` when the budget would forbid even `min` replicas (advisory
    /// overrun), in which case the caller should still honor `min`.
    pub fn max_affordable(&self) -> u32 {
        if self.cost_per_pod_per_hour <= 0.0 {
            return u32::MAX;
        }
        (self.max_monthly_cost / (self.cost_per_pod_per_hour * HOURS_PER_MONTH)).floor() as u32
    }
}

impl ScalingPolicy for CostBoundedPolicy {
    fn decide(&self, input: PolicyInput) -> PolicyDecision {
        let baseline = match self.preferred_direction {
            PreferredDirection::Down => baseline_floor(&input),
            _ => baseline_ceil(&input),
        };

        let max_affordable = self.max_affordable();
        // The budget is advisory: it only ever pulls the baseline down, and
        // never below `min`, which is contractual. Either case where it
        // would have pulled further is reported as budget-exceeded so the
        // Reconciler can surface it.
        let cost_budget_exceeded = max_affordable < baseline || max_affordable < input.min;
        let bounded = baseline.min(max_affordable).max(input.min);

        PolicyDecision {
            desired: clamp(bounded, input.min, input.max),
            cost_budget_exceeded,
        }
    }
}

use chrono::{DateTime, Utc};
use polis_core::{BehaviorSpec, DirectionBehavior, IntentKey};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// The Safe Scaler's verdict: whether to act, and on which target count.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub act: bool,
    pub target: u32,
    pub reason: String,
}

impl Decision {
    fn skip(target: u32, reason: impl Into<String>) -> Self {
        Self {
            act: false,
            target,
            reason: reason.into(),
        }
    }

    fn act(target: u32, reason: impl Into<String>) -> Self {
        Self {
            act: true,
            target,
            reason: reason.into(),
        }
    }
}

/// Translates a policy's desired count into an actionable decision that
/// respects thrashing and budget-of-change limits. Pure over its inputs
/// plus the cooldown clock; never fails. The cooldown map is the only
/// mutable state, partitioned by intent key and written only after a
/// confirmed workload write, never speculatively.
#[derive(Default)]
pub struct SafeScaler {
    last_scale_time: Mutex<HashMap<IntentKey, DateTime<Utc>>>,
}

impl SafeScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn last_scale_time(&self, key: &IntentKey) -> Option<DateTime<Utc>> {
        self.last_scale_time.lock().await.get(key).copied()
    }

    /// Records a confirmed scaling write. Called by the Reconciler only
    /// after the Workload Adapter's `set_replicas` succeeds.
    pub async fn record_scale(&self, key: &IntentKey, at: DateTime<Utc>) {
        self.last_scale_time.lock().await.insert(key.clone(), at);
    }

    pub async fn remove(&self, key: &IntentKey) {
        self.last_scale_time.lock().await.remove(key);
    }

    pub async fn decide(
        &self,
        key: &IntentKey,
        current: u32,
        desired_from_policy: u32,
        min: u32,
        max: u32,
        behavior: &BehaviorSpec,
        now: DateTime<Utc>,
    ) -> Decision {
        if desired_from_policy == current {
            return Decision::skip(current, "at desired");
        }

        let direction = if desired_from_policy > current {
            Direction::Up
        } else {
            Direction::Down
        };
        let direction_behavior: &DirectionBehavior = match direction {
            Direction::Up => &behavior.scale_up,
            Direction::Down => &behavior.scale_down,
        };

        let last_scale = self.last_scale_time.lock().await.get(key).copied();
        if let Some(last) = last_scale {
            let elapsed = (now - last).num_seconds().max(0) as u64;
            if elapsed < direction_behavior.cooldown_seconds {
                return Decision::skip(current, "in cooldown");
            }
        }

        let delta = desired_from_policy.abs_diff(current);
        let target = if delta > direction_behavior.max_delta {
            match direction {
                Direction::Up => current + direction_behavior.max_delta,
                Direction::Down => current.saturating_sub(direction_behavior.max_delta),
            }
        } else {
            desired_from_policy
        };

        let target = target.clamp(min, max);

        if target == current {
            return Decision::skip(target, "clamped to current");
        }

        Decision::act(target, "scaling")
    }
}

use chrono::Utc;
use polis_core::{
    BehaviorSpec, Condition, ConditionType, DirectionBehavior, Intent, IntentKey, IntentSpec,
    IntentStatus, MetricSpec, ObservedReading, PolicySpec, PreferredDirection, ScalingTarget,
};
use std::collections::HashMap;

fn behavior() -> BehaviorSpec {
    BehaviorSpec {
        scale_up: DirectionBehavior {
            max_delta: 4,
            cooldown_seconds: 300,
        },
        scale_down: DirectionBehavior {
            max_delta: 4,
            cooldown_seconds: 300,
        },
    }
}

fn valid_spec() -> IntentSpec {
    IntentSpec {
        target: ScalingTarget {
            namespace: "default".to_string(),
            name: "web".to_string(),
            kind: "Deployment".to_string(),
        },
        min_replicas: 1,
        max_replicas: 10,
        metric: MetricSpec::QueueDepth {
            target_value: 5.0,
            host: "localhost".to_string(),
            port: 5672,
            queue: "jobs".to_string(),
            use_tls: false,
        },
        policy: PolicySpec::Proportional,
        behavior: behavior(),
        sync_interval_seconds: 30,
    }
}

#[test]
fn intent_key_display_joins_namespace_and_name() {
    let key = IntentKey::new("default", "web");
    assert_eq!(key.to_string(), "default/web");
}

#[test]
fn intent_key_equality_is_by_value() {
    assert_eq!(IntentKey::new("ns", "a"), IntentKey::new("ns", "a"));
    assert_ne!(IntentKey::new("ns", "a"), IntentKey::new("ns", "b"));
}

#[test]
fn observed_reading_round_trips_through_json() {
    let reading = ObservedReading {
        latency_ms: 120.5,
        error_rate: 0.01,
    };
    let json = serde_json::to_string(&reading).unwrap();
    let parsed: ObservedReading = serde_json::from_str(&json).unwrap();
    assert_eq!(reading, parsed);
}

#[test]
fn metric_spec_type_tag_and_target_value() {
    let spec = MetricSpec::TimeSeries {
        target_value: 42.0,
        endpoint: "http://localhost".to_string(),
        query: "sum(rate)".to_string(),
        headers: HashMap::new(),
    };
    assert_eq!(spec.type_tag(), "timeSeries");
    assert_eq!(spec.target_value(), 42.0);
}

#[test]
fn metric_spec_serializes_with_tagged_type_field() {
    let spec = MetricSpec::QueueDepth {
        target_value: 5.0,
        host: "localhost".to_string(),
        port: 5672,
        queue: "jobs".to_string(),
        use_tls: false,
    };
    let json = serde_json::to_value(&spec).unwrap();
    assert_eq!(json["type"], "queueDepth");
}

#[test]
fn policy_spec_type_tag() {
    let spec = PolicySpec::CostBounded {
        max_monthly_cost: 500.0,
        cost_per_pod_per_hour: 0.05,
        preferred_direction: PreferredDirection::Balanced,
    };
    assert_eq!(spec.type_tag(), "costBounded");
}

#[test]
fn intent_spec_validate_shape_accepts_valid_spec() {
    assert!(valid_spec().validate_shape().is_ok());
}

#[test]
fn intent_spec_validate_shape_rejects_zero_min_replicas() {
    let mut spec = valid_spec();
    spec.min_replicas = 0;
    assert!(spec.validate_shape().is_err());
}

#[test]
fn intent_spec_validate_shape_rejects_min_above_max() {
    let mut spec = valid_spec();
    spec.min_replicas = 11;
    assert!(spec.validate_shape().is_err());
}

#[test]
fn intent_spec_validate_shape_rejects_nonpositive_target_value() {
    let mut spec = valid_spec();
    spec.metric = MetricSpec::QueueDepth {
        target_value: 0.0,
        host: "localhost".to_string(),
        port: 5672,
        queue: "jobs".to_string(),
        use_tls: false,
    };
    assert!(spec.validate_shape().is_err());
}

#[test]
fn intent_spec_validate_shape_rejects_zero_sync_interval() {
    let mut spec = valid_spec();
    spec.sync_interval_seconds = 0;
    assert!(spec.validate_shape().is_err());
}

#[test]
fn intent_status_set_condition_replaces_same_type() {
    let mut status = IntentStatus::default();
    status.set_condition(Condition::new(ConditionType::Ready, true, "A", "first", Utc::now()));
    status.set_condition(Condition::new(ConditionType::Ready, false, "B", "second", Utc::now()));

    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.conditions[0].reason, "B");
}

#[test]
fn intent_status_set_condition_appends_distinct_types() {
    let mut status = IntentStatus::default();
    status.set_condition(Condition::new(ConditionType::Ready, true, "A", "msg", Utc::now()));
    status.set_condition(Condition::new(ConditionType::MetricUnavailable, false, "B", "msg", Utc::now()));

    assert_eq!(status.conditions.len(), 2);
}

#[test]
fn intent_new_starts_with_default_status() {
    let intent = Intent::new(IntentKey::new("default", "web"), valid_spec());
    assert!(intent.status.conditions.is_empty());
    assert_eq!(intent.status.current_replicas, None);
}

#[test]
fn intent_spec_round_trips_through_yaml() {
    let spec = valid_spec();
    let yaml = serde_yaml::to_string(&spec).unwrap();
    let parsed: IntentSpec = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed.min_replicas, spec.min_replicas);
    assert_eq!(parsed.metric.type_tag(), spec.metric.type_tag());
}

#[test]
fn intent_spec_defaults_behavior_and_sync_interval_when_omitted() {
    let yaml = r#"
target:
  namespace: default
  name: web
  kind: Deployment
min_replicas: 1
max_replicas: 10
metric:
  type: queueDepth
  target_value: 5.0
  host: localhost
  port: 5672
  queue: jobs
policy:
  type: proportional
"#;
    let spec: IntentSpec = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(spec.sync_interval_seconds, 30);
    assert_eq!(spec.behavior.scale_up.max_delta, 4);
    assert_eq!(spec.behavior.scale_up.cooldown_seconds, 300);
    assert_eq!(spec.behavior.scale_down.max_delta, 4);
    assert_eq!(spec.behavior.scale_down.cooldown_seconds, 300);
    assert!(spec.validate_shape().is_ok());
}

#[test]
fn direction_behavior_default_matches_spec_defaults() {
    let behavior = DirectionBehavior::default();
    assert_eq!(behavior.max_delta, 4);
    assert_eq!(behavior.cooldown_seconds, 300);
}

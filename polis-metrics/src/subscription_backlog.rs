use crate::{finite_non_negative, MetricError, MetricSource};
use async_trait::async_trait;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves a `credentialsRef` into a bearer token. Kept as a trait so the
/// real secret-store lookup (out of scope per spec.md) can be swapped in
/// without touching the metric source.
pub trait CredentialResolver: Send + Sync {
    fn resolve(&self, credentials_ref: &str) -> Option<String>;
}

/// Resolves a credentials reference from an environment variable of the
/// same name. Adequate for local runs and tests; a production deployment
/// would swap in a resolver backed by the orchestrator's secret store.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialResolver;

impl CredentialResolver for EnvCredentialResolver {
    fn resolve(&self, credentials_ref: &str) -> Option<String> {
        std::env::var(credentials_ref).ok()
    }
}

/// Subscription-backlog metric source: reports the undelivered message
/// count on a subscription via an authenticated HTTP call. The endpoint is
/// synthesized from `project_id`/`subscription_id`; the real backend's API
/// shape is out of scope per spec.md, so this models a plausible
/// monitoring-style GET returning `{"backlogCount": <number>}`.
pub struct SubscriptionBacklogSource {
    project_id: String,
    subscription_id: String,
    credentials_ref: String,
    client: reqwest::Client,
    resolver: Box<dyn CredentialResolver>,
}

impl SubscriptionBacklogSource {
    pub fn new(project_id: String, subscription_id: String, credentials_ref: String) -> Self {
        Self::with_resolver(
            project_id,
            subscription_id,
            credentials_ref,
            Box::new(EnvCredentialResolver),
        )
    }

    pub fn with_resolver(
        project_id: String,
        subscription_id: String,
        credentials_ref: String,
        resolver: Box<dyn CredentialResolver>,
    ) -> Self {
        Self {
            project_id,
            subscription_id,
            credentials_ref,
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client with static config always builds"),
            resolver,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://monitoring.example.invalid/v1/projects/{}/subscriptions/{}/backlog",
            self.project_id, self.subscription_id
        )
    }
}

#[async_trait]
impl MetricSource for SubscriptionBacklogSource {
    async fn sample(&self) -> Result<f64, MetricError> {
        let token = self
            .resolver
            .resolve(&self.credentials_ref)
            .ok_or(MetricError::Unavailable)?;

        let response = self
            .client
            .get(self.endpoint())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|_| MetricError::Unavailable)?;

        if !response.status().is_success() {
            return Err(MetricError::Unavailable);
        }

        let body: serde_json::Value = response.json().await.map_err(|_| MetricError::Unavailable)?;
        let value = body
            .get("backlogCount")
            .and_then(|v| v.as_f64())
            .ok_or(MetricError::Unavailable)?;
        finite_non_negative(value)
    }

    async fn validate(&self) -> Result<(), MetricError> {
        if self.project_id.is_empty() || self.subscription_id.is_empty() {
            return Err(MetricError::Config(
                "subscription-backlog source requires project_id and subscription_id".to_string(),
            ));
        }
        self.resolver.resolve(&self.credentials_ref).ok_or_else(|| {
            MetricError::Config(format!(
                "could not resolve credentials_ref '{}'",
                self.credentials_ref
            ))
        })?;
        Ok(())
    }

    async fn close(&self) {
        // Stateless HTTP client, nothing to release.
    }
}

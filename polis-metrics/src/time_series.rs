use crate::{finite_non_negative, MetricError, MetricSource};
use async_trait::async_trait;
use polis_core::PolisError;
use reqwest::{header::HeaderMap, header::HeaderName, header::HeaderValue};
use std::collections::HashMap;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Time-series metric source: issues an HTTP GET against a query endpoint
/// and expects the response body to carry a single scalar result, either
/// as a bare JSON number or `{"value": <number>}`.
pub struct TimeSeriesSource {
    client: reqwest::Client,
    endpoint: String,
    query: String,
    headers: HeaderMap,
}

impl TimeSeriesSource {
    pub fn new(
        endpoint: String,
        query: String,
        raw_headers: HashMap<String, String>,
    ) -> Result<Self, PolisError> {
        reqwest::Url::parse(&endpoint)
            .map_err(|e| PolisError::Config(format!("invalid time-series endpoint: {}", e)))?;

        let mut headers = HeaderMap::new();
        for (key, value) in &raw_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| PolisError::Config(format!("invalid header name {}: {}", key, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| PolisError::Config(format!("invalid header value for {}: {}", key, e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PolisError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            query,
            headers,
        })
    }

    fn extract_scalar(body: &serde_json::Value) -> Option<f64> {
        match body {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::Object(map) => map.get("value").and_then(|v| v.as_f64()),
            _ => None,
        }
    }
}

#[async_trait]
impl MetricSource for TimeSeriesSource {
    async fn sample(&self) -> Result<f64, MetricError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", &self.query)])
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|_| MetricError::Unavailable)?;

        if !response.status().is_success() {
            return Err(MetricError::Unavailable);
        }

        let body: serde_json::Value = response.json().await.map_err(|_| MetricError::Unavailable)?;
        let value = Self::extract_scalar(&body).ok_or(MetricError::Unavailable)?;
        finite_non_negative(value)
    }

    async fn validate(&self) -> Result<(), MetricError> {
        if self.query.trim().is_empty() {
            return Err(MetricError::Config("time-series query must not be empty".to_string()));
        }
        Ok(())
    }

    async fn close(&self) {
        // Stateless HTTP client, nothing to release.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_number() {
        let body = serde_json::json!(42.5);
        assert_eq!(TimeSeriesSource::extract_scalar(&body), Some(42.5));
    }

    #[test]
    fn extracts_value_field() {
        let body = serde_json::json!({"value": 7.0});
        assert_eq!(TimeSeriesSource::extract_scalar(&body), Some(7.0));
    }

    #[test]
    fn rejects_non_scalar() {
        let body = serde_json::json!({"series": [1, 2, 3]});
        assert_eq!(TimeSeriesSource::extract_scalar(&body), None);
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let result = TimeSeriesSource::new("not a url".to_string(), "q".to_string(), HashMap::new());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_query_fails_validate() {
        let source = TimeSeriesSource::new(
            "http://localhost/query".to_string(),
            "   ".to_string(),
            HashMap::new(),
        )
        .unwrap();
        assert!(matches!(source.validate().await, Err(MetricError::Config(_))));
    }
}

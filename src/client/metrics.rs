use reqwest::Method;

use super::ApiClient;
use crate::metrics::{
    dto::{
        MetricsEnvelope, MetricsInput, NameEnvelope, NameUpdate, NutritionTargets,
        UpdatedEnvelope, UserMetrics,
    },
    services::DEFAULT_DISPLAY_NAME,
};

/// Signed-in user's stored metrics. The `ApiClient` must carry a bearer token.
#[derive(Debug, Clone)]
pub struct MetricsClient {
    api: ApiClient,
}

impl MetricsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self) -> Option<UserMetrics> {
        let req = self.api.request(Method::GET, "/api/metrics");
        self.api
            .fetch::<MetricsEnvelope>(req, "get metrics")
            .await?
            .metrics
    }

    pub async fn save(&self, input: &MetricsInput) -> Option<UserMetrics> {
        let req = self.api.request(Method::PUT, "/api/metrics").json(input);
        self.api
            .fetch::<MetricsEnvelope>(req, "save metrics")
            .await?
            .metrics
    }

    /// Display name; falls back to the default name on any failure.
    pub async fn name(&self) -> String {
        let req = self.api.request(Method::GET, "/api/metrics/name");
        self.api
            .fetch::<NameEnvelope>(req, "get name")
            .await
            .map(|e| e.name)
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())
    }

    pub async fn update_name(&self, full_name: &str) -> bool {
        let req = self
            .api
            .request(Method::PUT, "/api/metrics/name")
            .json(&NameUpdate {
                full_name: full_name.to_string(),
            });
        self.api
            .fetch::<UpdatedEnvelope>(req, "update name")
            .await
            .is_some_and(|e| e.ok && e.updated)
    }

    pub async fn targets(&self, weight: f64) -> Option<NutritionTargets> {
        let req = self
            .api
            .request(Method::GET, "/api/metrics/targets")
            .query(&[("weight", weight)]);
        self.api.fetch(req, "nutrition targets").await
    }
}

use reqwest::Method;

use super::ApiClient;
use crate::profile::{
    dto::{DailyNutrition, NutritionProgress, ProfileMetrics, ProfileResponse, UserProfile},
    services,
};

/// Read-only view over `/api/user/:id/profile`.
#[derive(Debug, Clone)]
pub struct ProfileClient {
    api: ApiClient,
}

impl ProfileClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn profile(&self, user_id: &str) -> Option<UserProfile> {
        let req = self
            .api
            .request(Method::GET, &format!("/api/user/{user_id}/profile"));
        match self.api.fetch::<ProfileResponse>(req, "profile").await? {
            ProfileResponse {
                ok: true,
                profile: Some(profile),
                ..
            } => Some(profile),
            _ => None,
        }
    }

    pub async fn metrics(&self, user_id: &str) -> Option<ProfileMetrics> {
        self.profile(user_id).await.map(|p| p.metrics)
    }

    pub async fn today_nutrition(&self, user_id: &str) -> Option<DailyNutrition> {
        let profile = self.profile(user_id).await?;
        services::nutrition_for(&profile, &services::today()).cloned()
    }

    pub async fn calories_remaining(&self, user_id: &str) -> Option<f64> {
        let profile = self.profile(user_id).await?;
        Some(services::calories_remaining(&profile, &services::today()))
    }

    pub async fn nutrition_progress(&self, user_id: &str) -> Option<NutritionProgress> {
        let profile = self.profile(user_id).await?;
        Some(services::nutrition_progress(&profile, &services::today()))
    }
}

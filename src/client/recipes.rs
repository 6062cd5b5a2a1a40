use reqwest::Method;

use super::ApiClient;
use crate::recipes::dto::{Recipe, RecipeList, RecipeQuery};

#[derive(Debug, Clone)]
pub struct RecipeClient {
    api: ApiClient,
}

impl RecipeClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Recipes matching `query`; empty when the query is blank or the
    /// recommender is unavailable.
    pub async fn recommend(&self, query: &str) -> Vec<Recipe> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let req = self
            .api
            .request(Method::POST, "/api/recipes")
            .json(&RecipeQuery {
                query: query.to_string(),
            });
        self.api
            .fetch::<RecipeList>(req, "recipes")
            .await
            .map(|l| l.recetas)
            .unwrap_or_default()
    }
}

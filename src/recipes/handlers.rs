use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use super::dto::RecipeQuery;
use crate::{error::ProxyError, state::AppState};

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", post(recommend))
}

/// POST /recipes { query } -> { recetas: [...] }
#[instrument(skip_all)]
pub async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecipeQuery>, JsonRejection>,
) -> Result<Json<Value>, ProxyError> {
    let Json(body) = payload?;
    let query = body.query.trim();
    if query.is_empty() {
        return Err(ProxyError::Input("Query is required".into()));
    }

    info!(%query, "fetching recipes");
    let url = format!("{}/recommend", state.config.recipes_api_url);
    let req = state
        .upstream
        .http()
        .post(url)
        .json(&RecipeQuery { query: query.to_string() });
    let reply = state
        .upstream
        .call_json(req, state.config.timeouts.recipes)
        .await?;

    let count = reply
        .get("recetas")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    info!(count, "recipes fetched");
    Ok(Json(reply))
}

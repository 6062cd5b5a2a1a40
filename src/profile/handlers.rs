use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use crate::{error::ProxyError, state::AppState, upstream::path_segment};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/user/:user_id/profile", get(get_profile))
}

/// GET /user/{userId}/profile: metrics plus daily nutrition from the AI backend.
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let user_id = path_segment("userId", &user_id)?;
    let url = format!("{}/user/{}/profile", state.config.ai_base(), user_id);
    let reply = state
        .upstream
        .call_json(state.upstream.http().get(url), state.config.timeouts.chat)
        .await?;
    info!(%user_id, "profile fetched");
    Ok(Json(reply))
}

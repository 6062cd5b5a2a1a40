use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use super::dto::ChatRequest;
use crate::{
    error::ProxyError,
    state::AppState,
    upstream::path_segment,
};

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/:user_id", post(send_message))
        .route(
            "/chat/:user_id/history",
            axum::routing::get(get_history).delete(clear_history),
        )
}

/// POST /chat/{userId}: forwards `{message, user_name}` to the chat backend.
#[instrument(skip(state, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, ProxyError> {
    let user_id = path_segment("userId", &user_id)?;
    let Json(body) = payload?;
    if body.message.trim().is_empty() {
        return Err(ProxyError::Input("message is required".into()));
    }

    let url = format!("{}/chat/{}", state.config.ai_base(), user_id);
    let req = state.upstream.http().post(url).json(&body);
    let reply = state
        .upstream
        .call_json(req, state.config.timeouts.chat)
        .await?;

    info!(%user_id, "chat reply received");
    Ok(Json(reply))
}

#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let user_id = path_segment("userId", &user_id)?;
    let url = format!("{}/chat/{}/history", state.config.ai_base(), user_id);
    let reply = state
        .upstream
        .call_json(state.upstream.http().get(url), state.config.timeouts.chat)
        .await?;

    let count = reply
        .get("history")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    info!(%user_id, count, "chat history fetched");
    Ok(Json(reply))
}

#[instrument(skip(state))]
pub async fn clear_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let user_id = path_segment("userId", &user_id)?;
    let url = format!("{}/chat/{}/history", state.config.ai_base(), user_id);
    let reply = state
        .upstream
        .call_json(state.upstream.http().delete(url), state.config.timeouts.chat)
        .await?;

    info!(%user_id, "chat history cleared");
    Ok(Json(reply))
}

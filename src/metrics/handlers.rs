use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{
        MetricsEnvelope, MetricsInput, NameEnvelope, NameUpdate, NutritionTargets, TargetsQuery,
        UpdatedEnvelope,
    },
    repo::MetricsStore,
    services::{calculate_nutrition_targets, display_name, validate_input, validate_weight},
};
use crate::{auth::AuthUser, error::ProxyError, state::AppState};

pub fn metrics_routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(get_metrics).put(save_metrics))
        .route("/metrics/name", get(get_name).put(update_name))
        .route("/metrics/targets", get(get_targets))
}

fn store(state: &AppState) -> Result<Arc<dyn MetricsStore>, ProxyError> {
    state.metrics.clone().ok_or_else(|| ProxyError::Config {
        message: "Metrics store is not configured".into(),
        hint: "Set DATABASE_URL to the hosted Postgres connection string and restart".into(),
    })
}

fn internal(e: anyhow::Error) -> ProxyError {
    ProxyError::Internal(format!("{e:#}"))
}

#[instrument(skip_all)]
pub async fn get_metrics(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MetricsEnvelope>, ProxyError> {
    let metrics = store(&state)?.get(user.id).await.map_err(internal)?;
    if metrics.is_none() {
        info!(user_id = %user.id, "no metrics saved yet");
    }
    Ok(Json(MetricsEnvelope { ok: true, metrics }))
}

#[instrument(skip_all)]
pub async fn save_metrics(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<MetricsInput>, JsonRejection>,
) -> Result<Json<MetricsEnvelope>, ProxyError> {
    let Json(input) = payload?;
    validate_input(&input)?;
    let saved = store(&state)?.save(user.id, &input).await.map_err(internal)?;
    info!(user_id = %user.id, weight = saved.weight, "metrics saved");
    Ok(Json(MetricsEnvelope {
        ok: true,
        metrics: Some(saved),
    }))
}

#[instrument(skip_all)]
pub async fn get_name(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<NameEnvelope>, ProxyError> {
    let metrics = store(&state)?.get(user.id).await.map_err(internal)?;
    Ok(Json(NameEnvelope {
        ok: true,
        name: display_name(metrics.as_ref()),
    }))
}

#[instrument(skip_all)]
pub async fn update_name(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<NameUpdate>, JsonRejection>,
) -> Result<Json<UpdatedEnvelope>, ProxyError> {
    let Json(body) = payload?;
    let name = body.full_name.trim();
    if name.is_empty() {
        return Err(ProxyError::Input("full_name is required".into()));
    }
    let updated = store(&state)?
        .update_name(user.id, name)
        .await
        .map_err(internal)?;
    info!(user_id = %user.id, updated, "display name update");
    Ok(Json(UpdatedEnvelope { ok: true, updated }))
}

#[instrument(skip_all)]
pub async fn get_targets(
    query: Result<Query<TargetsQuery>, QueryRejection>,
) -> Result<Json<NutritionTargets>, ProxyError> {
    let Query(q) = query?;
    validate_weight(q.weight)?;
    Ok(Json(calculate_nutrition_targets(q.weight)))
}

use axum::{routing::get, Json, Router};
use tracing::instrument;

use super::{extractors::AuthUser, services::CurrentUser};
use crate::state::AppState;

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<CurrentUser> {
    Json(user)
}

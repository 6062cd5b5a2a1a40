//! Multipart proxies: the multimodal question-answering analyzer and the
//! meal-photo nutrient analyzer.

use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::analyzer_routes()
}

use crate::state::AppState;
use axum::Router;

mod claims;
pub mod extractors;
pub mod handlers;
pub mod services;

pub use claims::{Claims, UserMetadata};
pub use extractors::AuthUser;
pub use services::{AuthKeys, CurrentUser};

pub fn router() -> Router<AppState> {
    handlers::me_routes()
}

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::services::{AuthKeys, CurrentUser};
use crate::error::ProxyError;

/// Validates the bearer token and yields the signed-in user.
pub struct AuthUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthKeys: FromRef<S>,
{
    type Rejection = ProxyError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = AuthKeys::from_ref(state);
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ProxyError::Unauthorized("Missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| ProxyError::Unauthorized("Invalid auth scheme".into()))?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "bearer token rejected");
            ProxyError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(AuthUser(claims.into()))
    }
}

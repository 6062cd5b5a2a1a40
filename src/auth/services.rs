use axum::extract::FromRef;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::metrics::services::DEFAULT_DISPLAY_NAME;
use crate::state::AppState;

/// The signed-in user as the rest of the app sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: String,
}

impl From<Claims> for CurrentUser {
    fn from(c: Claims) -> Self {
        let email = c.email.filter(|e| !e.is_empty());
        let name = c
            .user_metadata
            .full_name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
        Self {
            id: c.sub,
            email,
            name,
        }
    }
}

/// Verification material for bearer tokens; `decoding` is `None` when no
/// secret is configured, in which case every token is refused.
#[derive(Clone)]
pub struct AuthKeys {
    pub decoding: Option<DecodingKey>,
    pub audience: String,
}

impl FromRef<AppState> for AuthKeys {
    fn from_ref(state: &AppState) -> Self {
        let auth = &state.config.auth;
        Self {
            decoding: auth
                .jwt_secret
                .as_deref()
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
            audience: auth.audience.clone(),
        }
    }
}

impl AuthKeys {
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let Some(decoding) = &self.decoding else {
            anyhow::bail!("token verification is not configured");
        };
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(std::slice::from_ref(&self.audience));
        let data = decode::<Claims>(token, decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
pub(crate) mod test_tokens {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    use crate::auth::{Claims, UserMetadata};

    pub const SECRET: &str = "test-secret";

    pub fn token_for(user_id: Uuid, email: Option<&str>, full_name: Option<&str>) -> String {
        let exp = time::OffsetDateTime::now_utc().unix_timestamp() as usize + 3600;
        let claims = Claims {
            sub: user_id,
            exp,
            aud: "authenticated".into(),
            email: email.map(str::to_string),
            user_metadata: UserMetadata {
                full_name: full_name.map(str::to_string),
            },
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("sign test token")
    }
}

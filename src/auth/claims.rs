use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form profile data attached to the user by the auth backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Access-token payload issued by the hosted auth backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // user ID
    pub exp: usize,     // expires at (unix timestamp)
    pub aud: String,    // audience
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

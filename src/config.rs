use std::time::Duration;

pub const DEFAULT_AI_API_URL: &str = "https://658096ec9c01.ngrok-free.app";
pub const DEFAULT_RECIPES_API_URL: &str = "https://recipes-api-541144187637.us-west4.run.app";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub audience: String,
}

/// Outbound call budgets, one per route family.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub chat: Duration,
    pub recipes: Duration,
    pub media: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            chat: Duration::from_secs(30),
            recipes: Duration::from_secs(120),
            media: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Explicitly configured AI backend; `None` when the env var is absent.
    pub ai_api_url: Option<String>,
    pub recipes_api_url: String,
    pub database_url: Option<String>,
    pub auth: AuthConfig,
    pub timeouts: Timeouts,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ai_api_url: None,
            recipes_api_url: DEFAULT_RECIPES_API_URL.into(),
            database_url: None,
            auth: AuthConfig {
                jwt_secret: None,
                audience: "authenticated".into(),
            },
            timeouts: Timeouts::default(),
            max_upload_bytes: 80 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let ai_api_url = non_empty_var("AI_API_URL").or_else(|| non_empty_var("NEXT_PUBLIC_AI_API_URL"));
        let recipes_api_url =
            non_empty_var("RECIPES_API_URL").unwrap_or_else(|| DEFAULT_RECIPES_API_URL.into());

        let defaults = Timeouts::default();
        let timeouts = Timeouts {
            chat: secs_var("CHAT_TIMEOUT_SECS").unwrap_or(defaults.chat),
            recipes: secs_var("RECIPES_TIMEOUT_SECS").unwrap_or(defaults.recipes),
            media: secs_var("MEDIA_TIMEOUT_SECS").unwrap_or(defaults.media),
        };

        let max_upload_mb = std::env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(80);

        Ok(Self {
            ai_api_url: ai_api_url.map(|u| trim_base(&u)),
            recipes_api_url: trim_base(&recipes_api_url),
            database_url: non_empty_var("DATABASE_URL"),
            auth: AuthConfig {
                jwt_secret: non_empty_var("AUTH_JWT_SECRET"),
                audience: std::env::var("AUTH_JWT_AUDIENCE")
                    .unwrap_or_else(|_| "authenticated".into()),
            },
            timeouts,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }

    /// Base URL for chat, history, profile and meal analysis, falling back to the
    /// hosted default when nothing is configured.
    pub fn ai_base(&self) -> &str {
        self.ai_api_url.as_deref().unwrap_or(DEFAULT_AI_API_URL)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn secs_var(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        assert_eq!(trim_base("http://x.local/ "), "http://x.local");
        assert_eq!(trim_base("http://x.local//"), "http://x.local");
    }

    #[test]
    fn ai_base_falls_back_to_default() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.ai_base(), DEFAULT_AI_API_URL);

        let configured = AppConfig {
            ai_api_url: Some("http://ai.local".into()),
            ..AppConfig::default()
        };
        assert_eq!(configured.ai_base(), "http://ai.local");
    }
}

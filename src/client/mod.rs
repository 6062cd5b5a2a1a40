//! Typed clients for the proxy routes, for UI code and other Rust callers.
//!
//! Nothing here returns an error: a failed call comes back as `None`, `false`
//! or an empty `Vec`, so "service unavailable" and "service said no" look
//! the same to the caller. Failures are logged.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::warn;

pub mod chat;
pub mod media;
pub mod metrics;
pub mod profile;
pub mod recipes;

pub use chat::{ChatMessage, ChatSession};
pub use media::{AnalysisOutcome, MealAnalyzer, MultimodalClient};
pub use metrics::MetricsClient;
pub use profile::ProfileClient;
pub use recipes::RecipeClient;

/// Longer than any proxy-side budget so the proxy reports timeouts itself.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(150);

/// Base URL plus optional bearer token for the proxy API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: None,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.bearer {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Sends `req` and decodes a 2xx JSON body; anything else is `None`.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Option<T> {
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, what, "request failed");
                return None;
            }
        };
        let status = resp.status();
        if !status.is_success() {
            warn!(%status, what, "request rejected");
            return None;
        }
        match resp.json::<T>().await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, what, "unexpected response body");
                None
            }
        }
    }
}

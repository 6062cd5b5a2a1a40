use std::time::{Duration, Instant};

use reqwest::{header::CONTENT_TYPE, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ProxyError;

/// Longest body excerpt echoed back to the caller on protocol errors.
pub const SNIPPET_MAX_CHARS: usize = 1000;
const LOG_SNIPPET_CHARS: usize = 300;

/// Upstream response as received, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub text: String,
    pub elapsed: Duration,
}

impl RawReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nutriproxy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Sends `req` and reads the whole body within `limit`.
    ///
    /// The send and body read run as one future under `tokio::time::timeout`;
    /// when the deadline fires the future is dropped, which aborts the call.
    pub async fn exchange(
        &self,
        req: RequestBuilder,
        limit: Duration,
    ) -> Result<RawReply, ProxyError> {
        let started = Instant::now();
        let call = async {
            let resp = req.send().await?;
            let status = resp.status().as_u16();
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let text = resp.text().await?;
            Ok::<_, reqwest::Error>((status, content_type, text))
        };

        match tokio::time::timeout(limit, call).await {
            Err(_) => {
                warn!(limit_secs = limit.as_secs(), "upstream deadline elapsed");
                Err(ProxyError::timeout(limit))
            }
            Ok(Err(e)) if e.is_timeout() => Err(ProxyError::timeout(limit)),
            Ok(Err(e)) => {
                warn!(error = %e, "upstream transport failure");
                Err(ProxyError::Transport(e.to_string()))
            }
            Ok(Ok((status, content_type, text))) => {
                debug!(
                    status,
                    content_type = content_type.as_deref().unwrap_or("-"),
                    body = %snippet(&text, LOG_SNIPPET_CHARS),
                    "upstream replied"
                );
                Ok(RawReply {
                    status,
                    content_type,
                    text,
                    elapsed: started.elapsed(),
                })
            }
        }
    }

    /// `exchange` followed by `classify`.
    pub async fn call_json(
        &self,
        req: RequestBuilder,
        limit: Duration,
    ) -> Result<Value, ProxyError> {
        let raw = self.exchange(req, limit).await?;
        classify(&raw)
    }
}

/// Interprets a raw reply. Never assumes the body is JSON.
pub fn classify(raw: &RawReply) -> Result<Value, ProxyError> {
    let parsed: Value = match serde_json::from_str(&raw.text) {
        Ok(v) => v,
        Err(_) => {
            return Err(ProxyError::non_json(
                raw.status,
                snippet(&raw.text, SNIPPET_MAX_CHARS),
                raw.content_type.clone(),
            ))
        }
    };

    if !raw.is_success() {
        return Err(ProxyError::Upstream {
            status: raw.status,
            detail: parsed,
        });
    }

    if parsed.get("ok") == Some(&Value::Bool(false)) {
        let message = parsed
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("Upstream reported a failure")
            .to_string();
        return Err(ProxyError::Logical {
            message,
            detail: parsed,
        });
    }

    Ok(parsed)
}

/// Checks an identifier before it is spliced into an upstream URL path.
pub fn path_segment<'a>(name: &str, value: &'a str) -> Result<&'a str, ProxyError> {
    let value = value.trim();
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(value)
    } else {
        Err(ProxyError::Input(format!("{name} is invalid")))
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};
use tracing::{info, warn};

use super::ApiClient;
use crate::chat::dto::{ChatHistoryItem, ChatHistoryResponse, ChatRequest, ChatResponse, MessageType};
use crate::metrics::services::DEFAULT_DISPLAY_NAME;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ChatMessage {
    fn now(kind: MessageType, content: &str, metadata: Option<Value>) -> Self {
        Self {
            kind,
            content: content.to_string(),
            timestamp: OffsetDateTime::now_utc(),
            metadata,
        }
    }
}

impl From<ChatHistoryItem> for ChatMessage {
    fn from(item: ChatHistoryItem) -> Self {
        Self {
            kind: item.message_type,
            content: item.content,
            timestamp: parse_timestamp(&item.created_at),
            metadata: None,
        }
    }
}

/// Accepts RFC 3339 or an offset-less `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC).
fn parse_timestamp(raw: &str) -> OffsetDateTime {
    if let Ok(t) = OffsetDateTime::parse(raw, &Rfc3339) {
        return t;
    }
    let naive = time::macros::format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    PrimitiveDateTime::parse(raw, &naive)
        .map(PrimitiveDateTime::assume_utc)
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// One user's conversation with the nutrition assistant.
///
/// The local message list is a cache; the chat backend is the source of truth
/// and `load_history` replaces the cache with it.
#[derive(Debug, Clone)]
pub struct ChatSession {
    api: ApiClient,
    user_id: String,
    user_name: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(api: ApiClient, user_id: impl Into<String>, user_name: Option<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            user_name: user_name.unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            messages: Vec::new(),
        }
    }

    /// Sends `text`; returns the assistant's reply.
    ///
    /// The user turn is appended before the call and rolled back if the
    /// backend does not produce a reply.
    pub async fn send_message(&mut self, text: &str) -> Option<String> {
        let pending_at = self.messages.len();
        self.messages.push(ChatMessage::now(MessageType::User, text, None));

        let body = ChatRequest {
            message: text.to_string(),
            user_name: self.user_name.clone(),
        };
        let req = self
            .api
            .request(Method::POST, &format!("/api/chat/{}", self.user_id))
            .json(&body);
        let reply: Option<ChatResponse> = self.api.fetch(req, "chat message").await;

        match reply {
            Some(ChatResponse {
                ok: true,
                response: Some(answer),
                metadata,
                ..
            }) => {
                self.messages
                    .push(ChatMessage::now(MessageType::Assistant, &answer, metadata));
                info!(user_id = %self.user_id, "assistant replied");
                Some(answer)
            }
            other => {
                if let Some(ChatResponse { error: Some(e), .. }) = other {
                    warn!(error = %e, "chat backend refused message");
                }
                self.messages.truncate(pending_at);
                None
            }
        }
    }

    /// Replaces the local cache with the backend history and returns it.
    pub async fn load_history(&mut self) -> Vec<ChatMessage> {
        let req = self
            .api
            .request(Method::GET, &format!("/api/chat/{}/history", self.user_id));
        match self.api.fetch::<ChatHistoryResponse>(req, "chat history").await {
            Some(ChatHistoryResponse { ok: true, history }) => {
                self.messages = history.into_iter().map(ChatMessage::from).collect();
                info!(count = self.messages.len(), "history loaded");
                self.messages.clone()
            }
            _ => Vec::new(),
        }
    }

    pub async fn clear_history(&mut self) -> bool {
        let req = self
            .api
            .request(Method::DELETE, &format!("/api/chat/{}/history", self.user_id));
        let cleared = self
            .api
            .fetch::<Value>(req, "clear history")
            .await
            .is_some_and(|v| v.get("ok") == Some(&Value::Bool(true)));
        if cleared {
            self.messages.clear();
        }
        cleared
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear_local_messages(&mut self) {
        self.messages.clear();
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }
}

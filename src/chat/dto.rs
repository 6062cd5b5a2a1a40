use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metrics::services::DEFAULT_DISPLAY_NAME;

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Assistant,
}

/// Body forwarded to the chat backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_user_name")]
    pub user_name: String,
}

fn default_user_name() -> String {
    DEFAULT_DISPLAY_NAME.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub ok: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatHistoryItem {
    pub message_type: MessageType,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub ok: bool,
    #[serde(default)]
    pub history: Vec<ChatHistoryItem>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub user_id: String,
    pub role: String,
    pub content: String,
    pub thread_id: String,
    /// JSON-encoded list of the attachment tokens sent with the turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a chat message. Content is expected to be sanitized.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub user_id: String,
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    pub attachments: Option<String>,
}

impl NewMessage {
    /// A row that was never written; used when the assistant insert fails
    /// and the turn still has to be returned to the caller.
    pub fn unsaved(self) -> Message {
        let now = Utc::now();
        Message {
            id: 0,
            user_id: self.user_id,
            role: self.role.as_str().to_string(),
            content: self.content,
            thread_id: self.thread_id,
            attachments: self.attachments,
            created_at: now,
            updated_at: now,
        }
    }
}

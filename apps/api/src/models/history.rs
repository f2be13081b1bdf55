use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One question/answer pair logged after every chat turn.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CareerHistory {
    pub id: i64,
    pub user_id: String,
    pub thread_id: String,
    pub category: String,
    pub title: String,
    pub content: String,
    pub ai_response: String,
    pub model_id: String,
    /// JSON array of tag strings.
    pub tags: String,
    pub rating: i32,
    pub is_bookmarked: bool,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCareerHistory {
    pub user_id: String,
    pub thread_id: String,
    pub category: String,
    pub title: String,
    pub content: String,
    pub ai_response: String,
    pub model_id: String,
    pub tags: String,
    pub metadata: Option<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A comment on an article. `author_display` is a snapshot of the author's
/// name at post time, never re-resolved against the users table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: Uuid,
    pub author_display: String,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub content: Option<String>,
    /// Reply marker; values that are not well-formed UUIDs are ignored.
    pub parent_id: Option<String>,
    /// Client-supplied comment id, honored when it is a well-formed UUID.
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
}

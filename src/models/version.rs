use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{PageMeta, Reference, parse_references};

/// An immutable snapshot of an article's mutable fields, captured just before
/// an update lands.
#[derive(Debug, Clone, FromRow)]
pub struct ArticleVersion {
    pub id: Uuid,
    pub article_id: Uuid,
    pub title: String,
    pub content: String,
    pub references_json: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub id: Uuid,
    pub article_id: Uuid,
    pub title: String,
    pub content: String,
    pub references: Vec<Reference>,
    pub created_at: DateTime<Utc>,
}

impl From<ArticleVersion> for VersionResponse {
    fn from(v: ArticleVersion) -> Self {
        Self {
            id: v.id,
            article_id: v.article_id,
            title: v.title,
            content: v.content,
            references: parse_references(v.references_json),
            created_at: v.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VersionListResponse {
    pub versions: Vec<VersionResponse>,
    pub page: PageMeta,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListVersionsQuery {
    pub limit: Option<i64>,
}

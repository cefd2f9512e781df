use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{Reference, coerce_references, parse_references};

pub const MAX_TITLE_LEN: usize = 500;

/// Truncate a request-supplied title to the column cap. The only content
/// validation updates perform.
pub fn clamp_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_LEN).collect()
}

#[derive(Debug, Clone, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub template_id: Option<String>,
    pub references_json: serde_json::Value,
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub template_id: Option<String>,
    pub references: Vec<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ArticleResponse {
    /// Listing and mutation responses omit the share token; only direct reads
    /// include it.
    pub fn from_row(article: Article, with_share_token: bool) -> Self {
        Self {
            id: article.id,
            user_id: article.user_id,
            project_id: article.project_id,
            title: article.title,
            content: article.content,
            template_id: article.template_id,
            references: parse_references(article.references_json),
            share_token: if with_share_token {
                article.share_token
            } else {
                None
            },
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleResponse>,
    pub page: PageMeta,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListArticlesQuery {
    pub project_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateArticle {
    pub title: Option<String>,
    pub content: Option<String>,
    pub template_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(default)]
    pub references_json: Option<serde_json::Value>,
    #[serde(default)]
    pub references: Option<serde_json::Value>,
}

impl CreateArticle {
    pub fn references(&self) -> Vec<Reference> {
        self.references_json
            .clone()
            .or_else(|| self.references.clone())
            .map(coerce_references)
            .unwrap_or_default()
    }
}

/// `null` and absent are different things for `template_id`: `null` clears
/// the field, absent leaves it alone.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub template_id: Option<Option<String>>,
    #[serde(default)]
    pub references_json: Option<serde_json::Value>,
    #[serde(default)]
    pub references: Option<serde_json::Value>,
}

impl UpdateArticle {
    /// An update carrying none of the recognized mutable fields is a no-op:
    /// it returns the current row and must not snapshot.
    pub fn is_noop(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.template_id.is_none()
            && self.references_json.is_none()
            && self.references.is_none()
    }

    pub fn references(&self) -> Option<Vec<Reference>> {
        self.references_json
            .clone()
            .or_else(|| self.references.clone())
            .map(coerce_references)
    }

    /// Empty-string template ids clear the field, like explicit `null`.
    pub fn template_id(&self) -> Option<Option<String>> {
        self.template_id
            .clone()
            .map(|t| t.filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub share_token: String,
    pub share_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clamp_title_truncates_to_500_chars() {
        let long = "t".repeat(600);
        assert_eq!(clamp_title(&long).len(), 500);
        assert_eq!(clamp_title("short"), "short");
    }

    #[test]
    fn update_with_no_recognized_field_is_noop() {
        let u: UpdateArticle = serde_json::from_value(json!({})).unwrap();
        assert!(u.is_noop());
        let u: UpdateArticle = serde_json::from_value(json!({"unrelated": 1})).unwrap();
        assert!(u.is_noop());
        let u: UpdateArticle = serde_json::from_value(json!({"title": "x"})).unwrap();
        assert!(!u.is_noop());
    }

    #[test]
    fn template_id_distinguishes_null_from_absent() {
        let u: UpdateArticle = serde_json::from_value(json!({})).unwrap();
        assert_eq!(u.template_id(), None);
        let u: UpdateArticle = serde_json::from_value(json!({"template_id": null})).unwrap();
        assert_eq!(u.template_id(), Some(None));
        let u: UpdateArticle = serde_json::from_value(json!({"template_id": ""})).unwrap();
        assert_eq!(u.template_id(), Some(None));
        let u: UpdateArticle = serde_json::from_value(json!({"template_id": "t1"})).unwrap();
        assert_eq!(u.template_id(), Some(Some("t1".to_string())));
    }

    #[test]
    fn update_accepts_both_reference_keys() {
        let u: UpdateArticle =
            serde_json::from_value(json!({"references": [{"title": "a"}]})).unwrap();
        assert_eq!(u.references().unwrap().len(), 1);
        let u: UpdateArticle =
            serde_json::from_value(json!({"references_json": [{"title": "b"}]})).unwrap();
        assert_eq!(u.references().unwrap()[0].title, "b");
        let u: UpdateArticle = serde_json::from_value(json!({"references": "bogus"})).unwrap();
        assert_eq!(u.references(), Some(Vec::new()));
    }
}

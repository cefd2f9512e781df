//! Article version store: an append-only, capped history of an article's
//! mutable fields.
//!
//! Snapshots are taken inside the caller's transaction immediately before an
//! update mutates the live row, so the snapshot-count-prune sequence is
//! atomic with respect to concurrent updates of the same article.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{Article, ArticleVersion};

pub const MAX_VERSIONS_PER_ARTICLE: i64 = 100;

/// Capture the article's current title/content/references as a new version,
/// then prune the oldest entries beyond the cap. A missing article is a
/// no-op; the caller's update will discover the absence itself.
pub async fn snapshot_before_update(
    conn: &mut PgConnection,
    article_id: Uuid,
) -> Result<(), sqlx::Error> {
    let current = sqlx::query_as::<_, (String, String, serde_json::Value)>(
        "SELECT title, content, COALESCE(references_json, '[]'::jsonb) FROM articles WHERE id = $1",
    )
    .bind(article_id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some((title, content, references_json)) = current else {
        return Ok(());
    };

    sqlx::query(
        "INSERT INTO article_versions (article_id, title, content, references_json)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(article_id)
    .bind(title)
    .bind(content)
    .bind(references_json)
    .execute(&mut *conn)
    .await?;

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM article_versions WHERE article_id = $1")
            .bind(article_id)
            .fetch_one(&mut *conn)
            .await?;
    if count > MAX_VERSIONS_PER_ARTICLE {
        sqlx::query(
            "DELETE FROM article_versions
             WHERE article_id = $1 AND id NOT IN (
                 SELECT id FROM article_versions WHERE article_id = $1
                 ORDER BY created_at DESC LIMIT $2
             )",
        )
        .bind(article_id)
        .bind(MAX_VERSIONS_PER_ARTICLE)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Versions newest-first.
pub async fn fetch_versions(
    pool: &PgPool,
    article_id: Uuid,
    limit: i64,
) -> Result<Vec<ArticleVersion>, sqlx::Error> {
    sqlx::query_as::<_, ArticleVersion>(
        "SELECT id, article_id, title, content,
                COALESCE(references_json, '[]'::jsonb) AS references_json, created_at
         FROM article_versions WHERE article_id = $1
         ORDER BY created_at DESC LIMIT $2",
    )
    .bind(article_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn count_versions(pool: &PgPool, article_id: Uuid) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM article_versions WHERE article_id = $1")
            .bind(article_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// A single version, required to belong to the given article.
pub async fn fetch_version(
    pool: &PgPool,
    article_id: Uuid,
    version_id: Uuid,
) -> Result<Option<ArticleVersion>, sqlx::Error> {
    sqlx::query_as::<_, ArticleVersion>(
        "SELECT id, article_id, title, content,
                COALESCE(references_json, '[]'::jsonb) AS references_json, created_at
         FROM article_versions WHERE id = $1 AND article_id = $2 LIMIT 1",
    )
    .bind(version_id)
    .bind(article_id)
    .fetch_optional(pool)
    .await
}

/// Copy a version's fields back onto the live article, refreshing its
/// updated-timestamp. Deliberately does not snapshot the pre-restore state.
pub async fn apply_version(
    pool: &PgPool,
    version: &ArticleVersion,
) -> Result<Option<Article>, sqlx::Error> {
    sqlx::query_as::<_, Article>(
        "UPDATE articles
         SET title = $1, content = $2, references_json = $3, updated_at = now()
         WHERE id = $4
         RETURNING id, user_id, project_id, title, content, template_id,
                   COALESCE(references_json, '[]'::jsonb) AS references_json,
                   share_token, created_at, updated_at",
    )
    .bind(&version.title)
    .bind(&version.content)
    .bind(&version.references_json)
    .bind(version.article_id)
    .fetch_optional(pool)
    .await
}

/// Returns false when the version is absent or belongs to another article.
pub async fn delete_version(
    pool: &PgPool,
    article_id: Uuid,
    version_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM article_versions WHERE id = $1 AND article_id = $2")
        .bind(version_id)
        .bind(article_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete every version except the single most recently created one.
pub async fn clear_versions_except_latest(
    pool: &PgPool,
    article_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM article_versions
         WHERE article_id = $1 AND id NOT IN (
             SELECT id FROM article_versions WHERE article_id = $1
             ORDER BY created_at DESC LIMIT 1
         )",
    )
    .bind(article_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

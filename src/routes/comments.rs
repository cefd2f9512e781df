use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::is_article_owner;
use crate::auth::{ensure_user_exists, extract_current_user};
use crate::error::{ApiError, ApiResult};
use crate::models::{Comment, CommentListResponse, CreateComment};

/// Comments are an owner-only surface: only the article owner sees or posts
/// them. Deletion additionally allows the comment's own author.
pub fn comments_routes() -> Router<PgPool> {
    Router::new()
        .route("/{id}/comments", get(list_comments).post(create_comment))
        .route("/{id}/comments/{cid}", delete(delete_comment))
}

async fn list_comments(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path(article_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    if !is_article_owner(&pool, article_id, user.id).await? {
        return Err(ApiError::NotFound(
            "No permission to view comments on this article".to_string(),
        ));
    }
    let comments = sqlx::query_as::<_, Comment>(
        "SELECT id, article_id, user_id, author_display, content, parent_id, created_at
         FROM article_comments WHERE article_id = $1 ORDER BY created_at ASC",
    )
    .bind(article_id)
    .fetch_all(&pool)
    .await?;
    Ok(Json(CommentListResponse { comments }))
}

async fn create_comment(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path(article_id): Path<Uuid>,
    Json(input): Json<CreateComment>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    if !is_article_owner(&pool, article_id, user.id).await? {
        return Err(ApiError::NotFound(
            "No permission to comment on this article".to_string(),
        ));
    }
    let content = input.content.as_deref().unwrap_or("").trim().to_string();
    if content.is_empty() {
        return Err(ApiError::Validation(
            "Comment content cannot be empty".to_string(),
        ));
    }
    ensure_user_exists(&pool, &user).await?;

    let parent_id = input
        .parent_id
        .as_deref()
        .and_then(|s| s.trim().parse::<Uuid>().ok());
    let comment_id = input
        .id
        .as_deref()
        .and_then(|s| s.trim().parse::<Uuid>().ok());
    let author_display = user.display_label();

    let comment = match comment_id {
        Some(id) => {
            sqlx::query_as::<_, Comment>(
                "INSERT INTO article_comments (id, article_id, user_id, author_display, content, parent_id)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING id, article_id, user_id, author_display, content, parent_id, created_at",
            )
            .bind(id)
            .bind(article_id)
            .bind(user.id)
            .bind(author_display)
            .bind(content)
            .bind(parent_id)
            .fetch_one(&pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Comment>(
                "INSERT INTO article_comments (article_id, user_id, author_display, content, parent_id)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id, article_id, user_id, author_display, content, parent_id, created_at",
            )
            .bind(article_id)
            .bind(user.id)
            .bind(author_display)
            .bind(content)
            .bind(parent_id)
            .fetch_one(&pool)
            .await?
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"comment": comment})),
    ))
}

/// Deleting a parent leaves its replies in storage; orphaned replies are a
/// client rendering concern, not a cascade.
async fn delete_comment(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path((article_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    let is_owner = is_article_owner(&pool, article_id, user.id).await?;

    let comment = sqlx::query_as::<_, (Uuid, Uuid)>(
        "SELECT id, user_id FROM article_comments WHERE id = $1 AND article_id = $2 LIMIT 1",
    )
    .bind(comment_id)
    .bind(article_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    let is_comment_author = comment.1 == user.id;
    if !is_owner && !is_comment_author {
        return Err(ApiError::Forbidden(
            "Only the article owner or comment author can delete".to_string(),
        ));
    }

    sqlx::query("DELETE FROM article_comments WHERE id = $1 AND article_id = $2")
        .bind(comment_id)
        .bind(article_id)
        .execute(&pool)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::{AccessMode, can_access_article, is_article_owner};
use crate::auth::extract_current_user;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ArticleResponse, ListVersionsQuery, PageMeta, VersionListResponse, VersionResponse,
};
use crate::versioning;

/// Version history is owner-only except restore, which follows write access
/// like a normal update.
pub fn versions_routes() -> Router<PgPool> {
    Router::new()
        .route("/{id}/versions", get(list_versions))
        .route("/{id}/versions/clear", post(clear_versions))
        .route(
            "/{id}/versions/{vid}",
            get(get_version).delete(delete_version),
        )
        .route("/{id}/versions/{vid}/restore", post(restore_version))
}

async fn list_versions(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path(article_id): Path<Uuid>,
    Query(query): Query<ListVersionsQuery>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    if !is_article_owner(&pool, article_id, user.id).await? {
        return Err(ApiError::NotFound(
            "No permission to view this article".to_string(),
        ));
    }
    let limit = query.limit.unwrap_or(50).clamp(0, 100);
    let versions = versioning::fetch_versions(&pool, article_id, limit).await?;
    let total = versioning::count_versions(&pool, article_id).await?;
    Ok(Json(VersionListResponse {
        versions: versions.into_iter().map(VersionResponse::from).collect(),
        page: PageMeta {
            limit,
            offset: 0,
            total,
        },
    }))
}

async fn get_version(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path((article_id, version_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    if !is_article_owner(&pool, article_id, user.id).await? {
        return Err(ApiError::NotFound(
            "No permission to view this article".to_string(),
        ));
    }
    let version = versioning::fetch_version(&pool, article_id, version_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Version not found".to_string()))?;
    Ok(Json(
        serde_json::json!({"version": VersionResponse::from(version)}),
    ))
}

async fn restore_version(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path((article_id, version_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    let allowed = can_access_article(
        &pool,
        user.id,
        user.email.as_deref(),
        article_id,
        AccessMode::Write,
    )
    .await?;
    if !allowed {
        return Err(ApiError::NotFound(
            "No permission to edit this article".to_string(),
        ));
    }
    let version = versioning::fetch_version(&pool, article_id, version_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Version not found".to_string()))?;
    let article = versioning::apply_version(&pool, &version)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;
    Ok(Json(
        serde_json::json!({"article": ArticleResponse::from_row(article, false)}),
    ))
}

async fn delete_version(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path((article_id, version_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    if !is_article_owner(&pool, article_id, user.id).await? {
        return Err(ApiError::NotFound(
            "No permission to delete this article version".to_string(),
        ));
    }
    if !versioning::delete_version(&pool, article_id, version_id).await? {
        return Err(ApiError::NotFound("Version not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_versions(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path(article_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    if !is_article_owner(&pool, article_id, user.id).await? {
        return Err(ApiError::NotFound(
            "No permission to clear this article history".to_string(),
        ));
    }
    versioning::clear_versions_except_latest(&pool, article_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

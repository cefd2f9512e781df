use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};
use crate::models::{Article, ArticleResponse, UpdateArticle};
use crate::routes::articles::{ARTICLE_COLUMNS, build_article_update};

/// Share-link endpoints. The token is the whole authorization: no actor is
/// resolved, and possession grants the owner's read/write powers over the
/// article content (but not its history or comments).
pub fn shared_routes() -> Router<PgPool> {
    Router::new().route(
        "/shared/{token}",
        get(get_shared_article).patch(update_shared_article),
    )
}

async fn fetch_article_by_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<Article>, sqlx::Error> {
    let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE share_token = $1 LIMIT 1");
    sqlx::query_as::<_, Article>(&sql)
        .bind(token)
        .fetch_optional(pool)
        .await
}

async fn get_shared_article(
    State(pool): State<PgPool>,
    Path(token): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::Validation("Missing share token".to_string()));
    }
    let article = fetch_article_by_token(&pool, token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Share link invalid or expired".to_string()))?;
    Ok(Json(
        serde_json::json!({"article": ArticleResponse::from_row(article, true)}),
    ))
}

/// Token-authenticated edits deliberately skip the version snapshot: share
/// link edits are untracked.
async fn update_shared_article(
    State(pool): State<PgPool>,
    Path(token): Path<String>,
    Json(input): Json<UpdateArticle>,
) -> ApiResult<impl IntoResponse> {
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(ApiError::Validation("Missing share token".to_string()));
    }

    if input.is_noop() {
        let article = fetch_article_by_token(&pool, &token)
            .await?
            .ok_or_else(|| ApiError::NotFound("Share link invalid or expired".to_string()))?;
        return Ok(Json(
            serde_json::json!({"article": ArticleResponse::from_row(article, false)}),
        ));
    }

    let mut qb = build_article_update(&input);
    qb.push(" WHERE share_token = ");
    qb.push_bind(token);
    qb.push(format!(" RETURNING {ARTICLE_COLUMNS}"));
    let article = qb
        .build_query_as::<Article>()
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Share link invalid or expired".to_string()))?;

    Ok(Json(
        serde_json::json!({"article": ArticleResponse::from_row(article, false)}),
    ))
}

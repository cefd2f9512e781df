use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use rand::Rng;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::access::{AccessMode, can_access_article, fetch_project_team};
use crate::auth::{ensure_user_exists, extract_current_user};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Article, ArticleListResponse, ArticleResponse, CreateArticle, ListArticlesQuery, PageMeta,
    ShareResponse, UpdateArticle, clamp_title,
};
use crate::versioning::snapshot_before_update;

pub(crate) const ARTICLE_COLUMNS: &str = "id, user_id, project_id, title, content, template_id, \
     COALESCE(references_json, '[]'::jsonb) AS references_json, share_token, created_at, updated_at";

pub fn articles_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_articles).post(create_article))
        .route(
            "/{id}",
            get(get_article).patch(update_article).delete(delete_article),
        )
        .route(
            "/{id}/share",
            post(mint_share_token).delete(revoke_share_token),
        )
}

pub(crate) async fn fetch_article(
    pool: &PgPool,
    article_id: Uuid,
) -> Result<Option<Article>, sqlx::Error> {
    let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1 LIMIT 1");
    sqlx::query_as::<_, Article>(&sql)
        .bind(article_id)
        .fetch_optional(pool)
        .await
}

/// Append the recognized mutable fields of a PATCH body as `SET` clauses.
/// The caller adds the `WHERE` and `RETURNING` tail.
pub(crate) fn build_article_update(input: &UpdateArticle) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE articles SET ");
    let mut fields = qb.separated(", ");
    if let Some(title) = &input.title {
        fields.push("title = ");
        fields.push_bind_unseparated(clamp_title(title));
    }
    if let Some(content) = &input.content {
        fields.push("content = ");
        fields.push_bind_unseparated(content.clone());
    }
    if let Some(template_id) = input.template_id() {
        fields.push("template_id = ");
        fields.push_bind_unseparated(template_id);
    }
    if let Some(references) = input.references() {
        fields.push("references_json = ");
        fields.push_bind_unseparated(
            serde_json::to_value(references).unwrap_or(serde_json::Value::Array(Vec::new())),
        );
    }
    fields.push("updated_at = now()");
    qb
}

fn parse_optional_uuid(raw: Option<&str>) -> Option<Uuid> {
    raw.and_then(|s| s.trim().parse::<Uuid>().ok())
}

async fn list_articles(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Query(query): Query<ListArticlesQuery>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    let limit = query.limit.unwrap_or(50).clamp(0, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let empty_page = |limit, offset| {
        Json(ArticleListResponse {
            articles: Vec::new(),
            page: PageMeta {
                limit,
                offset,
                total: 0,
            },
        })
    };

    // Project-scoped listing shows the project owner's articles to every
    // member of the team; unknown projects and outsiders get an empty page.
    let scope = match parse_optional_uuid(query.project_id.as_deref()) {
        Some(project_id) => {
            let Some(team) = fetch_project_team(&pool, project_id).await? else {
                return Ok(empty_page(limit, offset).into_response());
            };
            let is_owner = team.user_id == user.id;
            let is_member = user
                .email
                .as_deref()
                .is_some_and(|email| team.has_member(email));
            if !is_owner && !is_member {
                return Ok(empty_page(limit, offset).into_response());
            }
            let author_id = if is_owner { user.id } else { team.user_id };
            Some((author_id, project_id))
        }
        None => None,
    };

    let (articles, total) = match scope {
        Some((author_id, project_id)) => {
            let sql = format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles
                 WHERE user_id = $1 AND project_id = $2
                 ORDER BY updated_at DESC NULLS LAST, created_at DESC
                 LIMIT $3 OFFSET $4"
            );
            let rows = sqlx::query_as::<_, Article>(&sql)
                .bind(author_id)
                .bind(project_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&pool)
                .await?;
            let (total,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM articles WHERE user_id = $1 AND project_id = $2",
            )
            .bind(author_id)
            .bind(project_id)
            .fetch_one(&pool)
            .await?;
            (rows, total)
        }
        None => {
            let sql = format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles
                 WHERE user_id = $1
                 ORDER BY updated_at DESC NULLS LAST, created_at DESC
                 LIMIT $2 OFFSET $3"
            );
            let rows = sqlx::query_as::<_, Article>(&sql)
                .bind(user.id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&pool)
                .await?;
            let (total,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM articles WHERE user_id = $1")
                    .bind(user.id)
                    .fetch_one(&pool)
                    .await?;
            (rows, total)
        }
    };

    let articles = articles
        .into_iter()
        .map(|a| ArticleResponse::from_row(a, false))
        .collect();
    Ok(Json(ArticleListResponse {
        articles,
        page: PageMeta {
            limit,
            offset,
            total,
        },
    })
    .into_response())
}

async fn get_article(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path(article_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    let allowed = can_access_article(
        &pool,
        user.id,
        user.email.as_deref(),
        article_id,
        AccessMode::Read,
    )
    .await?;
    if !allowed {
        return Err(ApiError::NotFound("Article not found".to_string()));
    }
    let article = fetch_article(&pool, article_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;
    Ok(Json(
        serde_json::json!({"article": ArticleResponse::from_row(article, true)}),
    ))
}

async fn create_article(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Json(input): Json<CreateArticle>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    ensure_user_exists(&pool, &user).await?;

    let title = clamp_title(input.title.as_deref().unwrap_or("Untitled document"));
    let content = input.content.clone().unwrap_or_default();
    let template_id = input.template_id.clone().filter(|t| !t.is_empty());
    let project_id = parse_optional_uuid(input.project_id.as_deref());
    let references = serde_json::to_value(input.references())
        .unwrap_or(serde_json::Value::Array(Vec::new()));

    let sql = format!(
        "INSERT INTO articles (user_id, project_id, title, content, template_id, references_json)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {ARTICLE_COLUMNS}"
    );
    let article = sqlx::query_as::<_, Article>(&sql)
        .bind(user.id)
        .bind(project_id)
        .bind(title)
        .bind(content)
        .bind(template_id)
        .bind(references)
        .fetch_one(&pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"article": ArticleResponse::from_row(article, false)})),
    ))
}

async fn update_article(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path(article_id): Path<Uuid>,
    Json(input): Json<UpdateArticle>,
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
        return Err(ApiError::NotFound("Article not found".to_string()));
    }

    // A body with no recognized field returns the current state and must not
    // leave a version snapshot behind.
    if input.is_noop() {
        let article = fetch_article(&pool, article_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;
        return Ok(Json(
            serde_json::json!({"article": ArticleResponse::from_row(article, false)}),
        ));
    }

    let mut tx = pool.begin().await?;
    snapshot_before_update(&mut *tx, article_id).await?;

    let mut qb = build_article_update(&input);
    qb.push(" WHERE id = ");
    qb.push_bind(article_id);
    qb.push(format!(" RETURNING {ARTICLE_COLUMNS}"));
    let article = qb
        .build_query_as::<Article>()
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;
    tx.commit().await?;

    Ok(Json(
        serde_json::json!({"article": ArticleResponse::from_row(article, false)}),
    ))
}

async fn delete_article(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path(article_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    let result = sqlx::query("DELETE FROM articles WHERE id = $1 AND user_id = $2")
        .bind(article_id)
        .bind(user.id)
        .execute(&pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Article not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn generate_share_token() -> String {
    const HEX_CHARSET: &[u8] = b"0123456789abcdef";
    let mut rng = rand::rng();
    (0..32)
        .map(|_| HEX_CHARSET[rng.random_range(0..HEX_CHARSET.len())] as char)
        .collect()
}

fn share_base_url() -> String {
    std::env::var("WRITIUM_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "http://localhost:3002".to_string())
        .trim_end_matches('/')
        .to_string()
}

async fn mint_share_token(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path(article_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    let token = generate_share_token();
    let updated = sqlx::query(
        "UPDATE articles SET share_token = $1 WHERE id = $2 AND user_id = $3 RETURNING id",
    )
    .bind(&token)
    .bind(article_id)
    .bind(user.id)
    .fetch_optional(&pool)
    .await?;
    if updated.is_none() {
        return Err(ApiError::NotFound("Article not found".to_string()));
    }
    let share_url = format!("{}?share={}", share_base_url(), token);
    Ok(Json(ShareResponse {
        share_token: token,
        share_url,
    }))
}

async fn revoke_share_token(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Path(article_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    sqlx::query("UPDATE articles SET share_token = NULL WHERE id = $1 AND user_id = $2")
        .bind(article_id)
        .bind(user.id)
        .execute(&pool)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_tokens_are_32_lowercase_hex_chars() {
        for _ in 0..20 {
            let token = generate_share_token();
            assert_eq!(token.len(), 32);
            assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn update_builder_sets_only_provided_fields() {
        let input: UpdateArticle =
            serde_json::from_value(serde_json::json!({"title": "X"})).unwrap();
        let sql = build_article_update(&input).into_sql();
        assert!(sql.contains("title = $1"));
        assert!(sql.contains("updated_at = now()"));
        assert!(!sql.contains("content ="));
        assert!(!sql.contains("references_json ="));
        assert!(!sql.contains("template_id ="));

        let input: UpdateArticle =
            serde_json::from_value(serde_json::json!({"content": "c", "references": []})).unwrap();
        let sql = build_article_update(&input).into_sql();
        assert!(sql.contains("content = $1"));
        assert!(sql.contains("references_json = $2"));
        assert!(!sql.contains("title ="));
    }

    #[test]
    fn optional_uuid_parsing_tolerates_garbage() {
        assert!(parse_optional_uuid(Some("nope")).is_none());
        assert!(parse_optional_uuid(None).is_none());
        let id = Uuid::new_v4();
        assert_eq!(parse_optional_uuid(Some(&format!(" {id} "))), Some(id));
    }
}

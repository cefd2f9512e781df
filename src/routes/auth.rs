use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{extract_current_user, generate_token};
use crate::error::{ApiError, ApiResult};
use crate::models::{CurrentUser, LoginRequest, LoginResponse, UserResponse};

pub fn auth_routes() -> Router<PgPool> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(get_me))
        .route("/logout", post(logout))
}

/// Standalone login: email only, no password. Unknown addresses are
/// provisioned on the spot with the address's local part as display name.
async fn login(
    State(pool): State<PgPool>,
    Json(input): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = input.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::Validation("Please enter email".to_string()));
    }

    let existing = sqlx::query_as::<_, (Uuid, Option<String>)>(
        "SELECT id, display_name FROM users WHERE email = $1 LIMIT 1",
    )
    .bind(&email)
    .fetch_optional(&pool)
    .await?;

    let (user_id, display_name) = match existing {
        Some((id, name)) => (id, name),
        None => {
            let fallback = email.split('@').next().filter(|s| !s.is_empty()).unwrap_or("User");
            let (id,): (Uuid,) = sqlx::query_as(
                "INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id",
            )
            .bind(&email)
            .bind(fallback)
            .fetch_one(&pool)
            .await?;
            (id, Some(fallback.to_string()))
        }
    };

    let name = display_name.unwrap_or_else(|| email.clone());
    let user = CurrentUser {
        id: user_id,
        email: Some(email.clone()),
        name: Some(name.clone()),
    };
    let access_token = generate_token(&user)?;

    Ok(Json(LoginResponse {
        user: UserResponse {
            id: user_id,
            email,
            name,
        },
        access_token,
        token_type: "bearer".to_string(),
    }))
}

async fn get_me(headers: HeaderMap) -> ApiResult<impl IntoResponse> {
    let user = extract_current_user(&headers)?;
    Ok(Json(serde_json::json!({
        "user": UserResponse {
            id: user.id,
            email: user.email.unwrap_or_default(),
            name: user.name.unwrap_or_default(),
        }
    })))
}

async fn logout() -> impl IntoResponse {
    Json(serde_json::json!({"ok": true}))
}

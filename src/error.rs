use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Request-level error taxonomy.
///
/// Permission and existence failures on articles and their sub-resources are
/// both reported as `NotFound` so callers cannot probe which articles exist.
/// Implements [`IntoResponse`] to produce the `{error, message?}` JSON bodies
/// the API speaks.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No resolvable actor on an endpoint that requires one.
    #[error("{0}")]
    Unauthenticated(String),

    /// Actor is known but lacks permission.
    #[error("{0}")]
    Forbidden(String),

    /// Entity absent or inaccessible.
    #[error("{0}")]
    NotFound(String),

    /// Malformed id or empty required field.
    #[error("{0}")]
    Validation(String),

    /// A storage error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other unexpected failure.
    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated("Not logged in".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, json!({"error": msg}))
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({"error": msg})),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({"error": msg})),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({"error": msg})),
            ApiError::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal Server Error", "message": db_error_message(err)}),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal Server Error", "message": msg}),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Translate storage connectivity failures to operator-actionable messages
/// instead of raw driver errors.
pub fn db_error_message(err: &sqlx::Error) -> String {
    if let sqlx::Error::Database(db_err) = err {
        match db_err.code().as_deref() {
            Some("28P01") => {
                return "Database connection failed: check user and password in .env (DATABASE_URL)."
                    .to_string();
            }
            Some("3D000") => {
                return "Database does not exist: create the writium database and rerun (the server applies the schema on startup)."
                    .to_string();
            }
            _ => {}
        }
    }
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_taxonomy() {
        assert_eq!(
            ApiError::unauthenticated().into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("no".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Validation("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unknown_db_errors_pass_through_their_message() {
        let err = sqlx::Error::PoolTimedOut;
        assert_eq!(db_error_message(&err), err.to_string());
    }
}

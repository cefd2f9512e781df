use axum::{
    Json, Router,
    http::header,
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use sqlx::PgPool;
use tokio::task;

use crate::docx::html_to_docx;
use crate::error::{ApiError, ApiResult};

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub fn export_routes() -> Router<PgPool> {
    Router::new().route("/export-docx", post(export_docx))
}

#[derive(Debug, Deserialize)]
struct ExportDocxRequest {
    #[serde(default)]
    html: String,
}

/// HTML to DOCX download. No login required.
async fn export_docx(Json(input): Json<ExportDocxRequest>) -> ApiResult<impl IntoResponse> {
    let html = input.html.trim().to_string();
    if html.is_empty() {
        return Err(ApiError::Validation("Missing HTML content".to_string()));
    }

    let bytes = task::spawn_blocking(move || html_to_docx(&html))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"document.docx\"",
            ),
        ],
        bytes,
    ))
}

//! HTTP surface.
//!
//! | Route | Method | Response |
//! |-------|--------|----------|
//! | `/` | GET | liveness text |
//! | `/generate_catalog` | POST | per-file results for multipart field `images` |
//! | `/entries` | GET | every stored record |
//! | `/export_pdf` | GET | `catalog.pdf` attachment |
//!
//! Handler failures become [`ApiError`], which renders `{"error": "..."}`.
//! Internal details are logged and replaced by a generic message.

use crate::catalog::CatalogBuilder;
use crate::error::CatalogError;
use crate::export;
use crate::pipeline::upload::Upload;
use crate::record::{CatalogRecord, ItemResult};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};

pub const LIVENESS_TEXT: &str = "Product catalog API running";
pub const NO_IMAGES: &str = "No images provided";
/// Multipart field carrying the uploaded files.
pub const IMAGES_FIELD: &str = "images";

/// State shared by all routes.
#[derive(Clone)]
pub struct AppState {
    pub builder: CatalogBuilder,
}

impl AppState {
    pub fn new(builder: CatalogBuilder) -> Self {
        Self { builder }
    }
}

/// HTTP-boundary error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Internal server error")]
    Internal(String),
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(e.body_text())
        } else {
            ApiError::BadRequest(format!("Failed to read multipart body: {}", e.body_text()))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.builder.config().max_upload_bytes;

    Router::new()
        .route("/", get(home))
        .route("/generate_catalog", post(generate_catalog))
        .route("/entries", get(list_entries))
        .route("/export_pdf", get(export_catalog_pdf))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn home() -> &'static str {
    LIVENESS_TEXT
}

/// POST /generate_catalog
async fn generate_catalog(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<ItemResult>>, ApiError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGES_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            debug!("Ignoring '{}' field without a file", IMAGES_FIELD);
            continue;
        };
        let bytes = field.bytes().await?;
        uploads.push(Upload::new(filename, bytes.to_vec()));
    }

    if uploads.is_empty() {
        return Err(ApiError::BadRequest(NO_IMAGES.to_string()));
    }

    info!("Received {} images", uploads.len());
    Ok(Json(state.builder.process_batch(uploads).await))
}

/// GET /entries
async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<CatalogRecord>>, ApiError> {
    Ok(Json(state.builder.store().find_all().await?))
}

/// GET /export_pdf
async fn export_catalog_pdf(State(state): State<AppState>) -> Result<Response, ApiError> {
    let geometry = state.builder.config().page;
    let bytes = export::export_pdf(state.builder.store().as_ref(), &geometry).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"catalog.pdf\""),
        ],
        bytes,
    )
        .into_response())
}

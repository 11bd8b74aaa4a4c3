use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::common::success_response;
use super::AppState;
use crate::errors::ServiceError;
use crate::services::imports::spreadsheet::parse_spreadsheet;
use crate::services::imports::{ImportItem, ImportSource};

#[derive(Debug, Deserialize)]
pub struct InvoicePreviewRequest {
    pub image_base64: String,
    pub mime: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplyImportRequest {
    pub source: ImportSource,
    pub items: Vec<ImportItem>,
}

#[derive(Debug, Serialize)]
pub struct ApplyImportResponse {
    pub applied: usize,
}

/// Parses an uploaded CSV into reviewable lines. The raw file is the request
/// body; parse problems come back inside the preview, not as an error status.
async fn preview_spreadsheet(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    if body.len() > state.max_upload_bytes {
        return Err(ServiceError::InvalidInput(
            "Uploaded file is too large".to_string(),
        ));
    }
    Ok(success_response(parse_spreadsheet(&body)))
}

/// Runs the vision extractor over an invoice image. Extraction failures come
/// back inside the preview.
async fn preview_invoice(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InvoicePreviewRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let image = BASE64.decode(payload.image_base64.as_bytes()).map_err(|_| {
        ServiceError::InvalidInput("Invoice image is not valid base64".to_string())
    })?;
    let preview = state.vision.extract_items(&image, &payload.mime).await;
    Ok(success_response(preview))
}

/// Applies a reviewed batch of import lines to the stock ledger.
async fn apply_import(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ApplyImportRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let applied = state
        .services
        .inventory
        .apply_import_items(payload.source, payload.items)
        .await?;
    Ok(success_response(ApplyImportResponse { applied }))
}

pub fn import_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/spreadsheet/preview", post(preview_spreadsheet))
        .route("/invoice/preview", post(preview_invoice))
        .route("/apply", post(apply_import))
}

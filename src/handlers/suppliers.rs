use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use super::AppState;
use crate::errors::ServiceError;
use crate::services::suppliers::{CreateSupplier, InvoiceImage, InvoiceLine, LogInvoice};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub contact_person: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceLineRequest {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_cost: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct LogInvoiceRequest {
    pub invoice_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub number_of_payments: i32,
    /// Scanned invoice, base64 encoded; requires `image_mime` alongside.
    pub image_base64: Option<String>,
    pub image_mime: Option<String>,
    #[serde(default)]
    pub items: Vec<InvoiceLineRequest>,
}

async fn create_supplier(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let supplier = state
        .services
        .suppliers
        .create_supplier(CreateSupplier {
            name: payload.name,
            contact_person: payload.contact_person,
            phone: payload.phone,
        })
        .await?;
    Ok(created_response(supplier))
}

async fn list_suppliers(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(state.services.suppliers.list_suppliers().await?))
}

async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(
        state.services.suppliers.get_supplier(supplier_id).await?,
    ))
}

async fn list_invoices(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(
        state.services.suppliers.list_invoices(supplier_id).await?,
    ))
}

async fn log_invoice(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<LogInvoiceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let image = match (payload.image_base64, payload.image_mime) {
        (Some(encoded), Some(mime)) => {
            let bytes = BASE64.decode(encoded.as_bytes()).map_err(|_| {
                ServiceError::InvalidInput("Invoice image is not valid base64".to_string())
            })?;
            Some(InvoiceImage { bytes, mime })
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(ServiceError::InvalidInput(
                "Invoice images need both image_base64 and image_mime".to_string(),
            ));
        }
        (None, None) => None,
    };

    let invoice = state
        .services
        .suppliers
        .log_invoice(LogInvoice {
            supplier_id,
            invoice_date: payload.invoice_date,
            total_amount: payload.total_amount,
            number_of_payments: payload.number_of_payments,
            image,
            items: payload
                .items
                .into_iter()
                .map(|line| InvoiceLine {
                    product_id: line.product_id,
                    product_name: line.product_name,
                    quantity: line.quantity,
                    unit_cost: line.unit_cost,
                })
                .collect(),
        })
        .await?;
    Ok(created_response(invoice))
}

pub fn supplier_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_supplier))
        .route("/", get(list_suppliers))
        .route("/:id", get(get_supplier))
        .route("/:id/invoices", post(log_invoice))
        .route("/:id/invoices", get(list_invoices))
}

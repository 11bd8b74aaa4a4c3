use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use super::AppState;
use crate::errors::ServiceError;
use crate::queries::inventory_queries::{
    GetDeadStockQuery, GetProductQuery, GetProductTransactionsQuery, ListProductsQuery,
    DEAD_STOCK_WINDOW_DAYS,
};
use crate::queries::Query as _;
use crate::services::inventory::CreateProduct;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 100))]
    pub sku: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub department: Option<String>,
    pub model: Option<String>,
    pub size: Option<String>,
    pub barcode: Option<String>,
    pub supplier_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub max_stock: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub initial_stock: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StockMovementRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsParams {
    #[serde(default)]
    pub low_stock_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct TransactionParams {
    #[serde(default = "default_transaction_limit")]
    pub limit: u64,
}

fn default_transaction_limit() -> u64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct DeadStockParams {
    pub window_days: Option<i64>,
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let product = state
        .services
        .inventory
        .create_product(CreateProduct {
            sku: payload.sku,
            name: payload.name,
            department: payload.department,
            model: payload.model,
            size: payload.size,
            barcode: payload.barcode,
            supplier_id: payload.supplier_id,
            max_stock: payload.max_stock,
            initial_stock: payload.initial_stock,
        })
        .await?;

    Ok(created_response(GetProductQuery { product_id: product.id }
        .execute(&state.db)
        .await?))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProductsParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = ListProductsQuery {
        low_stock_only: params.low_stock_only,
    }
    .execute(&state.db)
    .await?;
    Ok(success_response(products))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = GetProductQuery { product_id }.execute(&state.db).await?;
    Ok(success_response(product))
}

async fn get_product_transactions(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Query(params): Query<TransactionParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let transactions = GetProductTransactionsQuery {
        product_id,
        limit: params.limit,
    }
    .execute(&state.db)
    .await?;
    Ok(success_response(transactions))
}

async fn receive_stock(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<StockMovementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    state
        .services
        .inventory
        .add_stock(product_id, payload.quantity)
        .await?;
    Ok(success_response(
        GetProductQuery { product_id }.execute(&state.db).await?,
    ))
}

async fn sell_stock(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<StockMovementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    state
        .services
        .inventory
        .record_sale(product_id, payload.quantity)
        .await?;
    Ok(success_response(
        GetProductQuery { product_id }.execute(&state.db).await?,
    ))
}

async fn dead_stock(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeadStockParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let entries = GetDeadStockQuery {
        now: Utc::now(),
        window_days: params.window_days.unwrap_or(DEAD_STOCK_WINDOW_DAYS),
    }
    .execute(&state.db)
    .await?;
    Ok(success_response(entries))
}

pub fn inventory_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_product))
        .route("/", get(list_products))
        .route("/dead-stock", get(dead_stock))
        .route("/:id", get(get_product))
        .route("/:id/transactions", get(get_product_transactions))
        .route("/:id/receive", post(receive_stock))
        .route("/:id/sell", post(sell_stock))
}

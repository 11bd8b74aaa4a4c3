use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use super::AppState;
use crate::errors::ServiceError;
use crate::queries::customer_queries::{
    GetBirthdayCustomersQuery, GetCustomerQuery, ListCustomersQuery,
};
use crate::queries::Query as _;
use crate::services::customers::CreateCustomer;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
    pub birth_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct RecordPurchaseRequest {
    pub amount: Decimal,
    pub at: Option<DateTime<Utc>>,
}

async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let customer = state
        .services
        .customers
        .create_customer(CreateCustomer {
            name: payload.name,
            phone: payload.phone,
            email: payload.email,
            birth_date: payload.birth_date,
        })
        .await?;
    Ok(created_response(customer))
}

/// Lists customers with their derived loyalty tier.
async fn list_customers(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(
        ListCustomersQuery { now: Utc::now() }.execute(&state.db).await?,
    ))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(
        GetCustomerQuery {
            customer_id,
            now: Utc::now(),
        }
        .execute(&state.db)
        .await?,
    ))
}

async fn record_purchase(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<RecordPurchaseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state
        .services
        .customers
        .record_purchase(customer_id, payload.amount, payload.at)
        .await?;
    Ok(success_response(customer))
}

/// Customers whose birthday falls on today's month and day.
async fn birthdays(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(
        GetBirthdayCustomersQuery { date: Utc::now() }
            .execute(&state.db)
            .await?,
    ))
}

pub fn customer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_customer))
        .route("/", get(list_customers))
        .route("/birthdays", get(birthdays))
        .route("/:id", get(get_customer))
        .route("/:id/purchases", post(record_purchase))
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
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
use crate::queries::employee_queries::{
    GetDailyTargetProgressQuery, GetEmployeeMonthlyStatsQuery, GetEmployeeQuery,
    ListEmployeesQuery,
};
use crate::queries::Query as _;
use crate::services::employees::CreateEmployee;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub employee_code: String,
    pub hourly_rate: Decimal,
    pub sales_target: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct LogSaleRequest {
    pub amount: Decimal,
    pub bonus_rate: Decimal,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct LogShiftRequest {
    pub hours: Decimal,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct SetDailyTargetRequest {
    pub date: DateTime<Utc>,
    pub target_amount: Decimal,
    pub bonus_reward: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct TargetProgressParams {
    pub date: Option<DateTime<Utc>>,
}

async fn create_employee(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let employee = state
        .services
        .employees
        .create_employee(CreateEmployee {
            name: payload.name,
            employee_code: payload.employee_code,
            hourly_rate: payload.hourly_rate,
            sales_target: payload.sales_target,
        })
        .await?;
    Ok(created_response(employee))
}

async fn list_employees(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(
        ListEmployeesQuery {}.execute(&state.db).await?,
    ))
}

async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(
        GetEmployeeQuery { employee_id }.execute(&state.db).await?,
    ))
}

async fn log_sale(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<LogSaleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let sale = state
        .services
        .employees
        .log_sale(employee_id, payload.amount, payload.bonus_rate, payload.date)
        .await?;
    Ok(created_response(sale))
}

async fn log_shift(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<LogShiftRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let shift = state
        .services
        .employees
        .log_shift(employee_id, payload.hours, payload.date)
        .await?;
    Ok(created_response(shift))
}

async fn monthly_stats(
    State(state): State<Arc<AppState>>,
    Path((employee_id, year, month)): Path<(Uuid, i32, u32)>,
) -> Result<impl IntoResponse, ServiceError> {
    let stats = GetEmployeeMonthlyStatsQuery {
        employee_id,
        year,
        month,
    }
    .execute(&state.db)
    .await?;
    Ok(success_response(stats))
}

async fn set_daily_target(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SetDailyTargetRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let target = state
        .services
        .employees
        .set_daily_target(payload.date, payload.target_amount, payload.bonus_reward)
        .await?;
    Ok(success_response(target))
}

async fn target_progress(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TargetProgressParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = GetDailyTargetProgressQuery {
        date: params.date.unwrap_or_else(Utc::now),
    }
    .execute(&state.db)
    .await?;
    Ok(success_response(report))
}

pub fn employee_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_employee))
        .route("/", get(list_employees))
        .route("/targets", post(set_daily_target))
        .route("/targets/progress", get(target_progress))
        .route("/:id", get(get_employee))
        .route("/:id/sales", post(log_sale))
        .route("/:id/shifts", post(log_shift))
        .route("/:id/stats/:year/:month", get(monthly_stats))
}

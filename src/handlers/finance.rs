use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::common::success_response;
use super::AppState;
use crate::errors::ServiceError;
use crate::queries::finance_queries::{
    GetCashFlowForecastQuery, GetPriceChangeAlertsQuery, GetUpcomingPaymentsQuery,
    UPCOMING_HORIZON_DAYS,
};
use crate::queries::Query as _;

#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
    pub horizon_days: Option<i64>,
}

/// Installments due within the horizon (default one week).
async fn upcoming_payments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UpcomingParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let payments = GetUpcomingPaymentsQuery {
        now: Utc::now(),
        horizon_days: params.horizon_days.unwrap_or(UPCOMING_HORIZON_DAYS),
    }
    .execute(&state.db)
    .await?;
    Ok(success_response(payments))
}

/// Monthly buckets of scheduled supplier payments, ascending.
async fn cash_flow_forecast(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(
        GetCashFlowForecastQuery {}.execute(&state.db).await?,
    ))
}

/// Products whose latest purchase cost rose against the previous one.
async fn price_change_alerts(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(
        GetPriceChangeAlertsQuery {}.execute(&state.db).await?,
    ))
}

pub fn finance_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments/upcoming", get(upcoming_payments))
        .route("/cash-flow", get(cash_flow_forecast))
        .route("/price-alerts", get(price_change_alerts))
}

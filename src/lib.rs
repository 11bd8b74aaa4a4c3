//! Retail Back-Office API Library
//!
//! Inventory ledger, staff performance, customer loyalty, supplier payment
//! scheduling and stock import pipelines behind one JSON API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod payment_schedule;
pub mod queries;
pub mod services;
pub mod stock_policy;

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};

pub use handlers::AppState;

/// All domain routers merged under one versioned prefix.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(api_status))
        .nest("/inventory", handlers::inventory_routes())
        .nest("/employees", handlers::employee_routes())
        .nest("/customers", handlers::customer_routes())
        .nest("/suppliers", handlers::supplier_routes())
        .nest("/finance", handlers::finance_routes())
        .nest("/imports", handlers::import_routes())
}

/// Complete application router with state applied.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
}

async fn api_status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "backoffice-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Json(json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::errors::ServiceError;

pub mod customer_queries;
pub mod employee_queries;
pub mod finance_queries;
pub mod inventory_queries;

/// Read-side command object. Mutations go through the service layer; anything
/// that only derives views from stored rows lives here.
#[async_trait]
pub trait Query: Send + Sync {
    type Result: Send + Sync;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError>;
}

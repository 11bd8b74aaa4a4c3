use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Query;
use crate::entities::inventory_transaction::{self, Entity as InventoryTransaction, TransactionType};
use crate::entities::product::{self, Entity as Product};
use crate::errors::ServiceError;
use crate::stock_policy::{self, StockStatus};

/// Default trailing window for dead-stock detection, in days.
pub const DEAD_STOCK_WINDOW_DAYS: i64 = 60;

/// Product row enriched with the derived stock signals shown in inventory
/// views. The boolean flag and the status tier are computed independently.
#[derive(Debug, Clone, Serialize)]
pub struct ProductStockView {
    #[serde(flatten)]
    pub product: product::Model,
    pub low_stock_threshold: i32,
    pub low_stock: bool,
    pub stock_ratio_percent: i32,
    pub status: StockStatus,
}

impl From<product::Model> for ProductStockView {
    fn from(product: product::Model) -> Self {
        let low_stock_threshold = stock_policy::low_stock_threshold(product.max_stock);
        let low_stock = stock_policy::is_low_stock(product.current_stock, product.max_stock);
        let stock_ratio_percent =
            stock_policy::stock_ratio_percent(product.current_stock, product.max_stock);
        let status = StockStatus::from_levels(product.current_stock, product.max_stock);
        ProductStockView {
            product,
            low_stock_threshold,
            low_stock,
            stock_ratio_percent,
            status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetProductQuery {
    pub product_id: Uuid,
}

#[async_trait]
impl Query for GetProductQuery {
    type Result = ProductStockView;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        Product::find_by_id(self.product_id)
            .one(db)
            .await?
            .map(ProductStockView::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", self.product_id)))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListProductsQuery {
    /// When set, only products currently below their low-stock threshold.
    pub low_stock_only: bool,
}

#[async_trait]
impl Query for ListProductsQuery {
    type Result = Vec<ProductStockView>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let products = Product::find()
            .order_by_asc(product::Column::Name)
            .all(db)
            .await?;

        // The threshold depends on each row's own capacity, so the low-stock
        // filter happens in process rather than in SQL.
        Ok(products
            .into_iter()
            .map(ProductStockView::from)
            .filter(|view| !self.low_stock_only || view.low_stock)
            .collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetProductTransactionsQuery {
    pub product_id: Uuid,
    pub limit: u64,
}

#[async_trait]
impl Query for GetProductTransactionsQuery {
    type Result = Vec<inventory_transaction::Model>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let exists = Product::find_by_id(self.product_id).one(db).await?.is_some();
        if !exists {
            return Err(ServiceError::NotFound(format!(
                "Product {} not found",
                self.product_id
            )));
        }

        Ok(InventoryTransaction::find()
            .filter(inventory_transaction::Column::ProductId.eq(self.product_id))
            .order_by_desc(inventory_transaction::Column::CreatedAt)
            .limit(self.limit)
            .all(db)
            .await?)
    }
}

/// Product with no outgoing stock movement inside the trailing window.
#[derive(Debug, Serialize)]
pub struct DeadStockEntry {
    #[serde(flatten)]
    pub product: product::Model,
    /// Most recent OUT movement, if the product ever sold at all.
    pub last_out_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetDeadStockQuery {
    pub now: DateTime<Utc>,
    pub window_days: i64,
}

impl GetDeadStockQuery {
    pub fn new(now: DateTime<Utc>) -> Self {
        GetDeadStockQuery {
            now,
            window_days: DEAD_STOCK_WINDOW_DAYS,
        }
    }
}

#[async_trait]
impl Query for GetDeadStockQuery {
    type Result = Vec<DeadStockEntry>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let cutoff = self.now - Duration::days(self.window_days);

        let last_out_rows: Vec<(Uuid, Option<DateTime<Utc>>)> = InventoryTransaction::find()
            .filter(inventory_transaction::Column::Type.eq(TransactionType::Out.as_str()))
            .select_only()
            .column(inventory_transaction::Column::ProductId)
            .column_as(inventory_transaction::Column::CreatedAt.max(), "last_out_at")
            .group_by(inventory_transaction::Column::ProductId)
            .into_tuple()
            .all(db)
            .await?;

        let last_out: HashMap<Uuid, DateTime<Utc>> = last_out_rows
            .into_iter()
            .filter_map(|(product_id, at)| at.map(|at| (product_id, at)))
            .collect();

        let products = Product::find()
            .order_by_asc(product::Column::Name)
            .all(db)
            .await?;

        Ok(products
            .into_iter()
            .filter_map(|product| {
                let last_out_at = last_out.get(&product.id).copied();
                match last_out_at {
                    Some(at) if at >= cutoff => None,
                    _ => Some(DeadStockEntry {
                        product,
                        last_out_at,
                    }),
                }
            })
            .collect())
    }
}

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionError, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::inventory_transaction::{self, TransactionType};
use crate::entities::product::{self, Entity as Product};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::imports::{ImportItem, ImportSource};
use crate::stock_policy;

const DEFAULT_DEPARTMENT: &str = "Unassigned";
const DEFAULT_MODEL: &str = "Unassigned";
const DEFAULT_SIZE: &str = "One size";

/// Floor for the generated shelf capacity of imported products.
const MIN_GENERATED_MAX_STOCK: i32 = 10;

/// Typed command for catalog creation. Optional descriptive fields fall back
/// to store defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub sku: String,
    pub name: String,
    pub department: Option<String>,
    pub model: Option<String>,
    pub size: Option<String>,
    pub barcode: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub max_stock: i32,
    pub initial_stock: i32,
}

pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a product and, when it starts with stock on hand, the opening
    /// IN transaction, atomically.
    #[instrument(skip(self, cmd), fields(sku = %cmd.sku))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<product::Model, ServiceError> {
        let sku = cmd.sku.trim().to_string();
        let name = cmd.name.trim().to_string();
        if sku.is_empty() || name.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Product name and SKU are required".to_string(),
            ));
        }
        if cmd.max_stock <= 0 {
            return Err(ServiceError::InvalidInput(
                "max_stock must be positive".to_string(),
            ));
        }
        if cmd.initial_stock < 0 {
            return Err(ServiceError::InvalidInput(
                "initial_stock cannot be negative".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let product = db
            .transaction::<_, product::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = Product::find()
                        .filter(product::Column::Sku.eq(sku.clone()))
                        .one(txn)
                        .await?;
                    if existing.is_some() {
                        return Err(ServiceError::InvalidInput(format!(
                            "A product with SKU {} already exists",
                            sku
                        )));
                    }

                    let product = product::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        sku: Set(sku),
                        name: Set(name),
                        department: Set(cmd
                            .department
                            .filter(|d| !d.trim().is_empty())
                            .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string())),
                        model: Set(cmd
                            .model
                            .filter(|m| !m.trim().is_empty())
                            .unwrap_or_else(|| DEFAULT_MODEL.to_string())),
                        size: Set(cmd
                            .size
                            .filter(|s| !s.trim().is_empty())
                            .unwrap_or_else(|| DEFAULT_SIZE.to_string())),
                        barcode: Set(cmd.barcode.filter(|b| !b.trim().is_empty())),
                        supplier_id: Set(cmd.supplier_id),
                        max_stock: Set(cmd.max_stock),
                        current_stock: Set(cmd.initial_stock),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    if cmd.initial_stock > 0 {
                        append_transaction(txn, product.id, cmd.initial_stock, TransactionType::In)
                            .await?;
                    }

                    Ok(product)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(product_id = %product.id, sku = %product.sku, "product created");
        self.event_sender
            .send(Event::ProductCreated {
                product_id: product.id,
                sku: product.sku.clone(),
                initial_stock: product.current_stock,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(product)
    }

    /// Receives stock: increments the counter and appends the IN row in one
    /// transaction.
    #[instrument(skip(self))]
    pub async fn add_stock(
        &self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<product::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "quantity must be positive".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let product = db
            .transaction::<_, product::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let product = Product::find_by_id(product_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Product {} not found", product_id))
                        })?;

                    let new_stock =
                        product.current_stock.checked_add(quantity).ok_or_else(|| {
                            ServiceError::InvalidInput(
                                "Stock level would overflow".to_string(),
                            )
                        })?;
                    let mut active: product::ActiveModel = product.into();
                    active.current_stock = Set(new_stock);
                    let product = active.update(txn).await?;

                    append_transaction(txn, product.id, quantity, TransactionType::In).await?;
                    Ok(product)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::StockReceived {
                product_id: product.id,
                quantity,
                new_stock: product.current_stock,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(product)
    }

    /// Records a sale. The stock check runs inside the transaction so two
    /// concurrent sales cannot both spend the same units.
    #[instrument(skip(self))]
    pub async fn record_sale(
        &self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<product::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "quantity must be positive".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let product = db
            .transaction::<_, product::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let product = Product::find_by_id(product_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Product {} not found", product_id))
                        })?;

                    if product.current_stock - quantity < 0 {
                        return Err(ServiceError::InsufficientStock(format!(
                            "Only {} units of {} in stock, {} requested",
                            product.current_stock, product.name, quantity
                        )));
                    }

                    let new_stock = product.current_stock - quantity;
                    let mut active: product::ActiveModel = product.into();
                    active.current_stock = Set(new_stock);
                    let product = active.update(txn).await?;

                    append_transaction(txn, product.id, quantity, TransactionType::Out).await?;
                    Ok(product)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        let low_stock = stock_policy::is_low_stock(product.current_stock, product.max_stock);
        self.event_sender
            .send(Event::SaleRecorded {
                product_id: product.id,
                quantity,
                new_stock: product.current_stock,
                low_stock,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(product)
    }

    /// Applies a reviewed import batch in a single transaction. Lines resolve
    /// to existing products by SKU first, then by name; unmatched lines create
    /// a product with a generated SKU. Returns the number of lines applied.
    #[instrument(skip(self, items), fields(source = source.as_str(), lines = items.len()))]
    pub async fn apply_import_items(
        &self,
        source: ImportSource,
        items: Vec<ImportItem>,
    ) -> Result<usize, ServiceError> {
        let items: Vec<ImportItem> = items
            .into_iter()
            .filter(ImportItem::is_applicable)
            .collect();
        if items.is_empty() {
            return Ok(0);
        }

        let batch_millis = Utc::now().timestamp_millis();
        let db = self.db_pool.as_ref();
        let applied = db
            .transaction::<_, usize, ServiceError>(move |txn| {
                Box::pin(async move {
                    let mut applied = 0;
                    for (index, item) in items.into_iter().enumerate() {
                        let quantity = item.quantity;
                        let sku = item
                            .sku
                            .as_deref()
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string);
                        let name = item.name.trim().to_string();

                        let mut product = match &sku {
                            Some(sku) => {
                                Product::find()
                                    .filter(product::Column::Sku.eq(sku.clone()))
                                    .one(txn)
                                    .await?
                            }
                            None => None,
                        };
                        if product.is_none() && !name.is_empty() {
                            product = Product::find()
                                .filter(product::Column::Name.eq(name.clone()))
                                .one(txn)
                                .await?;
                        }

                        let product = match product {
                            Some(existing) => {
                                let new_stock = existing
                                    .current_stock
                                    .checked_add(quantity)
                                    .ok_or_else(|| {
                                        ServiceError::InvalidInput(
                                            "Stock level would overflow".to_string(),
                                        )
                                    })?;
                                let current_max = existing.max_stock;
                                let mut active: product::ActiveModel = existing.into();
                                active.current_stock = Set(new_stock);
                                active.max_stock =
                                    Set(item.max_stock.filter(|m| *m > 0).unwrap_or(current_max));
                                if let Some(department) = item.department {
                                    active.department = Set(department);
                                }
                                if let Some(model) = item.model {
                                    active.model = Set(model);
                                }
                                if let Some(size) = item.size {
                                    active.size = Set(size);
                                }
                                if let Some(barcode) = item.barcode {
                                    active.barcode = Set(Some(barcode));
                                }
                                active.update(txn).await?
                            }
                            None => {
                                let sku = sku.unwrap_or_else(|| {
                                    format!("{}-{}-{}", source.sku_prefix(), batch_millis, index)
                                });
                                let max_stock = item
                                    .max_stock
                                    .filter(|m| *m > 0)
                                    .unwrap_or_else(|| {
                                        quantity.saturating_mul(5).max(MIN_GENERATED_MAX_STOCK)
                                    });
                                product::ActiveModel {
                                    id: Set(Uuid::new_v4()),
                                    sku: Set(sku.clone()),
                                    name: Set(if name.is_empty() { sku } else { name }),
                                    department: Set(item
                                        .department
                                        .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string())),
                                    model: Set(item
                                        .model
                                        .unwrap_or_else(|| DEFAULT_MODEL.to_string())),
                                    size: Set(item
                                        .size
                                        .unwrap_or_else(|| DEFAULT_SIZE.to_string())),
                                    barcode: Set(item.barcode),
                                    supplier_id: Set(None),
                                    max_stock: Set(max_stock),
                                    current_stock: Set(quantity),
                                    ..Default::default()
                                }
                                .insert(txn)
                                .await?
                            }
                        };

                        append_transaction(txn, product.id, quantity, TransactionType::In).await?;
                        applied += 1;
                    }
                    Ok(applied)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(source = source.as_str(), applied, "import batch applied");
        self.event_sender
            .send(Event::ImportApplied {
                source: source.as_str().to_string(),
                lines_applied: applied,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(applied)
    }
}

/// Appends one immutable ledger row. Always called inside the transaction
/// that mutates the product counter.
async fn append_transaction<C>(
    conn: &C,
    product_id: Uuid,
    quantity: i32,
    kind: TransactionType,
) -> Result<inventory_transaction::Model, ServiceError>
where
    C: sea_orm::ConnectionTrait,
{
    Ok(inventory_transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        quantity: Set(quantity),
        r#type: Set(kind.as_str().to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

pub(crate) fn unwrap_transaction_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::supplier::{self, Entity as Supplier};
use crate::entities::supplier_invoice::{self, Entity as SupplierInvoice};
use crate::entities::supplier_invoice_item;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::payment_schedule::{payment_schedule, serialize_payment_dates};
use crate::services::imports::ocr::SUPPORTED_IMAGE_TYPES;
use crate::services::inventory::unwrap_transaction_error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSupplier {
    pub name: String,
    pub contact_person: String,
    pub phone: String,
}

/// Scanned invoice image, stored inline as a base64 data URI.
#[derive(Debug, Clone)]
pub struct InvoiceImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_cost: Decimal,
}

pub struct LogInvoice {
    pub supplier_id: Uuid,
    pub invoice_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub number_of_payments: i32,
    pub image: Option<InvoiceImage>,
    pub items: Vec<InvoiceLine>,
}

pub struct SupplierService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    max_upload_bytes: usize,
}

impl SupplierService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            max_upload_bytes,
        }
    }

    #[instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create_supplier(
        &self,
        cmd: CreateSupplier,
    ) -> Result<supplier::Model, ServiceError> {
        let name = cmd.name.trim().to_string();
        let contact_person = cmd.contact_person.trim().to_string();
        let phone = cmd.phone.trim().to_string();
        if name.is_empty() || contact_person.is_empty() || phone.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Supplier name, contact person and phone are required".to_string(),
            ));
        }

        let supplier = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            contact_person: Set(contact_person),
            phone: Set(phone),
            ..Default::default()
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(supplier_id = %supplier.id, "supplier created");
        self.event_sender
            .send(Event::SupplierCreated {
                supplier_id: supplier.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(supplier)
    }

    /// Logs an invoice with its installment schedule and line items in one
    /// transaction. The schedule is derived here, once, and stored on the row.
    #[instrument(skip(self, cmd), fields(supplier_id = %cmd.supplier_id))]
    pub async fn log_invoice(
        &self,
        cmd: LogInvoice,
    ) -> Result<supplier_invoice::Model, ServiceError> {
        if cmd.total_amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Invoice total must be positive".to_string(),
            ));
        }
        if cmd.number_of_payments <= 0 {
            return Err(ServiceError::InvalidInput(
                "Number of payments must be positive".to_string(),
            ));
        }
        for line in &cmd.items {
            if line.product_name.trim().is_empty() {
                return Err(ServiceError::InvalidInput(
                    "Invoice line items need a product name".to_string(),
                ));
            }
            if line.quantity < 1 {
                return Err(ServiceError::InvalidInput(
                    "Invoice line quantities must be at least 1".to_string(),
                ));
            }
            if line.unit_cost <= Decimal::ZERO {
                return Err(ServiceError::InvalidInput(
                    "Invoice line unit costs must be positive".to_string(),
                ));
            }
        }

        let invoice_image = match cmd.image {
            Some(image) => Some(self.encode_image(image)?),
            None => None,
        };

        let schedule = payment_schedule(cmd.invoice_date, cmd.number_of_payments);
        let payment_dates = serialize_payment_dates(&schedule);

        let supplier_id = cmd.supplier_id;
        let db = self.db_pool.as_ref();
        let invoice = db
            .transaction::<_, supplier_invoice::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let supplier_exists = Supplier::find_by_id(supplier_id)
                        .one(txn)
                        .await?
                        .is_some();
                    if !supplier_exists {
                        return Err(ServiceError::NotFound(format!(
                            "Supplier {} not found",
                            supplier_id
                        )));
                    }

                    let invoice = supplier_invoice::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        supplier_id: Set(supplier_id),
                        invoice_date: Set(cmd.invoice_date),
                        total_amount: Set(cmd.total_amount),
                        number_of_payments: Set(cmd.number_of_payments),
                        payment_dates: Set(payment_dates),
                        invoice_image: Set(invoice_image),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    for line in cmd.items {
                        supplier_invoice_item::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            supplier_invoice_id: Set(invoice.id),
                            product_id: Set(line.product_id),
                            product_name: Set(line.product_name.trim().to_string()),
                            quantity: Set(line.quantity),
                            unit_cost: Set(line.unit_cost),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                    }

                    Ok(invoice)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::SupplierInvoiceLogged {
                invoice_id: invoice.id,
                supplier_id: invoice.supplier_id,
                number_of_payments: invoice.number_of_payments,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(invoice)
    }

    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        Ok(Supplier::find()
            .order_by_asc(supplier::Column::Name)
            .all(self.db_pool.as_ref())
            .await?)
    }

    pub async fn get_supplier(&self, supplier_id: Uuid) -> Result<supplier::Model, ServiceError> {
        Supplier::find_by_id(supplier_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {} not found", supplier_id)))
    }

    /// Invoices for one supplier, newest first.
    pub async fn list_invoices(
        &self,
        supplier_id: Uuid,
    ) -> Result<Vec<supplier_invoice::Model>, ServiceError> {
        self.get_supplier(supplier_id).await?;
        Ok(SupplierInvoice::find()
            .filter(supplier_invoice::Column::SupplierId.eq(supplier_id))
            .order_by_desc(supplier_invoice::Column::InvoiceDate)
            .all(self.db_pool.as_ref())
            .await?)
    }

    fn encode_image(&self, image: InvoiceImage) -> Result<String, ServiceError> {
        if !SUPPORTED_IMAGE_TYPES.contains(&image.mime.as_str()) {
            return Err(ServiceError::InvalidInput(format!(
                "Unsupported image type: {}",
                image.mime
            )));
        }
        if image.bytes.len() > self.max_upload_bytes {
            return Err(ServiceError::InvalidInput(
                "Invoice image is too large".to_string(),
            ));
        }
        Ok(format!(
            "data:{};base64,{}",
            image.mime,
            BASE64.encode(&image.bytes)
        ))
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::customer::{self, Entity as Customer};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::inventory::unwrap_transaction_error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub birth_date: Option<DateTime<Utc>>,
}

pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create_customer(
        &self,
        cmd: CreateCustomer,
    ) -> Result<customer::Model, ServiceError> {
        let name = cmd.name.trim().to_string();
        let phone = cmd.phone.trim().to_string();
        let email = cmd.email.trim().to_string();
        if name.is_empty() || phone.is_empty() || email.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Customer name, phone and email are required".to_string(),
            ));
        }

        let customer = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            phone: Set(phone),
            email: Set(email),
            birth_date: Set(cmd.birth_date),
            ..Default::default()
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(customer_id = %customer.id, "customer enrolled");
        self.event_sender
            .send(Event::CustomerEnrolled {
                customer_id: customer.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(customer)
    }

    /// Records a purchase for loyalty tracking: bumps lifetime spend and the
    /// last-visit timestamp in one transaction. Tiers derive from these two
    /// fields at read time.
    #[instrument(skip(self))]
    pub async fn record_purchase(
        &self,
        customer_id: Uuid,
        amount: Decimal,
        at: Option<DateTime<Utc>>,
    ) -> Result<customer::Model, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Purchase amount must be positive".to_string(),
            ));
        }
        let visited_at = at.unwrap_or_else(Utc::now);

        let db = self.db_pool.as_ref();
        let customer = db
            .transaction::<_, customer::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let customer = Customer::find_by_id(customer_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Customer {} not found", customer_id))
                        })?;

                    let new_spend = customer.total_spend + amount;
                    let mut active: customer::ActiveModel = customer.into();
                    active.total_spend = Set(new_spend);
                    active.last_visit = Set(Some(visited_at));
                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::CustomerPurchaseRecorded { customer_id })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(customer)
    }
}

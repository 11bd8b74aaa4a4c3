use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Query;
use crate::entities::supplier::Entity as Supplier;
use crate::entities::supplier_invoice::Entity as SupplierInvoice;
use crate::entities::supplier_invoice_item::{self, Entity as SupplierInvoiceItem};
use crate::errors::ServiceError;
use crate::payment_schedule::{month_key, payment_events};

/// How far ahead the upcoming-payments view looks, in days.
pub const UPCOMING_HORIZON_DAYS: i64 = 7;

#[derive(Debug, Serialize)]
pub struct UpcomingPayment {
    pub supplier_invoice_id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub due_date: DateTime<Utc>,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetUpcomingPaymentsQuery {
    pub now: DateTime<Utc>,
    pub horizon_days: i64,
}

impl GetUpcomingPaymentsQuery {
    pub fn new(now: DateTime<Utc>) -> Self {
        GetUpcomingPaymentsQuery {
            now,
            horizon_days: UPCOMING_HORIZON_DAYS,
        }
    }
}

#[async_trait]
impl Query for GetUpcomingPaymentsQuery {
    type Result = Vec<UpcomingPayment>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let horizon = self.now + Duration::days(self.horizon_days);

        let invoices = SupplierInvoice::find()
            .find_also_related(Supplier)
            .all(db)
            .await?;

        let mut payments: Vec<UpcomingPayment> = invoices
            .iter()
            .flat_map(|(invoice, supplier)| {
                let supplier_name = supplier
                    .as_ref()
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                payment_events(invoice)
                    .into_iter()
                    .filter(|event| event.due_date >= self.now && event.due_date <= horizon)
                    .map(move |event| UpcomingPayment {
                        supplier_invoice_id: event.supplier_invoice_id,
                        supplier_id: event.supplier_id,
                        supplier_name: supplier_name.clone(),
                        due_date: event.due_date,
                        amount: event.amount,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        payments.sort_by_key(|p| p.due_date);
        Ok(payments)
    }
}

/// One month's bucket of scheduled outgoing payments.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MonthlyCashFlow {
    /// `YYYY-MM`
    pub month: String,
    pub total_due: Decimal,
    pub payment_count: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GetCashFlowForecastQuery {}

#[async_trait]
impl Query for GetCashFlowForecastQuery {
    type Result = Vec<MonthlyCashFlow>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let invoices = SupplierInvoice::find().all(db).await?;

        let mut buckets: BTreeMap<String, (Decimal, u64)> = BTreeMap::new();
        for invoice in &invoices {
            for event in payment_events(invoice) {
                let bucket = buckets
                    .entry(month_key(event.due_date))
                    .or_insert((Decimal::ZERO, 0));
                bucket.0 += event.amount;
                bucket.1 += 1;
            }
        }

        // BTreeMap iteration gives the ascending month order the forecast wants.
        Ok(buckets
            .into_iter()
            .map(|(month, (total_due, payment_count))| MonthlyCashFlow {
                month,
                total_due,
                payment_count,
            })
            .collect())
    }
}

/// Unit-cost increase detected between the two most recent purchases of a
/// product name.
#[derive(Debug, Serialize)]
pub struct PriceChangeAlert {
    pub product_name: String,
    pub previous_cost: Decimal,
    pub latest_cost: Decimal,
    pub increase: Decimal,
    pub latest_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GetPriceChangeAlertsQuery {}

#[async_trait]
impl Query for GetPriceChangeAlertsQuery {
    type Result = Vec<PriceChangeAlert>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        // Invoice items keyed by product name, newest first within each name.
        let items = SupplierInvoiceItem::find()
            .order_by_asc(supplier_invoice_item::Column::ProductName)
            .order_by_desc(supplier_invoice_item::Column::CreatedAt)
            .all(db)
            .await?;

        let mut alerts = Vec::new();
        let mut idx = 0;
        while idx < items.len() {
            let name = &items[idx].product_name;
            let group_end = items[idx..]
                .iter()
                .position(|item| &item.product_name != name)
                .map(|offset| idx + offset)
                .unwrap_or(items.len());

            // Only the two most recent purchases matter for the alert.
            if group_end - idx >= 2 {
                let latest = &items[idx];
                let previous = &items[idx + 1];
                if latest.unit_cost > previous.unit_cost {
                    alerts.push(PriceChangeAlert {
                        product_name: name.clone(),
                        previous_cost: previous.unit_cost,
                        latest_cost: latest.unit_cost,
                        increase: latest.unit_cost - previous.unit_cost,
                        latest_at: latest.created_at,
                    });
                }
            }
            idx = group_end;
        }

        Ok(alerts)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Query;
use crate::entities::customer::{self, Entity as Customer};
use crate::errors::ServiceError;

/// Loyalty tier, derived at read time from spend and recency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerTier {
    Vip,
    Active,
    Inactive,
}

/// Whole days since the last visit, floored. `None` when the customer has
/// never visited; a never-seen customer is not penalized for recency.
pub fn days_since_visit(now: DateTime<Utc>, last_visit: Option<DateTime<Utc>>) -> Option<i64> {
    last_visit.map(|visit| (now - visit).num_milliseconds().div_euclid(86_400_000))
}

pub fn tier_for(total_spend: Decimal, days_since_visit: Option<i64>) -> CustomerTier {
    let within = |limit: i64| days_since_visit.map_or(true, |days| days <= limit);
    if total_spend >= dec!(2000) && within(60) {
        CustomerTier::Vip
    } else if total_spend >= dec!(500) && within(90) {
        CustomerTier::Active
    } else {
        CustomerTier::Inactive
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerWithTier {
    #[serde(flatten)]
    pub customer: customer::Model,
    pub days_since_visit: Option<i64>,
    pub tier: CustomerTier,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetCustomerQuery {
    pub customer_id: Uuid,
    pub now: DateTime<Utc>,
}

#[async_trait]
impl Query for GetCustomerQuery {
    type Result = CustomerWithTier;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let customer = Customer::find_by_id(self.customer_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", self.customer_id))
            })?;

        let days = days_since_visit(self.now, customer.last_visit);
        let tier = tier_for(customer.total_spend, days);
        Ok(CustomerWithTier {
            customer,
            days_since_visit: days,
            tier,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListCustomersQuery {
    pub now: DateTime<Utc>,
}

#[async_trait]
impl Query for ListCustomersQuery {
    type Result = Vec<CustomerWithTier>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let customers = Customer::find()
            .order_by_asc(customer::Column::Name)
            .all(db)
            .await?;

        Ok(customers
            .into_iter()
            .map(|c| {
                let days = days_since_visit(self.now, c.last_visit);
                let tier = tier_for(c.total_spend, days);
                CustomerWithTier {
                    customer: c,
                    days_since_visit: days,
                    tier,
                }
            })
            .collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetBirthdayCustomersQuery {
    pub date: DateTime<Utc>,
}

#[async_trait]
impl Query for GetBirthdayCustomersQuery {
    type Result = Vec<customer::Model>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let (month, day) = (self.date.month(), self.date.day());

        let customers = Customer::find()
            .order_by_asc(customer::Column::Name)
            .all(db)
            .await?;

        // Year is ignored; only the (month, day) pair has to match.
        Ok(customers
            .into_iter()
            .filter(|c| {
                c.birth_date
                    .map(|b| b.month() == month && b.day() == day)
                    .unwrap_or(false)
            })
            .collect())
    }
}

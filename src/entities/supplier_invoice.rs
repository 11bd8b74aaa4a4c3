use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supplier invoice with an installment schedule. `payment_dates` holds a
/// JSON array of RFC 3339 strings, exactly `number_of_payments` long; each
/// installment amount is `total_amount / number_of_payments`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supplier_invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub invoice_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub number_of_payments: i32,
    #[sea_orm(column_type = "Text")]
    pub payment_dates: String,
    /// Scanned invoice stored as a base64 data URI
    #[sea_orm(column_type = "Text", nullable)]
    pub invoice_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Per-installment amount; zero when the payment count is not positive.
    pub fn payment_amount(&self) -> Decimal {
        if self.number_of_payments > 0 {
            self.total_amount / Decimal::from(self.number_of_payments)
        } else {
            Decimal::ZERO
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    #[sea_orm(has_many = "super::supplier_invoice_item::Entity")]
    Items,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::supplier_invoice_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}

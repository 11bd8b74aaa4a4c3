use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Loyalty-club customer. The tier (VIP/Active/Inactive) is derived from
/// spend and visit recency at query time and never stored.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 1, max = 32))]
    pub phone: String,

    #[validate(email)]
    pub email: String,

    pub birth_date: Option<DateTime<Utc>>,

    pub total_spend: Decimal,

    pub last_visit: Option<DateTime<Utc>>,

    pub joined_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            if let ActiveValue::NotSet = active_model.joined_at {
                active_model.joined_at = Set(Utc::now());
            }
            if let ActiveValue::NotSet = active_model.total_spend {
                active_model.total_spend = Set(Decimal::ZERO);
            }
        }
        Ok(active_model)
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One employee sale. The bonus is derived, never stored.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub amount: Decimal,
    /// Commission percentage applied to `amount`
    pub bonus_rate: Decimal,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// bonus = amount x bonus_rate / 100
    pub fn bonus(&self) -> Decimal {
        self.amount * self.bonus_rate / dec!(100)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonus_is_amount_times_rate_over_hundred() {
        let sale = Model {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            amount: dec!(100),
            bonus_rate: dec!(10),
            date: Utc::now(),
            created_at: Utc::now(),
        };
        assert_eq!(sale.bonus(), dec!(10));
    }
}

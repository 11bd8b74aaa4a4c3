use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::daily_target::{self, Entity as DailyTarget};
use crate::entities::employee::{self, Entity as Employee};
use crate::entities::sale;
use crate::entities::shift;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::inventory::unwrap_transaction_error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployee {
    pub name: String,
    pub employee_code: String,
    pub hourly_rate: Decimal,
    pub sales_target: Decimal,
}

pub struct EmployeeService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl EmployeeService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, cmd), fields(employee_code = %cmd.employee_code))]
    pub async fn create_employee(
        &self,
        cmd: CreateEmployee,
    ) -> Result<employee::Model, ServiceError> {
        let name = cmd.name.trim().to_string();
        let employee_code = cmd.employee_code.trim().to_string();
        if name.is_empty() || employee_code.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Employee name and code are required".to_string(),
            ));
        }
        if cmd.hourly_rate < Decimal::ZERO || cmd.sales_target < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Rates and targets cannot be negative".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let existing = Employee::find()
            .filter(employee::Column::EmployeeCode.eq(employee_code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidInput(format!(
                "An employee with code {} already exists",
                employee_code
            )));
        }

        let employee = employee::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            employee_code: Set(employee_code),
            hourly_rate: Set(cmd.hourly_rate),
            sales_target: Set(cmd.sales_target),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(employee_id = %employee.id, "employee created");
        self.event_sender
            .send(Event::EmployeeCreated {
                employee_id: employee.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(employee)
    }

    /// Logs a sale against an employee. A negative bonus rate is rejected
    /// outright rather than silently treated as zero.
    #[instrument(skip(self))]
    pub async fn log_sale(
        &self,
        employee_id: Uuid,
        amount: Decimal,
        bonus_rate: Decimal,
        date: Option<DateTime<Utc>>,
    ) -> Result<sale::Model, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Sale amount must be positive".to_string(),
            ));
        }
        if bonus_rate < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Bonus rate cannot be negative".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        self.require_employee(employee_id).await?;

        let sale = sale::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(employee_id),
            amount: Set(amount),
            bonus_rate: Set(bonus_rate),
            date: Set(date.unwrap_or_else(Utc::now)),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.event_sender
            .send(Event::EmployeeSaleLogged {
                employee_id,
                sale_id: sale.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(sale)
    }

    #[instrument(skip(self))]
    pub async fn log_shift(
        &self,
        employee_id: Uuid,
        hours: Decimal,
        date: Option<DateTime<Utc>>,
    ) -> Result<shift::Model, ServiceError> {
        if hours <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Shift hours must be positive".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        self.require_employee(employee_id).await?;

        let shift = shift::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(employee_id),
            hours: Set(hours),
            date: Set(date.unwrap_or_else(Utc::now)),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.event_sender
            .send(Event::ShiftLogged {
                employee_id,
                shift_id: shift.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(shift)
    }

    /// Sets the shared target for a day. One target per day is a stored
    /// constraint; setting it again replaces the amounts.
    #[instrument(skip(self))]
    pub async fn set_daily_target(
        &self,
        date: DateTime<Utc>,
        target_amount: Decimal,
        bonus_reward: Decimal,
    ) -> Result<daily_target::Model, ServiceError> {
        if target_amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Target amount must be positive".to_string(),
            ));
        }
        if bonus_reward < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Bonus reward cannot be negative".to_string(),
            ));
        }

        let day_start = date
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| ServiceError::InvalidInput("Invalid date".to_string()))?;

        let db = self.db_pool.as_ref();
        let target = db
            .transaction::<_, daily_target::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = DailyTarget::find()
                        .filter(daily_target::Column::Date.eq(day_start))
                        .one(txn)
                        .await?;

                    let target = match existing {
                        Some(existing) => {
                            let mut active: daily_target::ActiveModel = existing.into();
                            active.target_amount = Set(target_amount);
                            active.bonus_reward = Set(bonus_reward);
                            active.update(txn).await?
                        }
                        None => {
                            daily_target::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                date: Set(day_start),
                                target_amount: Set(target_amount),
                                bonus_reward: Set(bonus_reward),
                                ..Default::default()
                            }
                            .insert(txn)
                            .await?
                        }
                    };
                    Ok(target)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::DailyTargetSet { date: day_start })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(target)
    }

    async fn require_employee(&self, employee_id: Uuid) -> Result<(), ServiceError> {
        let exists = Employee::find_by_id(employee_id)
            .one(self.db_pool.as_ref())
            .await?
            .is_some();
        if exists {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "Employee {} not found",
                employee_id
            )))
        }
    }
}

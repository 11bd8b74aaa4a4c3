use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Query;
use crate::entities::daily_target::{self, Entity as DailyTarget};
use crate::entities::employee::{self, Entity as Employee};
use crate::entities::sale::{self, Entity as Sale};
use crate::entities::shift::{self, Entity as Shift};
use crate::errors::ServiceError;
use crate::payment_schedule::add_months;

/// Minimum hours worked on a day before a hit target pays its bonus.
pub const BONUS_MIN_HOURS: Decimal = dec!(4);

/// Share of a daily target covered by the day's sales, as a whole percent
/// capped at 100. Zero when the target is not positive.
pub fn target_progress_percent(sales_total: Decimal, target_amount: Decimal) -> i32 {
    if target_amount <= Decimal::ZERO {
        return 0;
    }
    let percent = (sales_total / target_amount * dec!(100)).round();
    percent.min(dec!(100)).max(Decimal::ZERO).to_i32().unwrap_or(0)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetEmployeeQuery {
    pub employee_id: Uuid,
}

#[async_trait]
impl Query for GetEmployeeQuery {
    type Result = employee::Model;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        Employee::find_by_id(self.employee_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Employee {} not found", self.employee_id))
            })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListEmployeesQuery {}

#[async_trait]
impl Query for ListEmployeesQuery {
    type Result = Vec<employee::Model>;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        Ok(Employee::find()
            .order_by_asc(employee::Column::Name)
            .all(db)
            .await?)
    }
}

/// Per-employee totals over one calendar month.
#[derive(Debug, Serialize)]
pub struct EmployeeMonthlyStats {
    pub employee_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub total_sales: Decimal,
    pub monthly_bonus: Decimal,
    pub total_shifts: u64,
    pub total_hours: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetEmployeeMonthlyStatsQuery {
    pub employee_id: Uuid,
    pub year: i32,
    pub month: u32,
}

#[async_trait]
impl Query for GetEmployeeMonthlyStatsQuery {
    type Result = EmployeeMonthlyStats;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let start = Utc
            .with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "Invalid month {}-{:02}",
                    self.year, self.month
                ))
            })?;
        let end = add_months(start, 1);

        let exists = Employee::find_by_id(self.employee_id).one(db).await?.is_some();
        if !exists {
            return Err(ServiceError::NotFound(format!(
                "Employee {} not found",
                self.employee_id
            )));
        }

        // Bonus is per-sale (amount x rate / 100), so the sums run in process
        // on Decimal instead of losing precision to a SQL float aggregate.
        let sales = Sale::find()
            .filter(sale::Column::EmployeeId.eq(self.employee_id))
            .filter(sale::Column::Date.gte(start))
            .filter(sale::Column::Date.lt(end))
            .all(db)
            .await?;

        let total_sales = sales.iter().map(|s| s.amount).sum();
        let monthly_bonus = sales.iter().map(|s| s.bonus()).sum();

        let shifts = Shift::find()
            .filter(shift::Column::EmployeeId.eq(self.employee_id))
            .filter(shift::Column::Date.gte(start))
            .filter(shift::Column::Date.lt(end))
            .all(db)
            .await?;

        Ok(EmployeeMonthlyStats {
            employee_id: self.employee_id,
            year: self.year,
            month: self.month,
            total_sales,
            monthly_bonus,
            total_shifts: shifts.len() as u64,
            total_hours: shifts.iter().map(|s| s.hours).sum(),
        })
    }
}

/// One employee's standing against the day's target.
#[derive(Debug, Serialize)]
pub struct EmployeeDailyProgress {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub daily_sales: Decimal,
    pub daily_hours: Decimal,
    pub progress_percent: i32,
    pub bonus_eligible: bool,
}

#[derive(Debug, Serialize)]
pub struct DailyTargetReport {
    pub date: DateTime<Utc>,
    pub target: Option<daily_target::Model>,
    pub entries: Vec<EmployeeDailyProgress>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetDailyTargetProgressQuery {
    pub date: DateTime<Utc>,
}

#[async_trait]
impl Query for GetDailyTargetProgressQuery {
    type Result = DailyTargetReport;

    async fn execute(&self, db: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let day_start = self
            .date
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| ServiceError::InvalidInput("Invalid date".to_string()))?;
        let day_end = day_start + Duration::days(1);

        let target = DailyTarget::find()
            .filter(daily_target::Column::Date.eq(day_start))
            .one(db)
            .await?;

        let employees = Employee::find()
            .order_by_asc(employee::Column::Name)
            .all(db)
            .await?;

        let sales = Sale::find()
            .filter(sale::Column::Date.gte(day_start))
            .filter(sale::Column::Date.lt(day_end))
            .all(db)
            .await?;

        let shifts = Shift::find()
            .filter(shift::Column::Date.gte(day_start))
            .filter(shift::Column::Date.lt(day_end))
            .all(db)
            .await?;

        let entries = employees
            .into_iter()
            .map(|emp| {
                let daily_sales: Decimal = sales
                    .iter()
                    .filter(|s| s.employee_id == emp.id)
                    .map(|s| s.amount)
                    .sum();
                let daily_hours: Decimal = shifts
                    .iter()
                    .filter(|s| s.employee_id == emp.id)
                    .map(|s| s.hours)
                    .sum();

                let (progress_percent, bonus_eligible) = match &target {
                    Some(t) => (
                        target_progress_percent(daily_sales, t.target_amount),
                        daily_sales >= t.target_amount && daily_hours >= BONUS_MIN_HOURS,
                    ),
                    None => (0, false),
                };

                EmployeeDailyProgress {
                    employee_id: emp.id,
                    employee_name: emp.name,
                    daily_sales,
                    daily_hours,
                    progress_percent,
                    bonus_eligible,
                }
            })
            .collect();

        Ok(DailyTargetReport {
            date: day_start,
            target,
            entries,
        })
    }
}

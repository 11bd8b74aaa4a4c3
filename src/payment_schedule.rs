//! Installment scheduling for supplier invoices.
//!
//! Payments are spread one calendar month apart starting one month after the
//! invoice date. Month stepping clamps to the last valid day, so an invoice
//! dated Jan 31 pays on Feb 28 (or 29), Mar 31, Apr 30, and so on.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::supplier_invoice;

/// Adds calendar months with end-of-month clamping. Saturates at the chrono
/// range limit instead of panicking.
pub fn add_months(date: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// Due dates for an invoice split into `number_of_payments` installments.
/// Empty when the payment count is not positive.
pub fn payment_schedule(invoice_date: DateTime<Utc>, number_of_payments: i32) -> Vec<DateTime<Utc>> {
    if number_of_payments <= 0 {
        return Vec::new();
    }
    (1..=number_of_payments as u32)
        .map(|offset| add_months(invoice_date, offset))
        .collect()
}

/// Serializes a schedule to the JSON form stored on the invoice row.
pub fn serialize_payment_dates(dates: &[DateTime<Utc>]) -> String {
    let raw: Vec<String> = dates.iter().map(|d| d.to_rfc3339()).collect();
    // a Vec<String> always serializes
    serde_json::to_string(&raw).unwrap_or_else(|_| "[]".to_string())
}

/// Parses the stored JSON schedule. Malformed JSON or unparsable entries are
/// dropped rather than failing the read path.
pub fn parse_payment_dates(raw: &str) -> Vec<DateTime<Utc>> {
    let entries: Vec<String> = serde_json::from_str(raw).unwrap_or_default();
    entries
        .iter()
        .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
        .collect()
}

/// Grouping key for monthly cash-flow buckets, e.g. `2026-03`.
pub fn month_key(date: DateTime<Utc>) -> String {
    date.format("%Y-%m").to_string()
}

/// One installment due on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub supplier_invoice_id: uuid::Uuid,
    pub supplier_id: uuid::Uuid,
    pub due_date: DateTime<Utc>,
    pub amount: Decimal,
}

/// Expands an invoice row into its individual installments.
pub fn payment_events(invoice: &supplier_invoice::Model) -> Vec<PaymentEvent> {
    let amount = invoice.payment_amount();
    parse_payment_dates(&invoice.payment_dates)
        .into_iter()
        .map(|due_date| PaymentEvent {
            supplier_invoice_id: invoice.id,
            supplier_id: invoice.supplier_id,
            due_date,
            amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case(utc(2023, 1, 31), 1, utc(2023, 2, 28))]
    #[case(utc(2024, 1, 31), 1, utc(2024, 2, 29))]
    #[case(utc(2023, 3, 31), 1, utc(2023, 4, 30))]
    #[case(utc(2023, 1, 15), 1, utc(2023, 2, 15))]
    #[case(utc(2023, 11, 30), 3, utc(2024, 2, 29))]
    fn month_stepping_clamps_to_last_valid_day(
        #[case] start: DateTime<Utc>,
        #[case] months: u32,
        #[case] expected: DateTime<Utc>,
    ) {
        assert_eq!(add_months(start, months), expected);
    }

    #[test]
    fn schedule_starts_one_month_out_and_has_one_date_per_installment() {
        let dates = payment_schedule(utc(2026, 1, 15), 3);
        assert_eq!(
            dates,
            vec![utc(2026, 2, 15), utc(2026, 3, 15), utc(2026, 4, 15)]
        );
    }

    #[test]
    fn schedule_steps_from_the_invoice_date_not_the_previous_installment() {
        // each step is invoice_date + k months, so a Jan 31 invoice lands back
        // on the 31st in months that have one
        let dates = payment_schedule(utc(2023, 1, 31), 3);
        assert_eq!(
            dates,
            vec![utc(2023, 2, 28), utc(2023, 3, 31), utc(2023, 4, 30)]
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-2)]
    fn non_positive_payment_counts_yield_empty_schedules(#[case] n: i32) {
        assert!(payment_schedule(utc(2026, 5, 1), n).is_empty());
    }

    #[test]
    fn stored_schedule_round_trips() {
        let dates = payment_schedule(utc(2026, 1, 31), 2);
        let raw = serialize_payment_dates(&dates);
        assert_eq!(parse_payment_dates(&raw), dates);
    }

    #[rstest]
    #[case("not json")]
    #[case("{\"a\":1}")]
    #[case("[\"not a date\"]")]
    fn malformed_stored_schedules_parse_to_empty(#[case] raw: &str) {
        assert!(parse_payment_dates(raw).is_empty());
    }

    #[test]
    fn month_key_is_zero_padded() {
        assert_eq!(month_key(utc(2026, 3, 5)), "2026-03");
        assert_eq!(month_key(utc(2026, 11, 30)), "2026-11");
    }
}

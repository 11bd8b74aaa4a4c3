mod common;

use backoffice_api::entities::{supplier_invoice, supplier_invoice_item};
use backoffice_api::errors::ServiceError;
use backoffice_api::payment_schedule::{parse_payment_dates, serialize_payment_dates};
use backoffice_api::queries::finance_queries::{
    GetCashFlowForecastQuery, GetPriceChangeAlertsQuery, GetUpcomingPaymentsQuery,
};
use backoffice_api::queries::Query;
use backoffice_api::services::suppliers::{
    CreateSupplier, InvoiceImage, InvoiceLine, LogInvoice, SupplierService,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

fn vendor(name: &str) -> CreateSupplier {
    CreateSupplier {
        name: name.to_string(),
        contact_person: "Maya Stern".to_string(),
        phone: "03-5551234".to_string(),
    }
}

fn invoice(supplier_id: Uuid, date: DateTime<Utc>, total: rust_decimal::Decimal, n: i32) -> LogInvoice {
    LogInvoice {
        supplier_id,
        invoice_date: date,
        total_amount: total,
        number_of_payments: n,
        image: None,
        items: Vec::new(),
    }
}

#[tokio::test]
async fn installment_dates_step_monthly_and_clamp_to_month_end() {
    let (db, events) = common::setup().await;
    let service = SupplierService::new(db.clone(), events, MAX_UPLOAD_BYTES);

    let supplier = service.create_supplier(vendor("Textile House")).await.expect("supplier");
    let jan_31 = Utc.with_ymd_and_hms(2026, 1, 31, 12, 0, 0).unwrap();
    let logged = service
        .log_invoice(invoice(supplier.id, jan_31, dec!(300), 3))
        .await
        .expect("invoice");

    let dates = parse_payment_dates(&logged.payment_dates);
    assert_eq!(
        dates,
        vec![
            Utc.with_ymd_and_hms(2026, 2, 28, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 4, 30, 12, 0, 0).unwrap(),
        ]
    );
    assert_eq!(logged.payment_amount(), dec!(100));
}

#[tokio::test]
async fn upcoming_payments_keep_only_the_next_week() {
    let (db, events) = common::setup().await;
    let service = SupplierService::new(db.clone(), events, MAX_UPLOAD_BYTES);

    let supplier = service.create_supplier(vendor("Footwear Ltd")).await.expect("supplier");
    let now = Utc::now();

    // one installment inside the window, one far past it
    let schedule = vec![now + Duration::days(2), now + Duration::days(40)];
    supplier_invoice::ActiveModel {
        id: Set(Uuid::new_v4()),
        supplier_id: Set(supplier.id),
        invoice_date: Set(now - Duration::days(30)),
        total_amount: Set(dec!(100)),
        number_of_payments: Set(2),
        payment_dates: Set(serialize_payment_dates(&schedule)),
        invoice_image: Set(None),
        ..Default::default()
    }
    .insert(db.as_ref())
    .await
    .expect("insert invoice");

    let upcoming = GetUpcomingPaymentsQuery::new(now)
        .execute(&db)
        .await
        .expect("upcoming");
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].amount, dec!(50));
    assert_eq!(upcoming[0].supplier_name, "Footwear Ltd");
    assert_eq!(upcoming[0].due_date, schedule[0]);
}

#[tokio::test]
async fn cash_flow_buckets_by_month_in_ascending_order() {
    let (db, events) = common::setup().await;
    let service = SupplierService::new(db.clone(), events, MAX_UPLOAD_BYTES);

    let supplier = service.create_supplier(vendor("Knitwear Co")).await.expect("supplier");
    let jan_15 = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
    let feb_15 = Utc.with_ymd_and_hms(2026, 2, 15, 9, 0, 0).unwrap();

    // Feb 150 + Mar 150
    service
        .log_invoice(invoice(supplier.id, jan_15, dec!(300), 2))
        .await
        .expect("invoice");
    // Mar 100
    service
        .log_invoice(invoice(supplier.id, feb_15, dec!(100), 1))
        .await
        .expect("invoice");

    let forecast = GetCashFlowForecastQuery::default()
        .execute(&db)
        .await
        .expect("forecast");
    assert_eq!(forecast.len(), 2);

    assert_eq!(forecast[0].month, "2026-02");
    assert_eq!(forecast[0].total_due, dec!(150));
    assert_eq!(forecast[0].payment_count, 1);

    assert_eq!(forecast[1].month, "2026-03");
    assert_eq!(forecast[1].total_due, dec!(250));
    assert_eq!(forecast[1].payment_count, 2);
}

#[tokio::test]
async fn price_alerts_compare_the_two_most_recent_purchases() {
    let (db, events) = common::setup().await;
    let service = SupplierService::new(db.clone(), events, MAX_UPLOAD_BYTES);

    let supplier = service.create_supplier(vendor("Fabric Depot")).await.expect("supplier");
    let base = Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap();
    let parent = service
        .log_invoice(invoice(supplier.id, base, dec!(100), 1))
        .await
        .expect("invoice");

    let insert_item = |name: &str, cost, at| {
        let item = supplier_invoice_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_invoice_id: Set(parent.id),
            product_id: Set(None),
            product_name: Set(name.to_string()),
            quantity: Set(1),
            unit_cost: Set(cost),
            created_at: Set(at),
        };
        let db = db.clone();
        async move { item.insert(db.as_ref()).await.expect("insert item") }
    };

    // rose from 10 to 12, and an older 15 that must be ignored
    insert_item("Linen", dec!(15), base).await;
    insert_item("Linen", dec!(10), base + Duration::days(1)).await;
    insert_item("Linen", dec!(12), base + Duration::days(2)).await;
    // dropped: no alert
    insert_item("Cotton", dec!(20), base).await;
    insert_item("Cotton", dec!(18), base + Duration::days(1)).await;
    // bought once: nothing to compare
    insert_item("Silk", dec!(50), base).await;

    let alerts = GetPriceChangeAlertsQuery::default()
        .execute(&db)
        .await
        .expect("alerts");
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].product_name, "Linen");
    assert_eq!(alerts[0].previous_cost, dec!(10));
    assert_eq!(alerts[0].latest_cost, dec!(12));
    assert_eq!(alerts[0].increase, dec!(2));
}

#[tokio::test]
async fn invoice_images_are_stored_as_data_uris() {
    let (db, events) = common::setup().await;
    let service = SupplierService::new(db.clone(), events, MAX_UPLOAD_BYTES);

    let supplier = service.create_supplier(vendor("Paper Goods")).await.expect("supplier");
    let mut cmd = invoice(supplier.id, Utc::now(), dec!(80), 1);
    cmd.image = Some(InvoiceImage {
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
        mime: "image/png".to_string(),
    });
    cmd.items = vec![InvoiceLine {
        product_id: None,
        product_name: "Gift wrap".to_string(),
        quantity: 10,
        unit_cost: dec!(8),
    }];

    let logged = service.log_invoice(cmd).await.expect("invoice");
    let stored = logged.invoice_image.expect("image stored");
    assert!(stored.starts_with("data:image/png;base64,"), "got {stored}");
}

#[tokio::test]
async fn invalid_invoices_are_rejected() {
    let (db, events) = common::setup().await;
    let service = SupplierService::new(db.clone(), events, MAX_UPLOAD_BYTES);

    let supplier = service.create_supplier(vendor("Hardware Hub")).await.expect("supplier");
    let now = Utc::now();

    let err = service
        .log_invoice(invoice(supplier.id, now, dec!(0), 1))
        .await
        .expect_err("zero total");
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = service
        .log_invoice(invoice(supplier.id, now, dec!(100), 0))
        .await
        .expect_err("zero installments");
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = service
        .log_invoice(invoice(Uuid::new_v4(), now, dec!(100), 1))
        .await
        .expect_err("unknown supplier");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let mut with_bad_image = invoice(supplier.id, now, dec!(100), 1);
    with_bad_image.image = Some(InvoiceImage {
        bytes: vec![0u8; 16],
        mime: "image/tiff".to_string(),
    });
    let err = service
        .log_invoice(with_bad_image)
        .await
        .expect_err("unsupported mime");
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

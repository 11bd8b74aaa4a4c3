mod common;

use backoffice_api::entities::customer::{self, Entity as Customer};
use backoffice_api::queries::customer_queries::{
    CustomerTier, GetBirthdayCustomersQuery, ListCustomersQuery,
};
use backoffice_api::queries::Query;
use backoffice_api::services::customers::{CreateCustomer, CustomerService};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

fn member(name: &str) -> CreateCustomer {
    CreateCustomer {
        name: name.to_string(),
        phone: "050-0000000".to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        birth_date: None,
    }
}

#[tokio::test]
async fn purchases_drive_spend_visit_and_tier() {
    let (db, events) = common::setup().await;
    let service = CustomerService::new(db.clone(), events);
    let now = Utc::now();

    let vip = service.create_customer(member("Dana Levi")).await.expect("create");
    service
        .record_purchase(vip.id, dec!(2500), Some(now - Duration::days(10)))
        .await
        .expect("purchase");

    let active = service.create_customer(member("Noa Bar")).await.expect("create");
    service
        .record_purchase(active.id, dec!(600), Some(now - Duration::days(80)))
        .await
        .expect("purchase");

    // big spender who has not been seen in months
    let lapsed = service.create_customer(member("Avi Cohen")).await.expect("create");
    service
        .record_purchase(lapsed.id, dec!(3000), Some(now - Duration::days(120)))
        .await
        .expect("purchase");

    let newcomer = service.create_customer(member("Tamar Gol")).await.expect("create");

    let listed = ListCustomersQuery { now }.execute(&db).await.expect("list");
    let tier_of = |id| {
        listed
            .iter()
            .find(|c| c.customer.id == id)
            .map(|c| c.tier)
            .expect("listed")
    };

    assert_eq!(tier_of(vip.id), CustomerTier::Vip);
    assert_eq!(tier_of(active.id), CustomerTier::Active);
    assert_eq!(tier_of(lapsed.id), CustomerTier::Inactive);
    assert_eq!(tier_of(newcomer.id), CustomerTier::Inactive);

    let stored = Customer::find_by_id(vip.id)
        .one(db.as_ref())
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(stored.total_spend, dec!(2500));
    assert!(stored.last_visit.is_some());
}

#[tokio::test]
async fn repeat_purchases_accumulate_lifetime_spend() {
    let (db, events) = common::setup().await;
    let service = CustomerService::new(db.clone(), events);

    let customer = service.create_customer(member("Yael Adler")).await.expect("create");
    service
        .record_purchase(customer.id, dec!(300), None)
        .await
        .expect("purchase");
    let updated = service
        .record_purchase(customer.id, dec!(250), None)
        .await
        .expect("purchase");

    assert_eq!(updated.total_spend, dec!(550));
}

#[tokio::test]
async fn birthday_match_ignores_the_year() {
    let (db, events) = common::setup().await;
    let service = CustomerService::new(db.clone(), events);

    let today = Utc.with_ymd_and_hms(2026, 8, 30, 10, 0, 0).unwrap();

    let birthday = service
        .create_customer(CreateCustomer {
            birth_date: Some(Utc.with_ymd_and_hms(1990, 8, 30, 0, 0, 0).unwrap()),
            ..member("Omri Katz")
        })
        .await
        .expect("create");
    service
        .create_customer(CreateCustomer {
            birth_date: Some(Utc.with_ymd_and_hms(1990, 8, 29, 0, 0, 0).unwrap()),
            ..member("Gil Shaham")
        })
        .await
        .expect("create");
    service.create_customer(member("Rona Peri")).await.expect("create");

    let matches = GetBirthdayCustomersQuery { date: today }
        .execute(&db)
        .await
        .expect("birthdays");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, birthday.id);
}

#[tokio::test]
async fn enrollment_defaults_spend_to_zero_and_stamps_joined_at() {
    let (db, events) = common::setup().await;
    let service = CustomerService::new(db.clone(), events);

    let customer = service.create_customer(member("Lior Mor")).await.expect("create");
    assert_eq!(customer.total_spend, dec!(0));
    assert!(customer.last_visit.is_none());

    // joined_at is stamped on insert
    let stored: customer::Model = Customer::find_by_id(customer.id)
        .one(db.as_ref())
        .await
        .expect("query")
        .expect("exists");
    assert!(stored.joined_at <= Utc::now());
}

#[tokio::test]
async fn purchase_rejects_non_positive_amounts_and_unknown_customers() {
    let (db, events) = common::setup().await;
    let service = CustomerService::new(db.clone(), events);

    let customer = service.create_customer(member("Eden Raz")).await.expect("create");
    assert!(service
        .record_purchase(customer.id, dec!(0), None)
        .await
        .is_err());
    assert!(service
        .record_purchase(uuid::Uuid::new_v4(), dec!(10), None)
        .await
        .is_err());

    // failed purchases leave the stored row untouched
    let stored = Customer::find_by_id(customer.id)
        .one(db.as_ref())
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(stored.total_spend, dec!(0));
}

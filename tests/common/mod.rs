use std::sync::Arc;
use std::time::Duration;

use backoffice_api::db::{establish_connection_with_config, run_migrations, DbConfig, DbPool};
use backoffice_api::events::{process_events, EventSender};
use tokio::sync::mpsc;

/// Fresh in-memory database with migrations applied, plus a live event
/// channel. A single connection keeps every query on the same sqlite memory
/// instance.
pub async fn setup() -> (Arc<DbPool>, Arc<EventSender>) {
    let config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout: Duration::from_secs(5),
        idle_timeout: Duration::from_secs(60),
        acquire_timeout: Duration::from_secs(5),
    };
    let pool = establish_connection_with_config(&config)
        .await
        .expect("db connect");
    run_migrations(&pool).await.expect("migrations");

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(process_events(rx));

    (Arc::new(pool), Arc::new(EventSender::new(tx)))
}

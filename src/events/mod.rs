use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after successful mutations. Consumers are
/// notification-only; no mutation depends on event delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ProductCreated {
        product_id: Uuid,
        sku: String,
        initial_stock: i32,
    },
    StockReceived {
        product_id: Uuid,
        quantity: i32,
        new_stock: i32,
    },
    SaleRecorded {
        product_id: Uuid,
        quantity: i32,
        new_stock: i32,
        low_stock: bool,
    },
    ImportApplied {
        source: String,
        lines_applied: usize,
    },
    EmployeeCreated {
        employee_id: Uuid,
    },
    EmployeeSaleLogged {
        employee_id: Uuid,
        sale_id: Uuid,
    },
    ShiftLogged {
        employee_id: Uuid,
        shift_id: Uuid,
    },
    DailyTargetSet {
        date: DateTime<Utc>,
    },
    CustomerEnrolled {
        customer_id: Uuid,
    },
    CustomerPurchaseRecorded {
        customer_id: Uuid,
    },
    SupplierCreated {
        supplier_id: Uuid,
    },
    SupplierInvoiceLogged {
        invoice_id: Uuid,
        supplier_id: Uuid,
        number_of_payments: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Event processing loop. Logs every event; low-stock sale events get a
/// dedicated warning so operators can spot them in aggregated logs.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::SaleRecorded {
                product_id,
                new_stock,
                low_stock: true,
                ..
            } => {
                warn!(
                    product_id = %product_id,
                    new_stock = %new_stock,
                    "Sale drove product below its low-stock threshold"
                );
            }
            _ => {
                info!("Received event: {:?}", event);
            }
        }
    }

    info!("Event channel closed; stopping event processing loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::CustomerEnrolled {
                customer_id: Uuid::new_v4(),
            })
            .await
            .expect("send should succeed");

        assert!(matches!(
            rx.recv().await,
            Some(Event::CustomerEnrolled { .. })
        ));
    }

    #[tokio::test]
    async fn send_fails_after_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender
            .send(Event::SupplierCreated {
                supplier_id: Uuid::new_v4(),
            })
            .await;
        assert!(result.is_err());
    }
}

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::imports::ocr::{OpenAiVision, VisionExtractor};
use crate::services::{CustomerService, EmployeeService, InventoryService, SupplierService};

pub mod common;
pub mod customers;
pub mod employees;
pub mod finance;
pub mod imports;
pub mod inventory;
pub mod suppliers;

pub use customers::customer_routes;
pub use employees::employee_routes;
pub use finance::finance_routes;
pub use imports::import_routes;
pub use inventory::inventory_routes;
pub use suppliers::supplier_routes;

/// One instance of every mutating service, sharing the pool and event channel.
pub struct AppServices {
    pub inventory: InventoryService,
    pub employees: EmployeeService,
    pub customers: CustomerService,
    pub suppliers: SupplierService,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        AppServices {
            inventory: InventoryService::new(db.clone(), event_sender.clone()),
            employees: EmployeeService::new(db.clone(), event_sender.clone()),
            customers: CustomerService::new(db.clone(), event_sender.clone()),
            suppliers: SupplierService::new(db, event_sender, config.max_upload_bytes),
        }
    }
}

/// Shared application state handed to every handler.
pub struct AppState {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub vision: Arc<dyn VisionExtractor>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        AppState {
            db: db.clone(),
            services: AppServices::new(db, event_sender, config),
            vision: Arc::new(OpenAiVision::from_config(config)),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Same state with a caller-supplied vision extractor; used by tests to
    /// avoid the network.
    pub fn with_vision(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
        vision: Arc<dyn VisionExtractor>,
    ) -> Self {
        AppState {
            db: db.clone(),
            services: AppServices::new(db, event_sender, config),
            vision,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

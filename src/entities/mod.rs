pub mod customer;
pub mod daily_target;
pub mod employee;
pub mod inventory_transaction;
pub mod product;
pub mod sale;
pub mod shift;
pub mod supplier;
pub mod supplier_invoice;
pub mod supplier_invoice_item;

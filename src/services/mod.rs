pub mod customers;
pub mod employees;
pub mod imports;
pub mod inventory;
pub mod suppliers;

pub use customers::CustomerService;
pub use employees::EmployeeService;
pub use inventory::InventoryService;
pub use suppliers::SupplierService;

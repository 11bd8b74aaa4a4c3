use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_inventory_tables::Migration),
            Box::new(m20240101_000002_create_staff_tables::Migration),
            Box::new(m20240101_000003_create_customers_table::Migration),
            Box::new(m20240101_000004_create_supplier_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_inventory_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Products::Sku)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Department).string().not_null())
                        .col(ColumnDef::new(Products::Model).string().not_null())
                        .col(ColumnDef::new(Products::Size).string().not_null())
                        .col(ColumnDef::new(Products::Barcode).string().null())
                        .col(ColumnDef::new(Products::SupplierId).uuid().null())
                        .col(ColumnDef::new(Products::MaxStock).integer().not_null())
                        .col(
                            ColumnDef::new(Products::CurrentStock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Type)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_transactions_product_id")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::ProductId)
                        .to_owned(),
                )
                .await?;

            // Dead-stock scans filter on (type, created_at)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_transactions_type_created_at")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::Type)
                        .col(InventoryTransactions::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Sku,
        Name,
        Department,
        Model,
        Size,
        Barcode,
        SupplierId,
        MaxStock,
        CurrentStock,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryTransactions {
        Table,
        Id,
        ProductId,
        Quantity,
        Type,
        CreatedAt,
    }
}

mod m20240101_000002_create_staff_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_staff_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Employees::Name).string().not_null())
                        .col(
                            ColumnDef::new(Employees::EmployeeCode)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Employees::HourlyRate).decimal().not_null())
                        .col(ColumnDef::new(Employees::SalesTarget).decimal().not_null())
                        .col(ColumnDef::new(Employees::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Sales::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Sales::EmployeeId).uuid().not_null())
                        .col(ColumnDef::new(Sales::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(Sales::BonusRate)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Sales::Date).timestamp().not_null())
                        .col(ColumnDef::new(Sales::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_employee_id_date")
                        .table(Sales::Table)
                        .col(Sales::EmployeeId)
                        .col(Sales::Date)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Shifts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Shifts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Shifts::EmployeeId).uuid().not_null())
                        .col(ColumnDef::new(Shifts::Hours).decimal().not_null())
                        .col(ColumnDef::new(Shifts::Date).timestamp().not_null())
                        .col(ColumnDef::new(Shifts::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shifts_employee_id_date")
                        .table(Shifts::Table)
                        .col(Shifts::EmployeeId)
                        .col(Shifts::Date)
                        .to_owned(),
                )
                .await?;

            // One target per calendar day, enforced by the store
            manager
                .create_table(
                    Table::create()
                        .table(DailyTargets::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DailyTargets::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DailyTargets::Date)
                                .timestamp()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DailyTargets::TargetAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DailyTargets::BonusReward)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DailyTargets::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DailyTargets::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Shifts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        Id,
        Name,
        EmployeeCode,
        HourlyRate,
        SalesTarget,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Sales {
        Table,
        Id,
        EmployeeId,
        Amount,
        BonusRate,
        Date,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Shifts {
        Table,
        Id,
        EmployeeId,
        Hours,
        Date,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum DailyTargets {
        Table,
        Id,
        Date,
        TargetAmount,
        BonusReward,
        CreatedAt,
    }
}

mod m20240101_000003_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().not_null())
                        .col(ColumnDef::new(Customers::BirthDate).timestamp().null())
                        .col(
                            ColumnDef::new(Customers::TotalSpend)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Customers::LastVisit).timestamp().null())
                        .col(ColumnDef::new(Customers::JoinedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        Name,
        Phone,
        Email,
        BirthDate,
        TotalSpend,
        LastVisit,
        JoinedAt,
    }
}

mod m20240101_000004_create_supplier_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_supplier_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::ContactPerson).string().not_null())
                        .col(ColumnDef::new(Suppliers::Phone).string().not_null())
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SupplierInvoices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SupplierInvoices::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoices::SupplierId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoices::InvoiceDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoices::TotalAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoices::NumberOfPayments)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoices::PaymentDates)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoices::InvoiceImage)
                                .text()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoices::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_supplier_invoices_supplier_id")
                        .table(SupplierInvoices::Table)
                        .col(SupplierInvoices::SupplierId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SupplierInvoiceItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SupplierInvoiceItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoiceItems::SupplierInvoiceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoiceItems::ProductId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoiceItems::ProductName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoiceItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoiceItems::UnitCost)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierInvoiceItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Price-change detection orders by (product_name, created_at)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_supplier_invoice_items_name_created_at")
                        .table(SupplierInvoiceItems::Table)
                        .col(SupplierInvoiceItems::ProductName)
                        .col(SupplierInvoiceItems::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SupplierInvoiceItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SupplierInvoices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        ContactPerson,
        Phone,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum SupplierInvoices {
        Table,
        Id,
        SupplierId,
        InvoiceDate,
        TotalAmount,
        NumberOfPayments,
        PaymentDates,
        InvoiceImage,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum SupplierInvoiceItems {
        Table,
        Id,
        SupplierInvoiceId,
        ProductId,
        ProductName,
        Quantity,
        UnitCost,
        CreatedAt,
    }
}

mod common;

use backoffice_api::queries::inventory_queries::{GetProductQuery, GetProductTransactionsQuery};
use backoffice_api::queries::Query;
use backoffice_api::services::imports::spreadsheet::parse_spreadsheet;
use backoffice_api::services::imports::{ImportItem, ImportSource};
use backoffice_api::services::inventory::{CreateProduct, InventoryService};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use backoffice_api::entities::product::{self, Entity as Product};

fn plain_item(name: &str, sku: Option<&str>, quantity: i32) -> ImportItem {
    ImportItem {
        name: name.to_string(),
        sku: sku.map(str::to_string),
        quantity,
        price: None,
        max_stock: None,
        department: None,
        model: None,
        size: None,
        barcode: None,
    }
}

#[tokio::test]
async fn csv_preview_flows_into_the_ledger() {
    let (db, events) = common::setup().await;
    let service = InventoryService::new(db.clone(), events);

    let csv = "name,sku,quantity,maxstock,department\n\
               Black shirt,SHIRT-1,4,40,Menswear\n\
               Blue jeans,JEANS-1,2,,Menswear\n";
    let preview = parse_spreadsheet(csv.as_bytes());
    assert!(preview.error.is_none());
    assert_eq!(preview.items.len(), 2);

    let applied = service
        .apply_import_items(ImportSource::Spreadsheet, preview.items)
        .await
        .expect("apply import");
    assert_eq!(applied, 2);

    let shirt = Product::find()
        .filter(product::Column::Sku.eq("SHIRT-1"))
        .one(db.as_ref())
        .await
        .expect("query")
        .expect("shirt exists");
    assert_eq!(shirt.current_stock, 4);
    assert_eq!(shirt.max_stock, 40);
    assert_eq!(shirt.department, "Menswear");

    let transactions = GetProductTransactionsQuery {
        product_id: shirt.id,
        limit: 10,
    }
    .execute(&db)
    .await
    .expect("transactions");
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].r#type, "IN");
    assert_eq!(transactions[0].quantity, 4);
}

#[tokio::test]
async fn unmatched_lines_create_products_with_generated_skus() {
    let (db, events) = common::setup().await;
    let service = InventoryService::new(db.clone(), events);

    let applied = service
        .apply_import_items(
            ImportSource::Ocr,
            vec![plain_item("Espresso beans", None, 3), plain_item("Filters", None, 1)],
        )
        .await
        .expect("apply import");
    assert_eq!(applied, 2);

    let beans = Product::find()
        .filter(product::Column::Name.eq("Espresso beans"))
        .one(db.as_ref())
        .await
        .expect("query")
        .expect("created");
    assert!(beans.sku.starts_with("OCR-"), "sku was {}", beans.sku);
    // quantity 3 -> capacity 15
    assert_eq!(beans.max_stock, 15);
    assert_eq!(beans.current_stock, 3);

    let filters = Product::find()
        .filter(product::Column::Name.eq("Filters"))
        .one(db.as_ref())
        .await
        .expect("query")
        .expect("created");
    // quantity 1 -> the capacity floor of 10
    assert_eq!(filters.max_stock, 10);
}

#[tokio::test]
async fn lines_merge_into_existing_products_by_sku_then_name() {
    let (db, events) = common::setup().await;
    let service = InventoryService::new(db.clone(), events);

    let existing = service
        .create_product(CreateProduct {
            sku: "SHIRT-9".to_string(),
            name: "White shirt".to_string(),
            department: None,
            model: None,
            size: None,
            barcode: None,
            supplier_id: None,
            max_stock: 20,
            initial_stock: 5,
        })
        .await
        .expect("create product");

    // matched by sku: stock and capacity update
    let mut by_sku = plain_item("White shirt", Some("SHIRT-9"), 3);
    by_sku.max_stock = Some(60);
    // matched by name only
    let by_name = plain_item("White shirt", None, 2);

    let applied = service
        .apply_import_items(ImportSource::Spreadsheet, vec![by_sku, by_name])
        .await
        .expect("apply import");
    assert_eq!(applied, 2);

    let view = GetProductQuery {
        product_id: existing.id,
    }
    .execute(&db)
    .await
    .expect("get product");
    assert_eq!(view.product.current_stock, 10);
    assert_eq!(view.product.max_stock, 60);

    // no second product was created
    let count = Product::find().all(db.as_ref()).await.expect("query").len();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn unusable_lines_are_skipped_and_empty_batches_are_a_no_op() {
    let (db, events) = common::setup().await;
    let service = InventoryService::new(db.clone(), events);

    let applied = service
        .apply_import_items(
            ImportSource::Spreadsheet,
            vec![
                plain_item("", None, 5),
                plain_item("Socks", None, 0),
                plain_item("Socks", None, 2),
            ],
        )
        .await
        .expect("apply import");
    assert_eq!(applied, 1);

    let applied = service
        .apply_import_items(ImportSource::Spreadsheet, Vec::new())
        .await
        .expect("apply empty");
    assert_eq!(applied, 0);
}

//! CSV stock-intake parsing.
//!
//! Accepts the bilingual header row the store's suppliers actually send:
//! Hebrew or English column names, in any order, unknown columns ignored.

use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;

use super::{ImportItem, ImportPreview};

const READ_ERROR: &str = "Could not read the spreadsheet file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Sku,
    Quantity,
    Price,
    MaxStock,
    Department,
    Model,
    Size,
    Barcode,
}

fn field_for_header(header: &str) -> Option<Field> {
    match header.trim().to_lowercase().as_str() {
        "name" | "שם" | "שם מוצר" => Some(Field::Name),
        "sku" | "מק״ט" | "מק\"ט" => Some(Field::Sku),
        "quantity" | "כמות" => Some(Field::Quantity),
        "price" | "מחיר" | "מחיר יחידה" => Some(Field::Price),
        "maxstock" | "מלאי מקסימלי" => Some(Field::MaxStock),
        "department" | "מחלקה" => Some(Field::Department),
        "model" | "דגם" => Some(Field::Model),
        "size" | "מידה" => Some(Field::Size),
        "barcode" | "ברקוד" => Some(Field::Barcode),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Quantities arrive as free-form numbers; fractional units are floored.
fn parse_quantity(value: &str) -> i32 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n.floor() as i32)
        .unwrap_or(0)
}

fn parse_count(value: &str) -> Option<i32> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n.floor() as i32)
}

fn parse_price(value: &str) -> Option<Decimal> {
    value.trim().parse::<Decimal>().ok()
}

/// Parses CSV bytes into reviewable import lines. Rows without a name or sku,
/// or without a positive quantity, are dropped; unreadable input yields an
/// empty preview carrying the error.
pub fn parse_spreadsheet(bytes: &[u8]) -> ImportPreview {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let fields: Vec<Option<Field>> = match reader.headers() {
        Ok(headers) => headers.iter().map(field_for_header).collect(),
        Err(_) => return ImportPreview::failed(READ_ERROR),
    };

    let mut items = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(_) => return ImportPreview::failed(READ_ERROR),
        };

        let mut item = ImportItem {
            name: String::new(),
            sku: None,
            quantity: 0,
            price: None,
            max_stock: None,
            department: None,
            model: None,
            size: None,
            barcode: None,
        };

        for (field, value) in fields.iter().zip(record.iter()) {
            match field {
                Some(Field::Name) => item.name = value.trim().to_string(),
                Some(Field::Sku) => item.sku = non_empty(value),
                Some(Field::Quantity) => item.quantity = parse_quantity(value),
                Some(Field::Price) => item.price = parse_price(value),
                Some(Field::MaxStock) => item.max_stock = parse_count(value),
                Some(Field::Department) => item.department = non_empty(value),
                Some(Field::Model) => item.model = non_empty(value),
                Some(Field::Size) => item.size = non_empty(value),
                Some(Field::Barcode) => item.barcode = non_empty(value),
                None => {}
            }
        }

        if item.is_applicable() {
            items.push(item);
        }
    }

    ImportPreview { items, error: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_english_headers() {
        let csv = "name,sku,quantity,price,maxstock\nBlack shirt,SHIRT-1,4,59.9,40\n";
        let preview = parse_spreadsheet(csv.as_bytes());
        assert!(preview.error.is_none());
        assert_eq!(preview.items.len(), 1);
        let item = &preview.items[0];
        assert_eq!(item.name, "Black shirt");
        assert_eq!(item.sku.as_deref(), Some("SHIRT-1"));
        assert_eq!(item.quantity, 4);
        assert_eq!(item.price, Some(dec!(59.9)));
        assert_eq!(item.max_stock, Some(40));
    }

    #[test]
    fn parses_hebrew_headers() {
        let csv = "שם מוצר,מק\"ט,כמות,מחיר,מחלקה,מידה\nחולצה שחורה,SHIRT-2,3,49.9,גברים,M\n";
        let preview = parse_spreadsheet(csv.as_bytes());
        assert!(preview.error.is_none());
        assert_eq!(preview.items.len(), 1);
        let item = &preview.items[0];
        assert_eq!(item.name, "חולצה שחורה");
        assert_eq!(item.sku.as_deref(), Some("SHIRT-2"));
        assert_eq!(item.quantity, 3);
        assert_eq!(item.department.as_deref(), Some("גברים"));
        assert_eq!(item.size.as_deref(), Some("M"));
    }

    #[test]
    fn drops_rows_without_identity_or_positive_quantity() {
        let csv = "name,sku,quantity\n,,5\nShirt,,0\nShirt,,-1\nJeans,JEANS-1,2\n";
        let preview = parse_spreadsheet(csv.as_bytes());
        assert_eq!(preview.items.len(), 1);
        assert_eq!(preview.items[0].name, "Jeans");
    }

    #[test]
    fn fractional_quantities_are_floored() {
        let csv = "name,quantity\nShirt,2.9\n";
        let preview = parse_spreadsheet(csv.as_bytes());
        assert_eq!(preview.items[0].quantity, 2);
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let csv = "name,quantity,notes\nShirt,2,restock soon\n";
        let preview = parse_spreadsheet(csv.as_bytes());
        assert_eq!(preview.items.len(), 1);
        assert_eq!(preview.items[0].quantity, 2);
    }

    #[test]
    fn unreadable_input_reports_an_error_instead_of_failing() {
        let bytes = [0xff, 0xfe, 0x00, 0x41, b'\n', 0xff, 0xff];
        let preview = parse_spreadsheet(&bytes);
        assert!(preview.items.is_empty());
        assert!(preview.error.is_some());
    }

    #[test]
    fn empty_file_yields_empty_preview_without_error() {
        let preview = parse_spreadsheet(b"");
        assert!(preview.items.is_empty());
        assert!(preview.error.is_none());
    }
}

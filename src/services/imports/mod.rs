//! Import pipelines feeding the stock ledger.
//!
//! Both pipelines produce an [`ImportPreview`] the operator reviews before the
//! batch is applied through the inventory service. Extraction failures are
//! reported in-band; they never abort the request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod ocr;
pub mod spreadsheet;

/// Candidate stock line produced by an import pipeline, pending review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportItem {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub quantity: i32,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub max_stock: Option<i32>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl ImportItem {
    /// A line is usable when it can be matched or created (name or sku) and
    /// actually moves stock.
    pub fn is_applicable(&self) -> bool {
        let has_identity = !self.name.trim().is_empty()
            || self
                .sku
                .as_deref()
                .map_or(false, |sku| !sku.trim().is_empty());
        has_identity && self.quantity > 0
    }
}

/// Extraction outcome surfaced to the operator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportPreview {
    pub items: Vec<ImportItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportPreview {
    pub fn failed(message: impl Into<String>) -> Self {
        ImportPreview {
            items: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Where a batch of import lines came from. Drives the prefix of generated
/// SKUs so a product's origin stays visible in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Spreadsheet,
    Ocr,
}

impl ImportSource {
    pub fn sku_prefix(&self) -> &'static str {
        match self {
            ImportSource::Spreadsheet => "SHEET",
            ImportSource::Ocr => "OCR",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportSource::Spreadsheet => "spreadsheet",
            ImportSource::Ocr => "ocr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, sku: Option<&str>, quantity: i32) -> ImportItem {
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

    #[test]
    fn lines_need_an_identity_and_positive_quantity() {
        assert!(line("Espresso beans", None, 3).is_applicable());
        assert!(line("", Some("SKU-1"), 3).is_applicable());
        assert!(!line("", None, 3).is_applicable());
        assert!(!line("  ", Some("  "), 3).is_applicable());
        assert!(!line("Espresso beans", None, 0).is_applicable());
        assert!(!line("Espresso beans", None, -2).is_applicable());
    }
}

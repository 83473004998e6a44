//! Normalization of rows coming from the point-of-sale sales report.
//!
//! The spreadsheet reader itself lives outside the core; it hands over one
//! `(ITEM, TOTAL)` pair per row as raw text. Labels look like
//! `"12345 - Chopp  Litro"` and totals use the Brazilian format `"1.234,5"`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use boteco_core::Quantity;

/// Raw cells of one report row. `None` means the column was missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReportRow {
    pub item: Option<String>,
    pub total: Option<String>,
}

impl SalesReportRow {
    pub fn new(item: impl Into<String>, total: impl Into<String>) -> Self {
        Self {
            item: Some(item.into()),
            total: Some(total.into()),
        }
    }
}

/// A row ready to be recorded as a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSale {
    pub product_name: String,
    pub quantity: Quantity,
}

/// Why a row was skipped. Never fatal to the import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportRowError {
    #[error("missing ITEM column")]
    MissingItem,

    #[error("missing TOTAL column")]
    MissingTotal,

    #[error("blank product name")]
    BlankName,

    #[error("unparseable total '{0}'")]
    UnparseableTotal(String),

    #[error("total '{0}' is not positive")]
    NonPositiveTotal(String),
}

/// Drop a leading `"code - "` prefix and collapse whitespace.
pub fn normalize_item_label(raw: &str) -> String {
    let name = match raw.split_once(" - ") {
        Some((_code, rest)) => rest,
        None => raw,
    };
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a `.`-thousands / `,`-decimal total and round it up to a whole unit.
pub fn parse_report_quantity(raw: &str) -> Result<Decimal, ImportRowError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ImportRowError::MissingTotal);
    }
    let canonical = trimmed.replace('.', "").replace(',', ".");
    let value = Decimal::from_str(&canonical)
        .map_err(|_| ImportRowError::UnparseableTotal(trimmed.to_string()))?;
    Ok(value.ceil())
}

pub fn normalize_row(row: &SalesReportRow) -> Result<NormalizedSale, ImportRowError> {
    let item = row.item.as_deref().ok_or(ImportRowError::MissingItem)?;
    let total = row.total.as_deref().ok_or(ImportRowError::MissingTotal)?;

    let product_name = normalize_item_label(item);
    if product_name.is_empty() {
        return Err(ImportRowError::BlankName);
    }

    let rounded = parse_report_quantity(total)?;
    let quantity = Quantity::positive(rounded)
        .map_err(|_| ImportRowError::NonPositiveTotal(total.trim().to_string()))?;

    Ok(NormalizedSale {
        product_name,
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn strips_code_prefix_collapses_spaces_and_rounds_up() {
        let row = SalesReportRow::new("12345 - Chopp  Litro", "1.234,5");
        let sale = normalize_row(&row).unwrap();
        assert_eq!(sale.product_name, "Chopp Litro");
        assert_eq!(sale.quantity.value(), dec!(1235));
    }

    #[test]
    fn label_without_prefix_is_kept() {
        assert_eq!(normalize_item_label("  Porção   de Fritas "), "Porção de Fritas");
    }

    #[test]
    fn only_the_first_separator_is_a_prefix() {
        assert_eq!(normalize_item_label("77 - Caipirinha - Limão"), "Caipirinha - Limão");
    }

    #[test]
    fn whole_totals_are_unchanged() {
        assert_eq!(parse_report_quantity("42").unwrap(), dec!(42));
        assert_eq!(parse_report_quantity("2,01").unwrap(), dec!(3));
    }

    #[test]
    fn malformed_rows_report_a_reason() {
        assert_eq!(
            normalize_row(&SalesReportRow { item: None, total: Some("1".into()) }),
            Err(ImportRowError::MissingItem)
        );
        assert_eq!(
            normalize_row(&SalesReportRow { item: Some("X".into()), total: None }),
            Err(ImportRowError::MissingTotal)
        );
        assert_eq!(
            normalize_row(&SalesReportRow::new("123 -   ", "1")),
            Err(ImportRowError::BlankName)
        );
        assert_eq!(
            normalize_row(&SalesReportRow::new("Chopp", "abc")),
            Err(ImportRowError::UnparseableTotal("abc".into()))
        );
        assert_eq!(
            normalize_row(&SalesReportRow::new("Chopp", "0")),
            Err(ImportRowError::NonPositiveTotal("0".into()))
        );
    }
}

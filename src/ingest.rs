//! Column-alias normalization for bulk inventory ingestion.
//!
//! Uploaded tabular data arrives with vendor-specific column names. This
//! module owns the explicit alias table that maps them onto the canonical
//! ingestion schema and validates that the required columns are present.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::errors::ServiceError;

/// Canonical column names of the ingestion schema.
pub const COL_PRODUCT: &str = "product";
pub const COL_CATEGORY: &str = "category";
pub const COL_PRICE: &str = "price";
pub const COL_INVENTORY: &str = "inventory";
pub const COL_DATE: &str = "date";
pub const COL_SALES: &str = "sales";
pub const COL_EXPIRY: &str = "expiry_date";

/// Columns a bulk import cannot do without.
pub const REQUIRED_COLUMNS: [&str; 3] = [COL_PRODUCT, COL_PRICE, COL_INVENTORY];

/// Common synonyms seen in uploaded files, keyed lowercase.
static COLUMN_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("item", COL_PRODUCT),
        ("name", COL_PRODUCT),
        ("product name", COL_PRODUCT),
        ("product_name", COL_PRODUCT),
        ("qty", COL_INVENTORY),
        ("stock", COL_INVENTORY),
        ("current inventory", COL_INVENTORY),
        ("inventory_level", COL_INVENTORY),
        ("cost", COL_PRICE),
        ("unit price", COL_PRICE),
        ("selling price", COL_PRICE),
        ("cat", COL_CATEGORY),
        ("expiration", COL_EXPIRY),
        ("expiry", COL_EXPIRY),
        ("units_sold", COL_SALES),
        ("sold", COL_SALES),
    ])
});

/// A parsed-but-unnormalized row: raw column name to raw cell text.
pub type RawRow = BTreeMap<String, String>;

/// One validated row of the canonical ingestion schema.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestRecord {
    pub product: String,
    pub category: String,
    pub price: f64,
    pub inventory: i32,
    pub date: Option<NaiveDate>,
    pub units_sold: i32,
    pub expiry_date: Option<NaiveDate>,
}

/// Map a raw column name onto its canonical form. Matching is
/// case-insensitive and ignores surrounding whitespace.
pub fn canonical_column(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    COLUMN_ALIASES
        .get(lowered.as_str())
        .map(|s| s.to_string())
        .unwrap_or(lowered)
}

/// Whether the import carries per-day history (date and sales columns).
pub fn has_history_columns(rows: &[RawRow]) -> bool {
    let found = found_columns(rows);
    found.contains(COL_DATE) && found.contains(COL_SALES)
}

fn found_columns(rows: &[RawRow]) -> BTreeSet<String> {
    rows.iter()
        .flat_map(|row| row.keys())
        .map(|k| canonical_column(k))
        .collect()
}

/// Normalize and validate a batch of raw rows. Rejects the whole batch when
/// a required column is absent, naming both the missing and the found
/// columns so the caller can correct the file.
pub fn normalize_rows(rows: &[RawRow]) -> Result<Vec<IngestRecord>, ServiceError> {
    let found = found_columns(rows);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !found.contains(**c))
        .copied()
        .collect();
    if !missing.is_empty() {
        let found_list: Vec<&str> = found.iter().map(|s| s.as_str()).collect();
        return Err(ServiceError::InvalidInput(format!(
            "Import is missing required columns: {}. Found: [{}]",
            missing.join(", "),
            found_list.join(", ")
        )));
    }

    let records = rows
        .iter()
        .filter_map(|row| {
            let normalized: BTreeMap<String, &str> = row
                .iter()
                .map(|(k, v)| (canonical_column(k), v.as_str()))
                .collect();

            let product = normalized.get(COL_PRODUCT)?.trim().to_string();
            if product.is_empty() {
                return None;
            }

            Some(IngestRecord {
                product,
                category: normalized
                    .get(COL_CATEGORY)
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .unwrap_or("General")
                    .to_string(),
                price: normalized
                    .get(COL_PRICE)
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .unwrap_or(0.0),
                inventory: normalized
                    .get(COL_INVENTORY)
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .map(|v| v as i32)
                    .unwrap_or(0),
                date: normalized.get(COL_DATE).and_then(|v| parse_date(v)),
                units_sold: normalized
                    .get(COL_SALES)
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .map(|v| v as i32)
                    .unwrap_or(0),
                expiry_date: normalized.get(COL_EXPIRY).and_then(|v| parse_date(v)),
            })
        })
        .collect();

    Ok(records)
}

/// Parse a date cell, tolerating a trailing time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let token = raw.trim().split_whitespace().next()?;
    NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn aliases_map_onto_the_canonical_schema() {
        assert_eq!(canonical_column("Qty"), "inventory");
        assert_eq!(canonical_column("  Unit Price "), "price");
        assert_eq!(canonical_column("ITEM"), "product");
        assert_eq!(canonical_column("expiration"), "expiry_date");
        assert_eq!(canonical_column("unknown_col"), "unknown_col");
    }

    #[test]
    fn missing_price_column_is_rejected_by_name() {
        let rows = vec![row(&[("item", "Milk"), ("qty", "40")])];
        let err = normalize_rows(&rows).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing required columns: price"));
        assert!(message.contains("inventory"));
        assert!(message.contains("product"));
    }

    #[test]
    fn aliased_columns_satisfy_the_requirements() {
        let rows = vec![row(&[
            ("Item", "Milk"),
            ("Unit Price", "2.50"),
            ("Stock", "40"),
            ("Expiry", "2025-04-01"),
        ])];
        let records = normalize_rows(&rows).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product, "Milk");
        assert_eq!(records[0].price, 2.5);
        assert_eq!(records[0].inventory, 40);
        assert_eq!(
            records[0].expiry_date,
            Some(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
        );
    }

    #[test]
    fn unparseable_numbers_coerce_to_zero() {
        let rows = vec![row(&[
            ("product", "Milk"),
            ("price", "n/a"),
            ("inventory", "forty"),
        ])];
        let records = normalize_rows(&rows).unwrap();
        assert_eq!(records[0].price, 0.0);
        assert_eq!(records[0].inventory, 0);
    }

    #[test]
    fn date_cells_tolerate_time_suffixes() {
        assert_eq!(
            parse_date("2025-04-01 00:00:00"),
            Some(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
        );
        assert_eq!(parse_date("tomorrow"), None);
    }

    #[test]
    fn rows_without_a_product_are_skipped() {
        let rows = vec![
            row(&[("product", ""), ("price", "1.0"), ("inventory", "5")]),
            row(&[("product", "Milk"), ("price", "1.0"), ("inventory", "5")]),
        ];
        let records = normalize_rows(&rows).unwrap();
        assert_eq!(records.len(), 1);
    }
}

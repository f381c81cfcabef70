//! # Inventory Report
//!
//! Groups a branch's inventory rows by category and flags low stock.
//!
//! ```text
//! [InventoryRecord]                        InventoryReport
//!   Grocery  Yerba   qty 12  $2.50   ──►    total_units  24
//!   Grocery  Sugar   qty  4  $1.10          total_value  $58.40
//!   (none)   Gift    qty  8  $3.00          categories   Grocery   16u  $34.40  58.90%
//!                                                        Uncategorized 8u  $24.00  41.10%
//!                                           low_stock    [Sugar]
//! ```
//!
//! Row value is `price × quantity`, the same figure the backend's report
//! endpoint sums.

use serde::Serialize;

use crate::money::Money;
use crate::types::InventoryRecord;
use crate::{LOW_STOCK_THRESHOLD, UNCATEGORIZED};

/// Units and value of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub units: i64,
    pub value: Money,
    /// Share of the report's total value, in basis points.
    pub share_bps: u32,
    pub product_count: usize,
}

impl CategorySummary {
    /// Share as a percentage with two decimals, e.g. `58.90`.
    pub fn share_percent(&self) -> f64 {
        self.share_bps as f64 / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryReport {
    pub total_units: i64,
    pub total_value: Money,
    /// In order of first appearance.
    pub categories: Vec<CategorySummary>,
    /// Rows at or below the low-stock threshold.
    pub low_stock: Vec<InventoryRecord>,
}

impl InventoryReport {
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        let mut categories: Vec<CategorySummary> = Vec::new();
        let mut total_units = 0;
        let mut total_value = Money::zero();
        let mut low_stock = Vec::new();

        for record in records {
            let name = record
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(UNCATEGORIZED);
            let value = record.stock_value();

            let pos = match categories.iter().position(|c| c.name == name) {
                Some(pos) => pos,
                None => {
                    categories.push(CategorySummary {
                        name: name.to_string(),
                        units: 0,
                        value: Money::zero(),
                        share_bps: 0,
                        product_count: 0,
                    });
                    categories.len() - 1
                }
            };
            let summary = &mut categories[pos];
            summary.units += record.quantity;
            summary.value += value;
            summary.product_count += 1;

            total_units += record.quantity;
            total_value += value;

            if record.quantity <= LOW_STOCK_THRESHOLD {
                low_stock.push(record.clone());
            }
        }

        for summary in &mut categories {
            summary.share_bps = summary.value.share_bps_of(total_value);
        }

        InventoryReport {
            total_units,
            total_value,
            categories,
            low_stock,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BranchId, ProductId};

    fn row(id: i64, name: &str, category: Option<&str>, qty: i64, cents: i64) -> InventoryRecord {
        let mut record = InventoryRecord::stock(BranchId(1), ProductId(id), qty);
        record.product_name = name.to_string();
        record.category = category.map(str::to_string);
        record.price = Money::from_cents(cents);
        record
    }

    #[test]
    fn test_groups_by_category() {
        let rows = vec![
            row(1, "Yerba", Some("Grocery"), 12, 250),
            row(2, "Sugar", Some("Grocery"), 4, 110),
            row(3, "Gift card", None, 8, 300),
        ];
        let report = InventoryReport::from_records(&rows);

        assert_eq!(report.total_units, 24);
        assert_eq!(report.total_value.cents(), 5840);
        assert_eq!(report.categories.len(), 2);

        let grocery = &report.categories[0];
        assert_eq!(grocery.name, "Grocery");
        assert_eq!(grocery.units, 16);
        assert_eq!(grocery.value.cents(), 3440);
        assert_eq!(grocery.product_count, 2);
        assert_eq!(grocery.share_bps, 5890);

        let other = &report.categories[1];
        assert_eq!(other.name, UNCATEGORIZED);
        assert_eq!(other.share_bps, 4110);
    }

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        let rows = vec![
            row(1, "A", None, 5, 100),
            row(2, "B", None, 6, 100),
            row(3, "C", None, 0, 100),
        ];
        let report = InventoryReport::from_records(&rows);
        let low: Vec<_> = report.low_stock.iter().map(|r| r.product_id).collect();
        assert_eq!(low, vec![ProductId(1), ProductId(3)]);
    }

    #[test]
    fn test_empty_report() {
        let report = InventoryReport::from_records(&[]);
        assert!(report.is_empty());
        assert!(report.total_value.is_zero());
        assert!(report.low_stock.is_empty());
    }

    #[test]
    fn test_blank_category_counts_as_uncategorized() {
        let rows = vec![row(1, "A", Some("  "), 1, 100), row(2, "B", None, 1, 100)];
        let report = InventoryReport::from_records(&rows);
        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories[0].share_bps, 10_000);
    }
}

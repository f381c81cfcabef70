//! # Inventory Snapshot
//!
//! A point-in-time copy of one branch's stock, taken when the branch is
//! selected. The draft checks every add against it.
//!
//! ```text
//! GET /inventory?branch_id=1
//!         │
//!         ▼
//!   [InventoryRecord, ...]  ──► InventorySnapshot { branch_id: 1, index }
//!                                        │
//!                     available(product) ┘  (0 when the product is absent)
//! ```
//!
//! The snapshot is owned, not a live view. Stock can change on the server
//! between the snapshot and submission; the backend re-checks on `POST /sales`.

use std::collections::HashMap;

use crate::types::{BranchId, InventoryRecord, ProductId};

/// Stock of a single branch, indexed by product.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySnapshot {
    branch_id: BranchId,
    records: Vec<InventoryRecord>,
    index: HashMap<ProductId, usize>,
}

impl InventorySnapshot {
    /// Builds a snapshot for `branch_id`.
    ///
    /// Rows for other branches are dropped. If the backend returns the same
    /// product twice, the later row wins.
    pub fn new(branch_id: BranchId, records: Vec<InventoryRecord>) -> Self {
        let mut kept: Vec<InventoryRecord> = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for record in records.into_iter().filter(|r| r.branch_id == branch_id) {
            match index.get(&record.product_id) {
                Some(&pos) => kept[pos] = record,
                None => {
                    index.insert(record.product_id, kept.len());
                    kept.push(record);
                }
            }
        }

        InventorySnapshot {
            branch_id,
            records: kept,
            index,
        }
    }

    /// A snapshot with no stock at all (used when the lookup failed).
    pub fn empty(branch_id: BranchId) -> Self {
        InventorySnapshot {
            branch_id,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    /// Units available for `product_id`; 0 when the branch has no row for it.
    pub fn available(&self, product_id: ProductId) -> i64 {
        self.record(product_id).map(|r| r.quantity.max(0)).unwrap_or(0)
    }

    pub fn record(&self, product_id: ProductId) -> Option<&InventoryRecord> {
        self.index.get(&product_id).map(|&pos| &self.records[pos])
    }

    /// All rows, in the order the backend returned them.
    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    /// Rows with positive stock.
    pub fn in_stock(&self) -> impl Iterator<Item = &InventoryRecord> {
        self.records.iter().filter(|r| r.quantity > 0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_defaults_to_zero() {
        let branch = BranchId(1);
        let snapshot = InventorySnapshot::new(
            branch,
            vec![
                InventoryRecord::stock(branch, ProductId(10), 3),
                InventoryRecord::stock(branch, ProductId(11), 0),
            ],
        );

        assert_eq!(snapshot.available(ProductId(10)), 3);
        assert_eq!(snapshot.available(ProductId(11)), 0);
        assert_eq!(snapshot.available(ProductId(99)), 0);
        assert_eq!(snapshot.in_stock().count(), 1);
    }

    #[test]
    fn test_foreign_branch_rows_are_dropped() {
        let snapshot = InventorySnapshot::new(
            BranchId(1),
            vec![
                InventoryRecord::stock(BranchId(1), ProductId(10), 3),
                InventoryRecord::stock(BranchId(2), ProductId(11), 8),
            ],
        );

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.available(ProductId(11)), 0);
    }

    #[test]
    fn test_duplicate_rows_last_wins() {
        let branch = BranchId(4);
        let snapshot = InventorySnapshot::new(
            branch,
            vec![
                InventoryRecord::stock(branch, ProductId(10), 3),
                InventoryRecord::stock(branch, ProductId(10), 7),
            ],
        );

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.available(ProductId(10)), 7);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = InventorySnapshot::empty(BranchId(2));
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.branch_id(), BranchId(2));
        assert_eq!(snapshot.available(ProductId(1)), 0);
    }
}

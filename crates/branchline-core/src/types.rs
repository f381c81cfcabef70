//! # Domain Types
//!
//! Identifiers and the read-only records the ERP backend supplies.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ InventoryRecord │   │     Branch      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  branch_id      │   │  id             │       │
//! │  │  name           │   │  product_id     │   │  name           │       │
//! │  │  price          │   │  quantity       │   │  address?       │       │
//! │  │  category?      │   │  + projection   │   │  manager?       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   SaleRecord    │   │SaleConfirmation │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  id, branch     │   │  sale_id        │                             │
//! │  │  items[]        │   │  status?        │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Projections
//! Inventory rows and sale records arrive already joined by the backend
//! (branch name, product name, category). They are consumed as-is; nothing in
//! this crate recomputes them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::{as_decimal, Money};
use crate::validation::as_sale_date;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                $name(id)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map($name)
            }
        }
    };
}

id_type!(
    /// Backend identifier of a branch (store location).
    BranchId
);
id_type!(
    /// Backend identifier of a catalog product.
    ProductId
);
id_type!(
    /// Identifier the backend assigns to an accepted sale.
    SaleId
);

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Current catalog price. Non-negative.
    #[serde(with = "as_decimal")]
    #[ts(type = "number")]
    pub price: Money,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,
}

// =============================================================================
// Branch
// =============================================================================

/// A store location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub manager: Option<String>,
}

// =============================================================================
// Inventory Record
// =============================================================================

/// Stock of one product at one branch, as returned by `GET /inventory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryRecord {
    pub branch_id: BranchId,
    pub product_id: ProductId,

    /// Units available at the moment of the query.
    pub quantity: i64,

    #[serde(default)]
    pub product_name: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(with = "as_decimal", default)]
    #[ts(type = "number")]
    pub price: Money,

    #[serde(with = "as_decimal", default)]
    #[ts(type = "number")]
    pub total_value: Money,

    #[serde(default)]
    pub branch_name: Option<String>,

    #[serde(default)]
    pub last_updated: Option<String>,
}

impl InventoryRecord {
    /// A bare stock row with no projection fields.
    pub fn stock(branch_id: BranchId, product_id: ProductId, quantity: i64) -> Self {
        InventoryRecord {
            branch_id,
            product_id,
            quantity,
            product_name: String::new(),
            category: None,
            price: Money::zero(),
            total_value: Money::zero(),
            branch_name: None,
            last_updated: None,
        }
    }

    /// Stock value of this row (`price × quantity`).
    pub fn stock_value(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale Records
// =============================================================================

/// Response of `POST /sales` when the backend accepts a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleConfirmation {
    pub sale_id: SaleId,
    #[serde(default)]
    pub status: Option<String>,
}

/// A stored sale, as returned by `GET /sales/{id}` and `GET /sales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    pub id: SaleId,
    pub branch_id: BranchId,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(with = "as_sale_date")]
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    #[serde(with = "as_decimal", default)]
    #[ts(type = "number")]
    pub total_amount: Money,
    #[serde(default)]
    pub created_by_username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<SaleRecordItem>,
}

impl SaleRecord {
    /// Sum of the stored line totals.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(SaleRecordItem::line_total).sum()
    }
}

/// One stored line of a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecordItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(with = "as_decimal")]
    #[ts(type = "number")]
    pub price: Money,
    pub quantity: i64,
}

impl SaleRecordItem {
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_transparent() {
        let id: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(id, ProductId(42));
        assert_eq!(serde_json::to_string(&BranchId(3)).unwrap(), "3");
        assert_eq!("17".parse::<SaleId>().unwrap(), SaleId(17));
        assert!("abc".parse::<BranchId>().is_err());
    }

    #[test]
    fn test_product_from_backend_json() {
        let json = r#"{"id": 5, "name": "Yerba 500g", "price": 1899.5, "category": null}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId(5));
        assert_eq!(product.price.cents(), 189_950);
        assert_eq!(product.category, None);
        assert_eq!(product.description, None);
    }

    #[test]
    fn test_inventory_record_projection() {
        let json = r#"{
            "branch_id": 1, "product_id": 5, "product_name": "Yerba 500g",
            "category": "Almacén", "quantity": 12, "price": 10.25,
            "total_value": 123.0, "branch_name": "Centro",
            "last_updated": "2024-03-01 10:00:00"
        }"#;
        let record: InventoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.quantity, 12);
        assert_eq!(record.stock_value().cents(), 12_300);
        assert_eq!(record.total_value.cents(), 12_300);
        assert_eq!(record.branch_name.as_deref(), Some("Centro"));
    }

    #[test]
    fn test_sale_record_items_total() {
        let json = r#"{
            "id": 9, "branch_id": 1, "branch_name": "Centro", "sale_date": "2024-03-01",
            "created_by_username": "admin", "created_at": "2024-03-01 10:00:00",
            "items": [
                {"id": 1, "product_id": 5, "product_name": "Yerba", "category": null, "price": 2.5, "quantity": 4},
                {"id": 2, "product_id": 6, "product_name": "Azúcar", "category": "Almacén", "price": 1.1, "quantity": 1}
            ]
        }"#;
        let sale: SaleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(sale.id, SaleId(9));
        assert_eq!(sale.sale_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(sale.items.len(), 2);
        assert_eq!(sale.items_total().cents(), 1110);
        assert!(sale.total_amount.is_zero());
    }

    #[test]
    fn test_sale_record_rejects_malformed_date() {
        let json = r#"{"id": 9, "branch_id": 1, "sale_date": "1/3/2024", "items": []}"#;
        assert!(serde_json::from_str::<SaleRecord>(json).is_err());
    }

    #[test]
    fn test_read_models_saturate_instead_of_overflowing() {
        let item = SaleRecordItem {
            id: None,
            product_id: ProductId(1),
            product_name: "Bulk".to_string(),
            category: None,
            price: Money::from_cents(i64::MAX / 2),
            quantity: 3,
        };
        assert_eq!(item.line_total().cents(), i64::MAX);
    }
}

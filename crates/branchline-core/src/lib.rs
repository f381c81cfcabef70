//! # branchline-core: Pure Business Logic for Branchline
//!
//! This crate is the heart of the Branchline sales client. It holds the draft
//! sale aggregate and every rule it enforces, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Branchline Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (CLI / UI)                         │   │
//! │  │    Branch Picker ──► Product Picker ──► Draft Table ──► Submit  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              branchline-client (SaleBuilder, ApiClient)         │   │
//! │  │    select_branch, add_item, remove_item, submit                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ branchline-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   draft   │  │ inventory │  │   │
//! │  │   │  Product  │  │   Money   │  │ DraftSale │  │ Snapshot  │  │   │
//! │  │   │  Branch   │  │ as_decimal│  │ LineItem  │  │  Report   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO FILES • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Ids and read-only records supplied by the backend
//! - [`money`] - Money type with integer arithmetic and a decimal wire adapter
//! - [`draft`] - The draft sale aggregate and its submission payload
//! - [`inventory`] - Per-branch inventory snapshot
//! - [`catalog`] - Pure product/inventory filters and the product picker join
//! - [`report`] - Inventory grouping by category
//! - [`metrics`] - Sales metrics and branch performance read models
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use branchline_core::{BranchId, DraftSale, InventoryRecord, InventorySnapshot, Money, Product, ProductId};
//!
//! let branch = BranchId(1);
//! let coffee = Product {
//!     id: ProductId(7),
//!     name: "Coffee beans 1kg".to_string(),
//!     price: Money::from_cents(1250),
//!     description: None,
//!     category: Some("Grocery".to_string()),
//! };
//! let snapshot = InventorySnapshot::new(branch, vec![InventoryRecord::stock(branch, coffee.id, 3)]);
//!
//! let mut draft = DraftSale::new();
//! draft.reset_for_branch(branch);
//! draft.add_item(&coffee, 2, &snapshot).unwrap();
//!
//! assert_eq!(draft.total().cents(), 2500);
//! assert!(draft.add_item(&coffee, 2, &snapshot).is_err()); // 2 + 2 > 3
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod draft;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{AvailableProduct, InventoryFilter, ProductFilter};
pub use draft::{DraftField, DraftSale, LineChange, NewSaleItem, NewSalePayload, SaleLineItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::InventorySnapshot;
pub use metrics::{BranchPerformance, BranchStats, PeriodSales, SalesMetrics, SalesPeriod, TopProduct};
pub use money::Money;
pub use report::{CategorySummary, InventoryReport};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level at or below which an inventory row is reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Category label used when a product or inventory row has none.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Maximum length of a free-text search term.
pub const MAX_SEARCH_LEN: usize = 100;

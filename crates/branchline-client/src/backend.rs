//! # Backend Collaborators
//!
//! The three calls the sale workflow depends on, as object-safe async traits.
//! [`crate::ApiClient`] implements all of them over HTTP; tests substitute
//! in-memory fakes.
//!
//! ```text
//!   SaleBuilder ──► Arc<dyn ErpBackend>
//!                        ├── InventoryLookup   branch → stock rows
//!                        ├── ProductCatalog    filter → products
//!                        └── SalesEndpoint     payload → sale id | error
//! ```

use async_trait::async_trait;

use branchline_core::{BranchId, InventoryRecord, NewSalePayload, Product, ProductFilter, SaleConfirmation};

use crate::error::ClientResult;

/// Branch id → stock quantity per product.
#[async_trait]
pub trait InventoryLookup: Send + Sync {
    async fn branch_inventory(&self, branch_id: BranchId) -> ClientResult<Vec<InventoryRecord>>;
}

/// Optional name/category filter → product records.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn products(&self, filter: &ProductFilter) -> ClientResult<Vec<Product>>;
}

/// Accepts a finalized payload; returns a sale id or the backend's refusal.
#[async_trait]
pub trait SalesEndpoint: Send + Sync {
    async fn submit_sale(&self, payload: &NewSalePayload) -> ClientResult<SaleConfirmation>;
}

/// Everything the sale builder needs from the backend.
pub trait ErpBackend: InventoryLookup + ProductCatalog + SalesEndpoint {}

impl<T> ErpBackend for T where T: InventoryLookup + ProductCatalog + SalesEndpoint {}

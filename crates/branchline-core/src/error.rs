//! # Error Types
//!
//! Domain-specific error types for branchline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  branchline-core errors (this file)                                    │
//! │  ├── CoreError        - Draft rule violations (local, no network)      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  branchline-client errors (separate crate)                             │
//! │  ├── ClientError      - Transport / backend failures                   │
//! │  └── SaleError        - What the SaleBuilder returns                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SaleError → caller                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is raised before any mutation happens, so a failed
//! operation always leaves the draft exactly as it was.

use thiserror::Error;

use crate::draft::DraftField;
use crate::types::{BranchId, ProductId};

// =============================================================================
// Core Error
// =============================================================================

/// Draft sale rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Adding the requested quantity would exceed the branch stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Snapshot: available = 3, draft already holds 2
    ///      │
    ///      ▼
    /// add_item(qty: 2)  →  2 + 2 > 3
    ///      │
    ///      ▼
    /// InsufficientStock { available: 3, requested: 2, in_draft: 2 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient stock. Available: 3"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested} (already in sale: {in_draft})")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
        in_draft: i64,
    },

    /// Requested quantity is zero or negative.
    #[error("Invalid quantity {quantity}: must be at least 1")]
    InvalidQuantity { quantity: i64 },

    /// The draft is missing something required for submission.
    #[error("Sale is incomplete: {missing}")]
    IncompleteDraft { missing: DraftField },

    /// The line total or the sale total would not fit in a `Money`.
    #[error("Sale total for product {product_id} exceeds the largest supported amount")]
    AmountOverflow { product_id: ProductId },

    /// No line for this product exists in the draft.
    #[error("Product {0} is not in the sale")]
    LineNotFound(ProductId),

    /// Items cannot be added before a branch is selected.
    #[error("No branch selected")]
    NoBranchSelected,

    /// The inventory snapshot belongs to a different branch than the draft.
    #[error("Inventory snapshot is for branch {snapshot}, but the sale is for branch {draft}")]
    SnapshotBranchMismatch { draft: BranchId, snapshot: BranchId },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// The available stock carried by an `InsufficientStock` error.
    pub fn available_stock(&self) -> Option<i64> {
        match self {
            CoreError::InsufficientStock { available, .. } => Some(*available),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is below the allowed minimum.
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: String, min: i64 },

    /// Invalid format (e.g., invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

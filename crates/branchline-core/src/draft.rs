//! # Draft Sale
//!
//! The in-progress sale: line items built against one branch's inventory
//! snapshot, and the payload it turns into on submission.
//!
//! ## Draft Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   DraftSale::new()                                                      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   reset_for_branch(b) ◄──────────── branch change: lines discarded      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   add_item / remove_item   (stock ceiling, one line per product)        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   to_payload() ──► NewSalePayload ──► POST /sales                       │
//! │        │                                   │                            │
//! │        │                 accepted ─────────┴──────── rejected           │
//! │        ▼                     │                          │               │
//! │     clear()  ◄───────────────┘            draft left untouched          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product. Adding an existing product merges.
//! - Merged quantity never exceeds the snapshot stock for that product.
//! - The total is recomputed from the lines on every call, never stored.
//! - A rejected operation leaves the draft exactly as it was.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::inventory::InventorySnapshot;
use crate::money::{as_decimal, Money};
use crate::types::{BranchId, Product, ProductId};
use crate::validation::{as_sale_date, validate_price, validate_quantity};

// =============================================================================
// Line Item
// =============================================================================

/// One product in the draft.
///
/// `product_name` and `unit_price` are copied from the catalog when the line
/// is first added; later catalog changes do not reach an existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl SaleLineItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// What `add_item` did to the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// A new line was appended.
    Added,
    /// An existing line grew; `quantity` is its new total.
    Merged { quantity: i64 },
}

/// The part of a draft that is missing for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DraftField {
    Branch,
    SaleDate,
    LineItems,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DraftField::Branch => "a branch",
            DraftField::SaleDate => "a sale date",
            DraftField::LineItems => "at least one line item",
        };
        f.write_str(text)
    }
}

// =============================================================================
// Draft Sale
// =============================================================================

/// The draft sale aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DraftSale {
    /// Correlation id for logs. Regenerated whenever the draft starts over.
    #[ts(as = "String")]
    id: Uuid,
    branch_id: Option<BranchId>,
    #[ts(as = "Option<String>")]
    sale_date: Option<NaiveDate>,
    line_items: Vec<SaleLineItem>,
}

impl Default for DraftSale {
    fn default() -> Self {
        DraftSale::new()
    }
}

impl DraftSale {
    /// An empty draft with no branch and no date.
    pub fn new() -> Self {
        DraftSale {
            id: Uuid::new_v4(),
            branch_id: None,
            sale_date: None,
            line_items: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn branch_id(&self) -> Option<BranchId> {
        self.branch_id
    }

    pub fn sale_date(&self) -> Option<NaiveDate> {
        self.sale_date
    }

    /// Lines in insertion order (display order).
    pub fn line_items(&self) -> &[SaleLineItem] {
        &self.line_items
    }

    pub fn line(&self, product_id: ProductId) -> Option<&SaleLineItem> {
        self.line_items.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Points the draft at `branch_id`.
    ///
    /// Always discards every line, even when the branch is unchanged, since
    /// the caller is about to replace the snapshot the lines were checked
    /// against.
    pub fn reset_for_branch(&mut self, branch_id: BranchId) {
        self.id = Uuid::new_v4();
        self.branch_id = Some(branch_id);
        self.line_items.clear();
    }

    pub fn set_sale_date(&mut self, date: NaiveDate) {
        self.sale_date = Some(date);
    }

    /// Adds `quantity` units of `product`, merging into an existing line.
    ///
    /// ## Checks (in order)
    /// 1. a branch is selected
    /// 2. `snapshot` belongs to that branch
    /// 3. `quantity >= 1` and the product price is not negative
    /// 4. `already in draft + quantity <= snapshot stock`
    /// 5. the line total and the sale total still fit in a `Money`
    ///
    /// Nothing is modified unless every check passes.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
        snapshot: &InventorySnapshot,
    ) -> CoreResult<LineChange> {
        let branch_id = self.branch_id.ok_or(CoreError::NoBranchSelected)?;

        if snapshot.branch_id() != branch_id {
            return Err(CoreError::SnapshotBranchMismatch {
                draft: branch_id,
                snapshot: snapshot.branch_id(),
            });
        }

        validate_quantity(quantity).map_err(|_| CoreError::InvalidQuantity { quantity })?;
        validate_price(product.price)?;

        let available = snapshot.available(product.id);
        let position = self
            .line_items
            .iter()
            .position(|l| l.product_id == product.id);
        let in_draft = position.map(|i| self.line_items[i].quantity).unwrap_or(0);

        let merged = match in_draft.checked_add(quantity) {
            Some(total) if total <= available => total,
            _ => {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    available,
                    requested: quantity,
                    in_draft,
                })
            }
        };

        let unit_price = position
            .map(|i| self.line_items[i].unit_price)
            .unwrap_or(product.price);
        let overflow = CoreError::AmountOverflow {
            product_id: product.id,
        };
        let line_total = unit_price.checked_mul(merged).ok_or(overflow.clone())?;
        let other_lines = self
            .line_items
            .iter()
            .enumerate()
            .filter(|&(i, _)| Some(i) != position)
            .map(|(_, l)| l.line_total());
        Money::checked_sum(other_lines.chain(std::iter::once(line_total))).ok_or(overflow)?;

        match position {
            Some(i) => {
                self.line_items[i].quantity = merged;
                Ok(LineChange::Merged { quantity: merged })
            }
            None => {
                self.line_items.push(SaleLineItem {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    unit_price: product.price,
                    quantity,
                });
                Ok(LineChange::Added)
            }
        }
    }

    /// Removes the whole line for `product_id`.
    pub fn remove_item(&mut self, product_id: ProductId) -> CoreResult<SaleLineItem> {
        let position = self
            .line_items
            .iter()
            .position(|l| l.product_id == product_id)
            .ok_or(CoreError::LineNotFound(product_id))?;
        Ok(self.line_items.remove(position))
    }

    /// Σ unit_price × quantity over the current lines.
    pub fn total(&self) -> Money {
        self.line_items.iter().map(SaleLineItem::line_total).sum()
    }

    /// Builds the `POST /sales` body.
    ///
    /// Fails with `IncompleteDraft` naming the first missing part
    /// (branch, then date, then lines).
    pub fn to_payload(&self) -> CoreResult<NewSalePayload> {
        let branch_id = self.branch_id.ok_or(CoreError::IncompleteDraft {
            missing: DraftField::Branch,
        })?;
        let sale_date = self.sale_date.ok_or(CoreError::IncompleteDraft {
            missing: DraftField::SaleDate,
        })?;
        if self.line_items.is_empty() {
            return Err(CoreError::IncompleteDraft {
                missing: DraftField::LineItems,
            });
        }

        Ok(NewSalePayload {
            branch_id,
            sale_date,
            total_amount: self.total(),
            items: self
                .line_items
                .iter()
                .map(|l| NewSaleItem {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    price: l.unit_price,
                })
                .collect(),
        })
    }

    /// Starts over: no branch, no date, no lines, fresh id.
    pub fn clear(&mut self) {
        self.id = Uuid::new_v4();
        self.branch_id = None;
        self.sale_date = None;
        self.line_items.clear();
    }
}

// =============================================================================
// Submission Payload
// =============================================================================

/// Body of `POST /sales`.
///
/// ```json
/// {"branch_id": 1, "sale_date": "2024-03-01", "total_amount": 37.5,
///  "items": [{"product_id": 7, "quantity": 3, "price": 12.5}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSalePayload {
    pub branch_id: BranchId,
    #[serde(with = "as_sale_date")]
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    #[serde(with = "as_decimal")]
    #[ts(type = "number")]
    pub total_amount: Money,
    pub items: Vec<NewSaleItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSaleItem {
    pub product_id: ProductId,
    pub quantity: i64,
    #[serde(with = "as_decimal")]
    #[ts(type = "number")]
    pub price: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

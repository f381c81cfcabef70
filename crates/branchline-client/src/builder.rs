//! # Sale Builder
//!
//! Drives one draft sale from branch selection to a confirmed sale id.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌───────┐  select_branch   ┌────────────────┐  add_item  ┌──────────┐ │
//! │   │ Empty │ ───────────────► │ BranchSelected │ ─────────► │ HasItems │ │
//! │   └───────┘                  └────────────────┘ ◄───────── └────┬─────┘ │
//! │       ▲                         ▲   (branch change,   remove    │       │
//! │       │                         │    last line removed)         │submit │
//! │       │ start_new_sale          │                               ▼       │
//! │   ┌───┴───────┐   accepted   ┌──┴──────────┐    rejected   ┌──────────┐ │
//! │   │ Submitted │ ◄─────────── │ Submitting  │ ────────────► │ HasItems │ │
//! │   └───────────┘              └─────────────┘  (draft kept) └──────────┘ │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating call takes `&mut self`, so two operations can never
//! interleave on the same draft. Draft rules are checked locally before any
//! request is made; the backend is only contacted to fetch inventory and
//! catalog data and to submit.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use branchline_core::catalog::available_products;
use branchline_core::{
    AvailableProduct, BranchId, CoreError, DraftSale, InventorySnapshot, LineChange, Money,
    Product, ProductFilter, ProductId, SaleConfirmation, SaleLineItem,
};

use crate::backend::ErpBackend;
use crate::error::SaleError;
use crate::session::{Identity, Session};

/// Where the builder is in the sale lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// No branch selected.
    Empty,
    /// Branch selected, no lines yet.
    BranchSelected,
    /// At least one line.
    HasItems,
    /// A submission is in flight.
    Submitting,
    /// The last submission was accepted; the draft has been cleared.
    Submitted,
}

/// Owns one draft sale and the inventory snapshot it is checked against.
pub struct SaleBuilder {
    backend: Arc<dyn ErpBackend>,
    identity: Option<Identity>,
    draft: DraftSale,
    snapshot: Option<InventorySnapshot>,
    catalog: Vec<Product>,
    state: BuilderState,
    last_confirmation: Option<SaleConfirmation>,
}

impl SaleBuilder {
    /// A builder with an empty draft dated today.
    ///
    /// Non-admin identities with an assigned branch can only sell there.
    pub fn new(backend: Arc<dyn ErpBackend>, session: &Session) -> Self {
        let mut draft = DraftSale::new();
        draft.set_sale_date(today());

        SaleBuilder {
            backend,
            identity: session.identity().cloned(),
            draft,
            snapshot: None,
            catalog: Vec::new(),
            state: BuilderState::Empty,
            last_confirmation: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn draft(&self) -> &DraftSale {
        &self.draft
    }

    pub fn line_items(&self) -> &[SaleLineItem] {
        self.draft.line_items()
    }

    pub fn snapshot(&self) -> Option<&InventorySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    /// The branch this builder is restricted to, if any.
    pub fn branch_scope(&self) -> Option<BranchId> {
        self.identity.as_ref().and_then(Identity::branch_scope)
    }

    /// Confirmation of the most recent accepted sale.
    pub fn last_confirmation(&self) -> Option<&SaleConfirmation> {
        self.last_confirmation.as_ref()
    }

    /// Σ unit_price × quantity over the current lines.
    pub fn total(&self) -> Money {
        self.draft.total()
    }

    /// Products the selected branch has in stock, with their stock.
    pub fn available_products(&self) -> Vec<AvailableProduct> {
        match &self.snapshot {
            Some(snapshot) => available_products(&self.catalog, snapshot),
            None => Vec::new(),
        }
    }

    // =========================================================================
    // Workflow
    // =========================================================================

    /// Loads the full catalog and, for a branch-scoped identity, selects its
    /// branch.
    ///
    /// The branch is selected even when the catalog fails to load; the
    /// catalog error is returned afterwards.
    pub async fn start(&mut self) -> Result<(), SaleError> {
        let catalog = self.load_catalog(&ProductFilter::all()).await;

        if let Some(branch_id) = self.branch_scope() {
            self.select_branch(branch_id).await?;
        }

        catalog.map(|_| ())
    }

    /// Fetches products into the builder's catalog. On failure the catalog is
    /// left empty.
    pub async fn load_catalog(&mut self, filter: &ProductFilter) -> Result<usize, SaleError> {
        match self.backend.products(filter).await {
            Ok(products) => {
                debug!(count = products.len(), "Catalog loaded");
                self.catalog = products;
                Ok(self.catalog.len())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load catalog");
                self.catalog.clear();
                Err(SaleError::CatalogUnavailable(e))
            }
        }
    }

    /// Points the draft at `branch_id` and replaces the inventory snapshot.
    ///
    /// Lines are always discarded. If the lookup fails the builder stays in
    /// `BranchSelected` with an empty snapshot, so every add fails with
    /// `InsufficientStock` until the branch is selected again.
    pub async fn select_branch(&mut self, branch_id: BranchId) -> Result<usize, SaleError> {
        if let Some(identity) = &self.identity {
            if let (false, Some(allowed)) =
                (identity.may_sell_at(branch_id), identity.branch_scope())
            {
                return Err(SaleError::BranchNotPermitted {
                    requested: branch_id,
                    allowed,
                });
            }
        }

        self.draft.reset_for_branch(branch_id);
        self.snapshot = None;
        self.state = BuilderState::BranchSelected;

        info!(draft_id = %self.draft.id(), branch_id = %branch_id, "Branch selected");

        match self.backend.branch_inventory(branch_id).await {
            Ok(records) => {
                let snapshot = InventorySnapshot::new(branch_id, records);
                debug!(
                    branch_id = %branch_id,
                    rows = snapshot.len(),
                    in_stock = snapshot.in_stock().count(),
                    "Inventory snapshot taken"
                );
                let rows = snapshot.len();
                self.snapshot = Some(snapshot);
                Ok(rows)
            }
            Err(e) => {
                warn!(branch_id = %branch_id, error = %e, "Inventory lookup failed");
                self.snapshot = Some(InventorySnapshot::empty(branch_id));
                Err(SaleError::InventoryUnavailable(e))
            }
        }
    }

    pub fn set_sale_date(&mut self, date: NaiveDate) {
        self.draft.set_sale_date(date);
    }

    /// Adds `quantity` units of `product`, merging with an existing line.
    ///
    /// Purely local: checked against the snapshot taken at branch selection.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> Result<LineChange, SaleError> {
        let snapshot = self.snapshot.as_ref().ok_or(CoreError::NoBranchSelected)?;
        let change = self.draft.add_item(product, quantity, snapshot)?;

        debug!(
            draft_id = %self.draft.id(),
            product_id = %product.id,
            quantity,
            ?change,
            "Line item added"
        );
        self.state = BuilderState::HasItems;
        Ok(change)
    }

    /// Like [`add_item`](Self::add_item), looking the product up by id.
    ///
    /// Uses the loaded catalog first, then the inventory row's projection
    /// (name, price) when the catalog does not have it.
    pub fn add_item_by_id(&mut self, product_id: ProductId, quantity: i64) -> Result<LineChange, SaleError> {
        let product = self.resolve_product(product_id);
        self.add_item(&product, quantity)
    }

    /// Removes the whole line for `product_id`.
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<SaleLineItem, SaleError> {
        let removed = self.draft.remove_item(product_id)?;
        debug!(draft_id = %self.draft.id(), product_id = %product_id, "Line item removed");

        if self.draft.is_empty() {
            self.state = BuilderState::BranchSelected;
        }
        Ok(removed)
    }

    /// Sends the draft to the backend.
    ///
    /// An incomplete draft is rejected before any request. On success the
    /// draft is cleared (no branch, today's date, no lines). On failure the
    /// draft is left exactly as it was so the user can adjust and resubmit;
    /// nothing is retried automatically.
    pub async fn submit(&mut self) -> Result<SaleConfirmation, SaleError> {
        let payload = self.draft.to_payload()?;

        self.state = BuilderState::Submitting;
        info!(
            draft_id = %self.draft.id(),
            branch_id = %payload.branch_id,
            items = payload.items.len(),
            total = %payload.total_amount,
            "Submitting sale"
        );

        match self.backend.submit_sale(&payload).await {
            Ok(confirmation) => {
                info!(
                    draft_id = %self.draft.id(),
                    sale_id = %confirmation.sale_id,
                    "Sale registered"
                );
                self.draft.clear();
                self.draft.set_sale_date(today());
                self.snapshot = None;
                self.state = BuilderState::Submitted;
                self.last_confirmation = Some(confirmation.clone());
                Ok(confirmation)
            }
            Err(e) => {
                warn!(draft_id = %self.draft.id(), error = %e, "Sale rejected");
                self.state = BuilderState::HasItems;
                Err(SaleError::SubmissionFailed(e))
            }
        }
    }

    /// Begins a fresh draft after a sale. A branch-scoped identity gets its
    /// branch selected again.
    pub async fn start_new_sale(&mut self) -> Result<(), SaleError> {
        self.draft.clear();
        self.draft.set_sale_date(today());
        self.snapshot = None;
        self.state = BuilderState::Empty;

        if let Some(branch_id) = self.branch_scope() {
            self.select_branch(branch_id).await?;
        }
        Ok(())
    }

    fn resolve_product(&self, product_id: ProductId) -> Product {
        if let Some(product) = self.catalog.iter().find(|p| p.id == product_id) {
            return product.clone();
        }

        let record = self.snapshot.as_ref().and_then(|s| s.record(product_id));
        Product {
            id: product_id,
            name: record
                .map(|r| r.product_name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Product {}", product_id)),
            price: record.map(|r| r.price).unwrap_or_default(),
            description: None,
            category: record.and_then(|r| r.category.clone()),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Catalog Filters
//!
//! Pure filtering over already-fetched product and inventory lists, plus the
//! join that feeds the product picker.
//!
//! ## Fetch, Then Filter
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌────────────────────────┐
//! │ ProductFilter│───►│ GET /products?…  │───►│ Vec<Product>           │
//! │  to_query()  │    │ (server filters) │    │                        │
//! └──────────────┘    └──────────────────┘    └───────────┬────────────┘
//!                                                         │ filter_products()
//!                                                         ▼ (same rules, local)
//!                                             ┌────────────────────────┐
//!                                             │ visible products       │
//!                                             └────────────────────────┘
//! ```
//!
//! Both stages apply the same rule: category is an exact match, name is a
//! case-insensitive substring. Empty values mean "no filter".

use std::collections::{BTreeSet, HashMap};

use crate::error::ValidationError;
use crate::inventory::InventorySnapshot;
use crate::types::{InventoryRecord, Product, ProductId};
use crate::validation::validate_search_query;

// =============================================================================
// Product Filter
// =============================================================================

/// Optional name/category filter for the product catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    category: Option<String>,
    name: Option<String>,
}

impl ProductFilter {
    /// Builds a filter from raw user input. Blank values are dropped.
    pub fn new(category: Option<&str>, name: Option<&str>) -> Result<Self, ValidationError> {
        Ok(ProductFilter {
            category: normalize(category)?,
            name: normalize(name)?,
        })
    }

    /// Matches every product.
    pub fn all() -> Self {
        ProductFilter::default()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Query-string pairs for `GET /products`. Unset filters are omitted.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(category) = &self.category {
            query.push(("category", category.clone()));
        }
        if let Some(name) = &self.name {
            query.push(("name", name.clone()));
        }
        query
    }

    pub fn matches(&self, product: &Product) -> bool {
        category_matches(self.category.as_deref(), product.category.as_deref())
            && name_matches(self.name.as_deref(), &product.name)
    }
}

/// Applies `filter` to a fetched product list, preserving order.
pub fn filter_products<'a>(products: &'a [Product], filter: &ProductFilter) -> Vec<&'a Product> {
    products.iter().filter(|p| filter.matches(p)).collect()
}

// =============================================================================
// Inventory Filter
// =============================================================================

/// Category / product-name filter for inventory listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    category: Option<String>,
    product_name: Option<String>,
}

impl InventoryFilter {
    pub fn new(category: Option<&str>, product_name: Option<&str>) -> Result<Self, ValidationError> {
        Ok(InventoryFilter {
            category: normalize(category)?,
            product_name: normalize(product_name)?,
        })
    }

    pub fn matches(&self, record: &InventoryRecord) -> bool {
        category_matches(self.category.as_deref(), record.category.as_deref())
            && name_matches(self.product_name.as_deref(), &record.product_name)
    }
}

pub fn filter_inventory<'a>(
    records: &'a [InventoryRecord],
    filter: &InventoryFilter,
) -> Vec<&'a InventoryRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Distinct, sorted category names (rows without a category are skipped).
pub fn categories<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// Product Picker Join
// =============================================================================

/// A product the branch can sell right now, with its snapshot stock.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableProduct {
    pub product: Product,
    pub stock: i64,
}

/// Inventory rows with stock > 0 joined to the catalog.
///
/// Keeps snapshot order. Rows whose product is missing from `products` are
/// skipped.
pub fn available_products(products: &[Product], snapshot: &InventorySnapshot) -> Vec<AvailableProduct> {
    let by_id: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();

    snapshot
        .in_stock()
        .filter_map(|record| {
            by_id.get(&record.product_id).map(|product| AvailableProduct {
                product: (*product).clone(),
                stock: record.quantity,
            })
        })
        .collect()
}

// =============================================================================
// Helpers
// =============================================================================

fn normalize(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let trimmed = validate_search_query(raw)?;
            Ok(if trimmed.is_empty() { None } else { Some(trimmed) })
        }
    }
}

fn category_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual == Some(wanted),
    }
}

fn name_matches(needle: Option<&str>, haystack: &str) -> bool {
    match needle {
        None => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

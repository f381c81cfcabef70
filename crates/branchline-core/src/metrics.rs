//! # Sales Metrics
//!
//! Read models for the backend's reporting endpoints. The backend does the
//! aggregation; this module only types the result and derives the figures
//! the reports show next to it.
//!
//! ```text
//! GET /metrics/sales?period=monthly&branch_id=2      GET /metrics/performance
//!        │                                                  │
//!        ▼                                                  ▼
//! SalesMetrics                                       BranchPerformance
//!   total_sales / total_transactions                   active / total branches
//!   period_sales: [PeriodSales]  (oldest first)        branch_data: [BranchStats]
//!   top_products: [TopProduct]   (top 10 by amount)      (by total amount, desc)
//! ```
//!
//! Non-admin users only ever get their own branch back, whatever they ask for.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{as_decimal, Money};
use crate::types::{BranchId, ProductId};
use crate::validation::as_sale_date;

// =============================================================================
// Period
// =============================================================================

/// Bucket size for `GET /metrics/sales`. Each period also fixes how far back
/// the backend looks: 30 days, 12 weeks, 12 months or 5 years.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SalesPeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl SalesPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesPeriod::Daily => "daily",
            SalesPeriod::Weekly => "weekly",
            SalesPeriod::Monthly => "monthly",
            SalesPeriod::Yearly => "yearly",
        }
    }
}

impl fmt::Display for SalesPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(SalesPeriod::Daily),
            "weekly" => Ok(SalesPeriod::Weekly),
            "monthly" => Ok(SalesPeriod::Monthly),
            "yearly" => Ok(SalesPeriod::Yearly),
            other => Err(ValidationError::InvalidFormat {
                field: "period".to_string(),
                reason: format!("expected daily, weekly, monthly or yearly, got '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Sales Metrics
// =============================================================================

/// Body of `GET /metrics/sales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesMetrics {
    #[serde(with = "as_decimal")]
    #[ts(type = "number")]
    pub total_sales: Money,
    #[serde(default)]
    pub total_transactions: i64,
    /// Units sold across all transactions.
    #[serde(default)]
    pub total_products: i64,
    #[serde(default)]
    pub period_sales: Vec<PeriodSales>,
    #[serde(default)]
    pub top_products: Vec<TopProduct>,
    pub period: SalesPeriod,
    #[serde(with = "as_sale_date")]
    #[ts(as = "String")]
    pub date_from: NaiveDate,
    #[serde(with = "as_sale_date")]
    #[ts(as = "String")]
    pub date_to: NaiveDate,
    /// The branch the figures are restricted to; `None` means all branches.
    #[serde(rename = "branch_id", default)]
    pub branch_id: Option<BranchId>,
}

impl SalesMetrics {
    /// Average amount per transaction, rounded to the cent. Zero when there
    /// were no transactions.
    pub fn average_ticket(&self) -> Money {
        average(self.total_sales, self.total_transactions)
    }

    /// Share of `product` in the period's total sales, in basis points.
    pub fn product_share_bps(&self, product: &TopProduct) -> u32 {
        product.total_amount.share_bps_of(self.total_sales)
    }
}

/// One bucket of the sales trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodSales {
    /// Bucket label: `2024-03-01` (daily, weekly), `2024-03` or `2024`.
    pub period: String,
    #[serde(default)]
    pub period_date: Option<String>,
    #[serde(with = "as_decimal")]
    #[ts(type = "number")]
    pub amount: Money,
    #[serde(default)]
    pub transactions: i64,
    #[serde(default)]
    pub products: i64,
}

/// A best-selling product within the metrics window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub total_quantity: i64,
    #[serde(with = "as_decimal")]
    #[ts(type = "number")]
    pub total_amount: Money,
}

// =============================================================================
// Branch Performance
// =============================================================================

/// Body of `GET /metrics/performance`: the last 30 days, per branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BranchPerformance {
    /// Branches with at least one sale in the window.
    #[serde(default)]
    pub active_branches: i64,
    #[serde(default)]
    pub total_branches: i64,
    #[serde(default)]
    pub branch_data: Vec<BranchStats>,
    #[serde(with = "as_sale_date")]
    #[ts(as = "String")]
    pub date_from: NaiveDate,
    #[serde(with = "as_sale_date")]
    #[ts(as = "String")]
    pub date_to: NaiveDate,
}

impl BranchPerformance {
    /// Combined sales amount of every listed branch.
    pub fn total_amount(&self) -> Money {
        self.branch_data.iter().map(|b| b.total_amount).sum()
    }

    pub fn branch(&self, id: BranchId) -> Option<&BranchStats> {
        self.branch_data.iter().find(|b| b.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BranchStats {
    pub id: BranchId,
    pub name: String,
    #[serde(default)]
    pub manager: Option<String>,
    /// Number of sales (transactions), not an amount.
    #[serde(default)]
    pub total_sales: i64,
    #[serde(with = "as_decimal", default)]
    #[ts(type = "number")]
    pub total_amount: Money,
    #[serde(with = "as_decimal", default)]
    #[ts(type = "number")]
    pub avg_sale: Money,
    #[serde(default)]
    pub sales_per_day: f64,
    #[serde(default)]
    pub unique_products: i64,
    #[serde(default)]
    pub total_products: i64,
    /// Units on hand. Missing when the branch has no inventory rows.
    #[serde(default)]
    pub total_inventory: i64,
    #[serde(with = "as_decimal", default)]
    #[ts(type = "number")]
    pub inventory_value: Money,
}

impl BranchStats {
    pub fn is_active(&self) -> bool {
        self.total_sales > 0
    }
}

/// `total / count` rounded half away from zero; zero for an empty count.
fn average(total: Money, count: i64) -> Money {
    if count <= 0 {
        return Money::zero();
    }
    let cents = total.cents() as i128;
    let count = count as i128;
    let half = if cents < 0 { -(count / 2) } else { count / 2 };
    Money::from_cents(((cents + half) / count) as i64)
}

// =============================================================================
// Unit Tests
// =============================================================================

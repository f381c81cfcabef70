//! # CLI Commands
//!
//! One function per subcommand. Each fetches through [`ApiClient`], applies
//! the pure filters from `branchline-core`, and prints a table (or JSON with
//! `--json`).
//!
//! ## Sell Flow
//! ```text
//! branchline sell --branch 1 --item 10:3 --item 11
//!      │
//!      ▼
//! SaleBuilder::start ──► select_branch(1) ──► add_item_by_id × N ──► submit
//!      │                       │                     │                  │
//!  catalog (optional)   inventory snapshot    local stock checks   POST /sales
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use branchline_client::{ApiClient, InventoryQuery, SaleBuilder, SaleError, SalesQuery, Session};
use branchline_core::catalog::{filter_inventory, filter_products};
use branchline_core::{
    BranchId, BranchPerformance, InventoryFilter, InventoryReport, ProductFilter, ProductId, SaleId,
    SaleRecord, SalesMetrics, SalesPeriod, UNCATEGORIZED,
};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

// =============================================================================
// Lookups
// =============================================================================

pub async fn branches(client: &ApiClient, json: bool) -> Result<()> {
    let branches = client.list_branches().await.context("listing branches")?;
    if json {
        return print_json(&branches);
    }

    println!("{:>5}  {:<24} {:<30} {}", "ID", "NAME", "ADDRESS", "MANAGER");
    for branch in &branches {
        println!(
            "{:>5}  {:<24} {:<30} {}",
            branch.id,
            branch.name,
            or_dash(branch.address.as_deref()),
            or_dash(branch.manager.as_deref())
        );
    }
    Ok(())
}

pub async fn products(client: &ApiClient, category: Option<&str>, name: Option<&str>, json: bool) -> Result<()> {
    let filter = ProductFilter::new(category, name)?;
    let fetched = client.list_products(&filter).await.context("listing products")?;
    // The backend filters too; applying the same rule locally keeps output
    // consistent with servers that ignore unknown query params.
    let products = filter_products(&fetched, &filter);

    if json {
        return print_json(&products);
    }

    println!("{:>5}  {:<32} {:<16} {:>10}", "ID", "NAME", "CATEGORY", "PRICE");
    for product in products {
        println!(
            "{:>5}  {:<32} {:<16} {:>10}",
            product.id,
            product.name,
            or_dash(product.category.as_deref()),
            product.price.to_string()
        );
    }
    Ok(())
}

pub async fn inventory(
    client: &ApiClient,
    branch: BranchId,
    category: Option<&str>,
    name: Option<&str>,
    report: bool,
    json: bool,
) -> Result<()> {
    let filter = InventoryFilter::new(category, name)?;
    let rows = client
        .inventory(InventoryQuery::for_branch(branch))
        .await
        .with_context(|| format!("loading inventory for branch {}", branch))?;
    let visible: Vec<_> = filter_inventory(&rows, &filter).into_iter().cloned().collect();

    if report {
        let report = InventoryReport::from_records(&visible);
        return if json { print_json(&report) } else { print_report(&report) };
    }

    if json {
        return print_json(&visible);
    }

    println!("{:>5}  {:<32} {:<16} {:>6} {:>10}", "ID", "PRODUCT", "CATEGORY", "QTY", "PRICE");
    for row in &visible {
        println!(
            "{:>5}  {:<32} {:<16} {:>6} {:>10}",
            row.product_id,
            row.product_name,
            row.category.as_deref().unwrap_or(UNCATEGORIZED),
            row.quantity,
            row.price.to_string()
        );
    }
    Ok(())
}

fn print_report(report: &InventoryReport) -> Result<()> {
    println!("Total units: {}", report.total_units);
    println!("Total value: {}", report.total_value);
    println!();
    println!("{:<24} {:>8} {:>9} {:>12} {:>8}", "CATEGORY", "PRODUCTS", "UNITS", "VALUE", "SHARE");
    for category in &report.categories {
        println!(
            "{:<24} {:>8} {:>9} {:>12} {:>7.2}%",
            category.name,
            category.product_count,
            category.units,
            category.value.to_string(),
            category.share_percent()
        );
    }

    if !report.low_stock.is_empty() {
        println!();
        println!("Low stock:");
        for row in &report.low_stock {
            println!("  {:>5}  {:<32} {:>4}", row.product_id, row.product_name, row.quantity);
        }
    }
    Ok(())
}

// =============================================================================
// Sales
// =============================================================================

pub async fn sales(
    client: &ApiClient,
    branch: Option<BranchId>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let query = SalesQuery {
        branch_id: branch,
        date_from: from,
        date_to: to,
    };
    let sales = client.list_sales(query).await.context("listing sales")?;
    if json {
        return print_json(&sales);
    }

    println!("{:>6}  {:<10}  {:<20} {:<12} {:>5} {:>12}", "ID", "DATE", "BRANCH", "SELLER", "ITEMS", "TOTAL");
    for sale in &sales {
        println!(
            "{:>6}  {:<10}  {:<20} {:<12} {:>5} {:>12}",
            sale.id,
            sale.sale_date.to_string(),
            or_dash(sale.branch_name.as_deref()),
            or_dash(sale.created_by_username.as_deref()),
            sale.items.len(),
            sale_total(sale).to_string()
        );
    }
    Ok(())
}

pub async fn sale(client: &ApiClient, id: SaleId, json: bool) -> Result<()> {
    let sale = client
        .get_sale(id)
        .await
        .with_context(|| format!("loading sale {}", id))?;
    if json {
        return print_json(&sale);
    }

    println!("Sale #{}", sale.id);
    println!("  Date:   {}", sale.sale_date);
    println!("  Branch: {}", or_dash(sale.branch_name.as_deref()));
    println!("  Seller: {}", or_dash(sale.created_by_username.as_deref()));
    println!();
    println!("  {:<32} {:>10} {:>5} {:>12}", "PRODUCT", "PRICE", "QTY", "SUBTOTAL");
    for item in &sale.items {
        println!(
            "  {:<32} {:>10} {:>5} {:>12}",
            item.product_name,
            item.price.to_string(),
            item.quantity,
            item.line_total().to_string()
        );
    }
    println!("  {:>62}", format!("TOTAL {}", sale_total(&sale)));
    Ok(())
}

/// Stored total when the backend sent one, else the sum of the lines.
fn sale_total(sale: &SaleRecord) -> branchline_core::Money {
    if sale.total_amount.is_zero() {
        sale.items_total()
    } else {
        sale.total_amount
    }
}

pub async fn sell(
    client: Arc<ApiClient>,
    session: &Session,
    branch: Option<BranchId>,
    date: Option<NaiveDate>,
    items: Vec<(ProductId, i64)>,
    json: bool,
) -> Result<()> {
    let mut builder = SaleBuilder::new(client, session);

    match builder.start().await {
        Ok(()) => {}
        // Lines fall back to the inventory projection for names and prices.
        Err(SaleError::CatalogUnavailable(e)) => warn!(error = %e, "Continuing without the catalog"),
        Err(e) => return Err(e.into()),
    }

    let branch = branch
        .or(builder.branch_scope())
        .context("--branch is required for users without an assigned branch")?;
    if builder.draft().branch_id() != Some(branch) {
        builder.select_branch(branch).await?;
    }
    if let Some(date) = date {
        builder.set_sale_date(date);
    }

    for (product_id, quantity) in items {
        builder
            .add_item_by_id(product_id, quantity)
            .with_context(|| format!("adding product {} x{}", product_id, quantity))?;
    }

    if !json {
        for line in builder.line_items() {
            println!(
                "  {:<32} {:>10} x{:<4} {:>12}",
                line.product_name,
                line.unit_price.to_string(),
                line.quantity,
                line.line_total().to_string()
            );
        }
        println!("  Total: {}", builder.total());
    }

    let confirmation = builder.submit().await?;
    if json {
        return print_json(&confirmation);
    }
    println!("Sale #{} registered.", confirmation.sale_id);
    Ok(())
}

// =============================================================================
// Metrics
// =============================================================================

pub async fn sales_metrics(
    client: &ApiClient,
    period: SalesPeriod,
    branch: Option<BranchId>,
    json: bool,
) -> Result<()> {
    let metrics = client
        .sales_metrics(period, branch)
        .await
        .with_context(|| format!("loading {} sales metrics", period))?;
    if json {
        return print_json(&metrics);
    }
    print_sales_metrics(&metrics);
    Ok(())
}

fn print_sales_metrics(metrics: &SalesMetrics) {
    let scope = metrics
        .branch_id
        .map_or_else(|| "all branches".to_string(), |id| format!("branch {}", id));
    println!("Sales {} to {} ({}, {})", metrics.date_from, metrics.date_to, metrics.period, scope);
    println!("  Total:        {}", metrics.total_sales);
    println!("  Transactions: {}", metrics.total_transactions);
    println!("  Units sold:   {}", metrics.total_products);
    println!("  Avg ticket:   {}", metrics.average_ticket());

    if !metrics.period_sales.is_empty() {
        println!();
        println!("{:<12} {:>12} {:>6} {:>7}", "PERIOD", "AMOUNT", "SALES", "UNITS");
        for bucket in &metrics.period_sales {
            println!(
                "{:<12} {:>12} {:>6} {:>7}",
                bucket.period,
                bucket.amount.to_string(),
                bucket.transactions,
                bucket.products
            );
        }
    }

    if !metrics.top_products.is_empty() {
        println!();
        println!("{:>5}  {:<32} {:>6} {:>12} {:>8}", "ID", "TOP PRODUCT", "UNITS", "AMOUNT", "SHARE");
        for product in &metrics.top_products {
            println!(
                "{:>5}  {:<32} {:>6} {:>12} {:>7}%",
                product.id,
                product.name,
                product.total_quantity,
                product.total_amount.to_string(),
                format_bps(metrics.product_share_bps(product))
            );
        }
    }
}

pub async fn branch_performance(client: &ApiClient, json: bool) -> Result<()> {
    let report = client
        .branch_performance()
        .await
        .context("loading branch performance")?;
    if json {
        return print_json(&report);
    }
    print_branch_performance(&report);
    Ok(())
}

fn print_branch_performance(report: &BranchPerformance) {
    println!(
        "Branches {} to {}: {} of {} active, {} sold",
        report.date_from,
        report.date_to,
        report.active_branches,
        report.total_branches,
        report.total_amount()
    );
    println!();
    println!(
        "{:>5}  {:<24} {:<16} {:>6} {:>12} {:>10} {:>7} {:>8}",
        "ID", "BRANCH", "MANAGER", "SALES", "AMOUNT", "AVG", "PER DAY", "STOCK"
    );
    for branch in &report.branch_data {
        println!(
            "{:>5}  {:<24} {:<16} {:>6} {:>12} {:>10} {:>7.2} {:>8}",
            branch.id,
            branch.name,
            or_dash(branch.manager.as_deref()),
            branch.total_sales,
            branch.total_amount.to_string(),
            branch.avg_sale.to_string(),
            branch.sales_per_day,
            branch.total_inventory
        );
    }
}

/// Basis points as a percentage with two decimals.
fn format_bps(bps: u32) -> String {
    format!("{}.{:02}", bps / 100, bps % 100)
}

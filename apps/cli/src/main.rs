//! # Branchline CLI
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. Initialize Tracing ──────────────────────────────────────────────►  │
//! │     • tracing-subscriber with env filter, written to stderr            │
//! │     • Default: info,branchline=debug; override with RUST_LOG           │
//! │                                                                         │
//! │  2. Load ClientConfig ───────────────────────────────────────────────►  │
//! │     • defaults → branchline.toml → BRANCHLINE_* environment            │
//! │                                                                         │
//! │  3. Resolve Session ─────────────────────────────────────────────────►  │
//! │     • BRANCHLINE_TOKEN in the environment, else the session file       │
//! │                                                                         │
//! │  4. Run Subcommand ──────────────────────────────────────────────────►  │
//! │     • a 401 from the backend clears the stored session                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use branchline_client::{ApiClient, ClientConfig, ClientError, SaleError, Session, SessionStore};
use branchline_core::validation::parse_sale_date;
use branchline_core::{BranchId, ProductId, SaleId, SalesPeriod};

mod commands;

#[derive(Parser)]
#[command(name = "branchline")]
#[command(version, about = "Sales entry and stock lookup for the Branchline ERP")]
struct Cli {
    /// Path to branchline.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List store branches
    Branches,

    /// List catalog products
    Products {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },

    /// Show a branch's stock
    Inventory {
        #[arg(long)]
        branch: BranchId,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Group by category and list low-stock rows
        #[arg(long, default_value_t = false)]
        report: bool,
    },

    /// List registered sales
    Sales {
        #[arg(long)]
        branch: Option<BranchId>,
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },

    /// Show one sale with its items
    Sale { id: SaleId },

    /// Build and submit a sale
    Sell {
        /// Branch to sell at (defaults to the user's assigned branch)
        #[arg(long)]
        branch: Option<BranchId>,
        /// Sale date, YYYY-MM-DD (defaults to today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Line item as PRODUCT_ID:QUANTITY (quantity defaults to 1); repeatable
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<(ProductId, i64)>,
    },

    /// Sales totals and top products, or per-branch performance
    Metrics {
        /// daily, weekly, monthly or yearly
        #[arg(long, default_value_t = SalesPeriod::Monthly)]
        period: SalesPeriod,
        /// Restrict to one branch (admins only)
        #[arg(long, conflicts_with = "performance")]
        branch: Option<BranchId>,
        /// Per-branch performance over the last 30 days instead
        #[arg(long, default_value_t = false)]
        performance: bool,
    },

    /// Forget the stored session
    Logout,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_sale_date(raw).map_err(|e| e.to_string())
}

fn parse_item(raw: &str) -> Result<(ProductId, i64), String> {
    let (id, quantity) = match raw.split_once(':') {
        Some((id, quantity)) => (id, quantity),
        None => (raw, "1"),
    };
    let id = id
        .parse::<ProductId>()
        .map_err(|_| format!("invalid product id in '{}'", raw))?;
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid quantity in '{}'", raw))?;
    Ok((id, quantity))
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::load(cli.config.clone()).context("loading configuration")?;
    let store = SessionStore::new(
        config
            .session_path()
            .context("no session path available; set BRANCHLINE_SESSION_PATH")?,
    );

    if let Command::Logout = cli.command {
        store.clear()?;
        println!("Logged out.");
        return Ok(());
    }

    let session = match Session::from_env(|key| std::env::var(key).ok())? {
        Some(session) => session,
        None => store.load()?,
    };
    if !session.is_authenticated() {
        bail!(
            "not logged in: set BRANCHLINE_TOKEN or write a session file to {}",
            store.path().display()
        );
    }

    let client = Arc::new(ApiClient::new(&config.api, session.clone())?);
    info!(api = %client.base_url(), "Connected to ERP backend");

    let result = dispatch(cli.command, client, &session, cli.json).await;

    if let Err(e) = &result {
        if is_unauthorized(e) {
            warn!("Session rejected by the backend, clearing stored session");
            store.clear()?;
        }
    }
    result
}

async fn dispatch(command: Command, client: Arc<ApiClient>, session: &Session, json: bool) -> Result<()> {
    match command {
        Command::Branches => commands::branches(&client, json).await,
        Command::Products { category, name } => {
            commands::products(&client, category.as_deref(), name.as_deref(), json).await
        }
        Command::Inventory {
            branch,
            category,
            name,
            report,
        } => {
            commands::inventory(&client, branch, category.as_deref(), name.as_deref(), report, json)
                .await
        }
        Command::Sales { branch, from, to } => commands::sales(&client, branch, from, to, json).await,
        Command::Sale { id } => commands::sale(&client, id, json).await,
        Command::Sell {
            branch,
            date,
            items,
        } => commands::sell(client, session, branch, date, items, json).await,
        Command::Metrics {
            period,
            branch,
            performance,
        } => {
            if performance {
                commands::branch_performance(&client, json).await
            } else {
                commands::sales_metrics(&client, period, branch, json).await
            }
        }
        Command::Logout => Ok(()),
    }
}

fn is_unauthorized(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        let client_error = cause
            .downcast_ref::<ClientError>()
            .or_else(|| cause.downcast_ref::<SaleError>().and_then(SaleError::client_error));
        matches!(client_error, Some(ClientError::Unauthorized))
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,branchline=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("10:3").unwrap(), (ProductId(10), 3));
        assert_eq!(parse_item("7").unwrap(), (ProductId(7), 1));
        assert!(parse_item("x:1").is_err());
        assert!(parse_item("7:lots").is_err());
    }

    #[test]
    fn test_cli_parses_sell() {
        let cli = Cli::try_parse_from([
            "branchline", "sell", "--branch", "2", "--date", "2024-03-01", "--item", "10:3",
            "--item", "11",
        ])
        .unwrap();

        match cli.command {
            Command::Sell { branch, date, items } => {
                assert_eq!(branch, Some(BranchId(2)));
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1));
                assert_eq!(items, vec![(ProductId(10), 3), (ProductId(11), 1)]);
            }
            _ => panic!("expected sell"),
        }
    }

    #[test]
    fn test_cli_parses_metrics() {
        let cli = Cli::try_parse_from(["branchline", "metrics", "--period", "weekly", "--branch", "3"])
            .unwrap();
        match cli.command {
            Command::Metrics {
                period,
                branch,
                performance,
            } => {
                assert_eq!(period, SalesPeriod::Weekly);
                assert_eq!(branch, Some(BranchId(3)));
                assert!(!performance);
            }
            _ => panic!("expected metrics"),
        }

        let cli = Cli::try_parse_from(["branchline", "metrics"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Metrics { period: SalesPeriod::Monthly, branch: None, performance: false }
        ));
    }

    #[test]
    fn test_metrics_rejects_bad_period_and_branch_with_performance() {
        assert!(Cli::try_parse_from(["branchline", "metrics", "--period", "hourly"]).is_err());
        assert!(Cli::try_parse_from(["branchline", "metrics", "--performance", "--branch", "1"]).is_err());
    }

    #[test]
    fn test_sell_requires_items() {
        assert!(Cli::try_parse_from(["branchline", "sell", "--branch", "1"]).is_err());
    }

    #[test]
    fn test_unauthorized_detection() {
        let err = anyhow::Error::new(ClientError::Unauthorized).context("listing branches");
        assert!(is_unauthorized(&err));

        let err = anyhow::Error::new(ClientError::Timeout);
        assert!(!is_unauthorized(&err));
    }

    #[test]
    fn test_unauthorized_inside_sale_error() {
        let err = anyhow::Error::new(SaleError::SubmissionFailed(
            ClientError::Unauthorized,
        ));
        assert!(is_unauthorized(&err));
    }
}

//! # ERP REST Client
//!
//! Thin typed wrapper over the backend's JSON endpoints.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ApiClient::create_sale(&payload)                                       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  session token? ── no ──► ClientError::NotAuthenticated (nothing sent)  │
//! │        │ yes                                                            │
//! │        ▼                                                                │
//! │  POST {base}/sales   Authorization: Bearer <token>                      │
//! │        │                                                                │
//! │        ├── 2xx ──► decode JSON ──► SaleConfirmation                     │
//! │        ├── 401 ──► ClientError::Unauthorized                            │
//! │        └── 4xx/5xx ──► ClientError::Api { status, backend message }     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Endpoints
//! | Method | Path                                         | Returns            |
//! |--------|----------------------------------------------|--------------------|
//! | GET    | `/branches`                                  | `Vec<Branch>`      |
//! | GET    | `/products?category=&name=`                  | `Vec<Product>`     |
//! | GET    | `/inventory?branch_id=&product_id=`          | `Vec<InventoryRecord>` |
//! | POST   | `/sales`                                     | `SaleConfirmation` |
//! | GET    | `/sales/{id}`                                | `SaleRecord`       |
//! | GET    | `/sales?branch_id=&date_from=&date_to=`      | `Vec<SaleRecord>`  |
//! | GET    | `/metrics/sales?period=&branch_id=`          | `SalesMetrics`     |
//! | GET    | `/metrics/performance`                       | `BranchPerformance` |

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use branchline_core::validation::SALE_DATE_FORMAT;
use branchline_core::{
    Branch, BranchId, BranchPerformance, InventoryRecord, NewSalePayload, Product, ProductFilter,
    ProductId, SaleConfirmation, SaleId, SaleRecord, SalesMetrics, SalesPeriod,
};

use crate::backend::{InventoryLookup, ProductCatalog, SalesEndpoint};
use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

type Query = Vec<(&'static str, String)>;

// =============================================================================
// Query Types
// =============================================================================

/// Filters for `GET /inventory`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryQuery {
    pub branch_id: Option<BranchId>,
    pub product_id: Option<ProductId>,
}

impl InventoryQuery {
    pub fn for_branch(branch_id: BranchId) -> Self {
        InventoryQuery {
            branch_id: Some(branch_id),
            product_id: None,
        }
    }

    fn to_query(self) -> Query {
        let mut query = Vec::new();
        if let Some(branch) = self.branch_id {
            query.push(("branch_id", branch.to_string()));
        }
        if let Some(product) = self.product_id {
            query.push(("product_id", product.to_string()));
        }
        query
    }
}

/// Filters for `GET /sales`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesQuery {
    pub branch_id: Option<BranchId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl SalesQuery {
    fn to_query(self) -> Query {
        let mut query = Vec::new();
        if let Some(branch) = self.branch_id {
            query.push(("branch_id", branch.to_string()));
        }
        if let Some(from) = self.date_from {
            query.push(("date_from", from.format(SALE_DATE_FORMAT).to_string()));
        }
        if let Some(to) = self.date_to {
            query.push(("date_to", to.format(SALE_DATE_FORMAT).to_string()));
        }
        query
    }
}

fn metrics_query(period: SalesPeriod, branch: Option<BranchId>) -> Query {
    let mut query = vec![("period", period.to_string())];
    if let Some(branch) = branch {
        query.push(("branch_id", branch.to_string()));
    }
    query
}

// =============================================================================
// API Client
// =============================================================================

/// HTTP client for the ERP backend, bound to one session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, session: Session) -> ClientResult<Self> {
        let base = settings.base()?;
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(ApiClient {
            http,
            base,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    pub async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
        self.get_json("branches", Vec::new()).await
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> ClientResult<Vec<Product>> {
        self.get_json("products", filter.to_query()).await
    }

    pub async fn inventory(&self, query: InventoryQuery) -> ClientResult<Vec<InventoryRecord>> {
        self.get_json("inventory", query.to_query()).await
    }

    pub async fn create_sale(&self, payload: &NewSalePayload) -> ClientResult<SaleConfirmation> {
        self.post_json("sales", payload).await
    }

    pub async fn get_sale(&self, sale_id: SaleId) -> ClientResult<SaleRecord> {
        self.get_json(&format!("sales/{}", sale_id), Vec::new()).await
    }

    pub async fn list_sales(&self, query: SalesQuery) -> ClientResult<Vec<SaleRecord>> {
        self.get_json("sales", query.to_query()).await
    }

    /// Sales totals, trend buckets and top products for `period`.
    ///
    /// `branch` is only honoured for admins; the backend pins everyone else
    /// to their own branch.
    pub async fn sales_metrics(
        &self,
        period: SalesPeriod,
        branch: Option<BranchId>,
    ) -> ClientResult<SalesMetrics> {
        self.get_json("metrics/sales", metrics_query(period, branch)).await
    }

    pub async fn branch_performance(&self) -> ClientResult<BranchPerformance> {
        self.get_json("metrics/performance", Vec::new()).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path)?)
    }

    fn token(&self) -> ClientResult<&str> {
        self.session.token().ok_or(ClientError::NotAuthenticated)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: Query) -> ClientResult<T> {
        let token = self.token()?;
        let url = self.endpoint(path)?;
        debug!(%url, ?query, "GET");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&query)
            .send()
            .await?;
        decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.token()?;
        let url = self.endpoint(path)?;
        debug!(%url, "POST");

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        warn!("Backend rejected the session token");
        return Err(ClientError::Unauthorized);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(status.as_u16(), &body);
        debug!(status = status.as_u16(), %message, "Backend returned an error");
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Pulls the human-readable reason out of an error body.
///
/// Recognises `{"detail": "..."}`, `{"error": "..."}`, `{"message": "..."}`
/// and validation lists `{"detail": [{"msg": "..."}, ...]}` (joined with
/// `"; "`). Anything else becomes a generic message with the status.
pub fn extract_error_message(status: u16, body: &str) -> String {
    let generic = || format!("Request failed with status {}", status);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return generic(),
    };

    for key in ["detail", "error", "message"] {
        match value.get(key) {
            Some(Value::String(text)) if !text.trim().is_empty() => return text.clone(),
            Some(Value::Array(entries)) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }

    generic()
}

// =============================================================================
// Collaborator Implementations
// =============================================================================

#[async_trait]
impl InventoryLookup for ApiClient {
    async fn branch_inventory(&self, branch_id: BranchId) -> ClientResult<Vec<InventoryRecord>> {
        self.inventory(InventoryQuery::for_branch(branch_id)).await
    }
}

#[async_trait]
impl ProductCatalog for ApiClient {
    async fn products(&self, filter: &ProductFilter) -> ClientResult<Vec<Product>> {
        self.list_products(filter).await
    }
}

#[async_trait]
impl SalesEndpoint for ApiClient {
    async fn submit_sale(&self, payload: &NewSalePayload) -> ClientResult<SaleConfirmation> {
        self.create_sale(payload).await
    }
}

//! # branchline-client: Backend Access and the Sale Workflow
//!
//! Everything in Branchline that performs I/O: the REST client, the
//! persisted session, configuration, and the [`SaleBuilder`] that drives a
//! draft sale through the backend.
//!
//! ## Module Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        branchline-client                                │
//! │                                                                         │
//! │  config.rs   ClientConfig ─── base URL, timeout, session path          │
//! │                  │                                                      │
//! │  session.rs  SessionStore ──► Session { Unauthenticated | Identity }    │
//! │                  │                                                      │
//! │  http.rs     ApiClient(settings, session)                               │
//! │                  │ implements                                           │
//! │  backend.rs  InventoryLookup + ProductCatalog + SalesEndpoint           │
//! │                  │ = ErpBackend                                         │
//! │  builder.rs  SaleBuilder(Arc<dyn ErpBackend>) ── owns DraftSale         │
//! │                                                                         │
//! │  error.rs    ClientError (transport/backend), SaleError (workflow)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use branchline_client::{ApiClient, ClientConfig, SaleBuilder, SessionStore};
//! use branchline_core::{BranchId, ProductId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load(None)?;
//! let session = SessionStore::new("/tmp/session.json").load()?;
//! let client = Arc::new(ApiClient::new(&config.api, session.clone())?);
//!
//! let mut builder = SaleBuilder::new(client, &session);
//! builder.start().await?;
//! builder.select_branch(BranchId(1)).await?;
//! builder.add_item_by_id(ProductId(7), 2)?;
//! let confirmation = builder.submit().await?;
//! println!("sale {}", confirmation.sale_id);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod builder;
pub mod config;
pub mod error;
pub mod http;
pub mod session;

pub use backend::{ErpBackend, InventoryLookup, ProductCatalog, SalesEndpoint};
pub use builder::{BuilderState, SaleBuilder};
pub use config::{ApiSettings, ClientConfig, SessionSettings};
pub use error::{ClientError, ClientResult, SaleError};
pub use http::{extract_error_message, ApiClient, InventoryQuery, SalesQuery};
pub use session::{Identity, Role, Session, SessionStore};

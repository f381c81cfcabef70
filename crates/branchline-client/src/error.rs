//! # Client Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Network        │  │  Unauthorized (401)     │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Api { status, msg }    │ │
//! │  │  ConfigLoad/Save│  │  Decode         │  │  NotAuthenticated       │ │
//! │  │  SessionStore   │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  SaleError wraps these with the workflow step that failed:             │
//! │    InventoryUnavailable / CatalogUnavailable / SubmissionFailed        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use branchline_core::{BranchId, CoreError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Transport, backend, and local-file failures.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never got a response (DNS, refused connection, TLS...).
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the configured request timeout.
    #[error("Request timed out")]
    Timeout,

    /// Response body could not be decoded into the expected shape.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The backend rejected the token (HTTP 401). The session has expired.
    #[error("Session expired. Please log in again.")]
    Unauthorized,

    /// No identity is loaded, so no request can be authenticated.
    #[error("Not logged in")]
    NotAuthenticated,

    /// Any other non-success response. `message` is the backend's own text
    /// when the body carried one.
    #[error("{message}")]
    Api { status: u16, message: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Reading or writing the persisted session failed.
    #[error("Session store error: {0}")]
    SessionStore(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// True when repeating the same call later may succeed.
    ///
    /// Nothing in this crate retries on its own; callers decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Timeout => true,
            ClientError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// True when the session must be discarded and the user logged in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ClientError::Unauthorized | ClientError::NotAuthenticated)
    }

    /// HTTP status of a backend rejection, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

// =============================================================================
// Sale Workflow Error
// =============================================================================

/// Errors returned by [`crate::SaleBuilder`].
#[derive(Debug, Error)]
pub enum SaleError {
    /// A local draft rule rejected the operation. No request was sent.
    #[error(transparent)]
    Draft(#[from] CoreError),

    /// The branch inventory could not be fetched. The snapshot is empty.
    #[error("Could not load inventory: {0}")]
    InventoryUnavailable(ClientError),

    /// The product catalog could not be fetched. The catalog is empty.
    #[error("Could not load products: {0}")]
    CatalogUnavailable(ClientError),

    /// The backend did not accept the sale. The draft is unchanged.
    #[error("Sale was not registered: {0}")]
    SubmissionFailed(ClientError),

    /// The identity is scoped to another branch.
    #[error("Branch {requested} is not available to this user (assigned branch: {allowed})")]
    BranchNotPermitted { requested: BranchId, allowed: BranchId },
}

impl SaleError {
    /// The underlying client error, when the failure came from the backend.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            SaleError::InventoryUnavailable(e)
            | SaleError::CatalogUnavailable(e)
            | SaleError::SubmissionFailed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.client_error().map(ClientError::is_retryable).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchline_core::ProductId;

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::Network("connection refused".into()).is_retryable());
        assert!(ClientError::Timeout.is_retryable());
        assert!(ClientError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());

        assert!(!ClientError::Unauthorized.is_retryable());
        assert!(!ClientError::Api {
            status: 400,
            message: "Insufficient stock".into()
        }
        .is_retryable());
        assert!(!ClientError::InvalidConfig("bad".into()).is_retryable());
    }

    #[test]
    fn test_api_error_displays_backend_message_verbatim() {
        let err = ClientError::Api {
            status: 400,
            message: "Stock insuficiente para el producto 7".into(),
        };
        assert_eq!(err.to_string(), "Stock insuficiente para el producto 7");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_config_errors() {
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
        assert!(!ClientError::Timeout.is_config_error());
        assert!(ClientError::Unauthorized.is_auth_error());
    }

    #[test]
    fn test_sale_error_wraps_draft_errors() {
        let err: SaleError = CoreError::LineNotFound(ProductId(3)).into();
        assert_eq!(err.to_string(), "Product 3 is not in the sale");
        assert!(err.client_error().is_none());
        assert!(!err.is_retryable());

        let err = SaleError::SubmissionFailed(ClientError::Timeout);
        assert!(err.is_retryable());
    }
}

//! # Session
//!
//! The authenticated identity the client acts as, injected into the HTTP
//! client and the sale builder as a plain value.
//!
//! ```text
//!  session.json ──► SessionStore::load() ──► Session::Authenticated(Identity)
//!       ▲                                           │
//!       │                                           ▼
//!  SessionStore::clear()  ◄── 401 ──────  ApiClient (Authorization: Bearer …)
//! ```
//!
//! Logging in is out of scope: the session file is written by whatever
//! performed the login, or the identity comes from `BRANCHLINE_TOKEN`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use branchline_core::BranchId;

use crate::error::{ClientError, ClientResult};

pub const ENV_TOKEN: &str = "BRANCHLINE_TOKEN";
pub const ENV_USERNAME: &str = "BRANCHLINE_USERNAME";
pub const ENV_ROLE: &str = "BRANCHLINE_ROLE";
pub const ENV_BRANCH_ID: &str = "BRANCHLINE_BRANCH_ID";

// =============================================================================
// Role
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    /// Any role the client does not know about is treated as the least
    /// privileged one.
    #[serde(other)]
    Staff,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Manager => write!(f, "manager"),
            Role::Staff => write!(f, "staff"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "staff" | "user" | "seller" => Ok(Role::Staff),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown role: '{}'. Valid options: admin, manager, staff",
                other
            ))),
        }
    }
}

// =============================================================================
// Identity
// =============================================================================

/// The logged-in user and their bearer token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
    /// Branch the user is assigned to. Admins usually have none.
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    pub token: String,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("branch_id", &self.branch_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Identity {
    /// The only branch this identity may sell at, if it is restricted.
    ///
    /// Admins are never restricted. Everyone else is restricted to their
    /// assigned branch when they have one.
    pub fn branch_scope(&self) -> Option<BranchId> {
        if self.role.is_admin() {
            None
        } else {
            self.branch_id
        }
    }

    pub fn may_sell_at(&self, branch_id: BranchId) -> bool {
        self.branch_scope().map_or(true, |scope| scope == branch_id)
    }
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(Identity),
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(identity) => Some(identity),
            Session::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn token(&self) -> Option<&str> {
        self.identity().map(|i| i.token.as_str())
    }

    pub fn branch_scope(&self) -> Option<BranchId> {
        self.identity().and_then(Identity::branch_scope)
    }

    /// Builds a session from variables (the process environment in
    /// production). Returns `None` unless a token is present.
    ///
    /// Role defaults to admin and username to `"admin"` when unset.
    pub fn from_env<F>(lookup: F) -> ClientResult<Option<Session>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = match lookup(ENV_TOKEN).filter(|t| !t.trim().is_empty()) {
            Some(token) => token,
            None => return Ok(None),
        };

        let role = match lookup(ENV_ROLE) {
            Some(raw) => raw.parse()?,
            None => Role::Admin,
        };

        let branch_id = match lookup(ENV_BRANCH_ID) {
            Some(raw) => Some(raw.parse::<BranchId>().map_err(|e| {
                ClientError::InvalidConfig(format!("{} must be a number: {}", ENV_BRANCH_ID, e))
            })?),
            None => None,
        };

        Ok(Some(Session::Authenticated(Identity {
            username: lookup(ENV_USERNAME).unwrap_or_else(|| "admin".to_string()),
            role,
            branch_id,
            token: token.trim().to_string(),
        })))
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// Persists the identity as JSON on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session. A missing file is `Unauthenticated`.
    pub fn load(&self) -> ClientResult<Session> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No stored session");
            return Ok(Session::Unauthenticated);
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::SessionStore(e.to_string()))?;
        let identity: Identity = serde_json::from_str(&contents)
            .map_err(|e| ClientError::SessionStore(format!("corrupt session file: {}", e)))?;

        debug!(username = %identity.username, role = %identity.role, "Loaded stored session");
        Ok(Session::Authenticated(identity))
    }

    pub fn save(&self, identity: &Identity) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::SessionStore(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(identity)?;
        std::fs::write(&self.path, contents).map_err(|e| ClientError::SessionStore(e.to_string()))?;

        info!(username = %identity.username, "Session saved");
        Ok(())
    }

    /// Deletes the stored session. Succeeds if there was none.
    pub fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = ?self.path, "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::SessionStore(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn identity(role: Role, branch: Option<i64>) -> Identity {
        Identity {
            username: "ana".to_string(),
            role,
            branch_id: branch.map(BranchId),
            token: "secret-token".to_string(),
        }
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_branch_scope() {
        assert_eq!(identity(Role::Admin, Some(2)).branch_scope(), None);
        assert_eq!(identity(Role::Staff, Some(2)).branch_scope(), Some(BranchId(2)));
        assert_eq!(identity(Role::Manager, None).branch_scope(), None);

        let staff = identity(Role::Staff, Some(2));
        assert!(staff.may_sell_at(BranchId(2)));
        assert!(!staff.may_sell_at(BranchId(3)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", identity(Role::Admin, None));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_unknown_role_deserializes_as_staff() {
        let json = r#"{"username": "x", "role": "cashier", "branch_id": 4, "token": "t"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.role, Role::Staff);
        assert_eq!(identity.branch_scope(), Some(BranchId(4)));
    }

    #[test]
    fn test_from_env() {
        assert_eq!(Session::from_env(env(&[])).unwrap(), None);

        let session = Session::from_env(env(&[(ENV_TOKEN, "abc")])).unwrap().unwrap();
        let identity = session.identity().unwrap();
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.username, "admin");
        assert_eq!(session.token(), Some("abc"));

        let session = Session::from_env(env(&[
            (ENV_TOKEN, "abc"),
            (ENV_USERNAME, "luis"),
            (ENV_ROLE, "staff"),
            (ENV_BRANCH_ID, "3"),
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(session.branch_scope(), Some(BranchId(3)));

        assert!(Session::from_env(env(&[(ENV_TOKEN, "abc"), (ENV_BRANCH_ID, "x")])).is_err());
    }

    #[test]
    fn test_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("data").join("session.json"));

        assert_eq!(store.load().unwrap(), Session::Unauthenticated);

        let ana = identity(Role::Staff, Some(1));
        store.save(&ana).unwrap();
        assert_eq!(store.load().unwrap(), Session::Authenticated(ana));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), Session::Unauthenticated);
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = SessionStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ClientError::SessionStore(_)));
    }
}

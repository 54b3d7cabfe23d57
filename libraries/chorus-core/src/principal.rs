//! Principal identity and the credential-verification seam

use crate::error::Result;
use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// An authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// User identifier carried by the credential
    pub id: UserId,

    /// Email carried by the credential
    pub email: String,
}

impl Principal {
    /// Create a principal
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// Turns an opaque credential into a principal.
///
/// Implementations must fail with `ChorusError::Unauthenticated` for any
/// malformed, forged or expired credential. A leading `Bearer ` prefix is
/// accepted.
pub trait TokenVerifier: Send + Sync {
    /// Verify `credential` and return the principal it names
    fn resolve_token(&self, credential: &str) -> Result<Principal>;
}

/// Strip an optional `Bearer ` scheme prefix from a credential
pub fn strip_bearer(credential: &str) -> &str {
    credential
        .strip_prefix("Bearer ")
        .unwrap_or(credential)
        .trim()
}

//! Request and response bodies of the persons API.
//!
//! All bodies are JSON. Sensitive field values only ever appear in plaintext
//! in a view returned to the record's owner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Persons
// ---------------------------------------------------------------------------

/// Request body for `POST /persons`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePersonRequest {
    /// Unique, non-sensitive login name.
    pub username: String,
    /// Sensitive values keyed by field name, each encrypted on arrival.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Response body for `POST /persons`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePersonResponse {
    /// Identifier assigned to the new record.
    pub id: u64,
}

/// One person as seen by the requester.
///
/// The owner gets `sealed: false` and plaintext `fields`. Anyone else gets
/// `sealed: true`, hex blobs in `fields`, and the hex of the wrapped subkey
/// and rotation counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonView {
    pub id: u64,
    pub username: String,
    pub sealed: bool,
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped_subkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_counter: Option<String>,
}

/// Response body for `GET /persons`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPersonsResponse {
    /// Every stored person, in id order.
    pub persons: Vec<PersonView>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"not_found"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status, always `"ok"` once serving.
    pub status: String,
    /// Number of records currently stored.
    pub records: usize,
}

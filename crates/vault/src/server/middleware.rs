//! Axum middleware settings and request guards shared by the handlers.

use std::time::Duration;

use axum::http::HeaderMap;
use common::ServiceError;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Person id of the caller, as asserted by the upstream token verifier in
/// the `header_name` header.
///
/// # Errors
///
/// Returns [`ServiceError::Unauthorized`] if the header is missing, not
/// ASCII, or not a decimal id.
pub fn principal(headers: &HeaderMap, header_name: &str) -> Result<u64, ServiceError> {
    let value = headers
        .get(header_name)
        .ok_or_else(|| ServiceError::Unauthorized(format!("missing {header_name} header")))?;
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| ServiceError::Unauthorized(format!("{header_name} header is not a person id")))
}

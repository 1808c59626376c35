//! Header exclusion sets and filtering.
//!
//! Two fixed sets of connection-specific headers are stripped during
//! relay: [`REQUEST_EXCLUDED`] from inbound headers before they are sent
//! to a backend, and [`RESPONSE_EXCLUDED`] from backend headers before
//! they are returned to the caller. Names are compared through
//! [`HeaderName`], which is always lowercase, so matching is
//! case-insensitive.

use axum::http::header::{CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderName};

/// Stripped from inbound POST headers before forwarding.
pub static REQUEST_EXCLUDED: [HeaderName; 2] = [HOST, CONNECTION];

/// Stripped from backend response headers before relaying.
pub static RESPONSE_EXCLUDED: [HeaderName; 2] = [CONNECTION, TRANSFER_ENCODING];

/// Copy every header not named in `excluded`, keeping repeated values.
#[must_use]
pub fn filter_headers(headers: &HeaderMap, excluded: &[HeaderName]) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !excluded.contains(name) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

/// The body length the caller declared, or zero when `Content-Length` is
/// absent or not a non-negative integer.
#[must_use]
pub fn declared_content_length(headers: &HeaderMap) -> usize {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0)
}

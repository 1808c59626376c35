//! Core HTTP request forwarding handler.
//!
//! The [`forward_handler`] function is the Axum fallback that receives
//! every request on every path. GET and POST are relayed to the backend
//! chosen by [`target::select_target`]; any other method is answered
//! locally with `405`. Submodules handle target selection ([`target`]),
//! header exclusion sets ([`headers`]), and the outbound exchange
//! ([`relay`]).

pub mod headers;
pub mod relay;
pub mod target;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::server::AppState;

pub const ALLOWED_METHODS: &str = "GET, POST";

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());

    let result = match method {
        Method::GET => state.forwarder.get(path_and_query).await,
        Method::POST => {
            state
                .forwarder
                .post(path_and_query, &req_headers, body)
                .await
        }
        _ => {
            tracing::warn!(method = %method, path = %path_and_query, "method not allowed");
            return (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS))],
            )
                .into_response();
        }
    };

    match result {
        Ok(relayed) => {
            tracing::debug!(
                method = %method,
                path = %path_and_query,
                target = %relayed.target,
                status = relayed.status.as_u16(),
                bytes = relayed.body.len(),
                "relayed backend response"
            );
            relayed.into_response()
        }
        Err(e) => {
            tracing::error!(
                method = %method,
                path = %path_and_query,
                error = %e.describe(),
                "forward failed"
            );
            relay::bad_gateway(&e)
        }
    }
}

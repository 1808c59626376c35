//! Outbound exchange with the selected backend.
//!
//! [`Forwarder`] owns the target bases, the timeout, and the HTTP client.
//! It is built once at startup and shared read-only by every request.
//! A forward either yields a [`Relayed`] response (a `2xx` or `3xx`
//! status, filtered headers, full body) or a [`ForwardError`] that the
//! handler turns into a `502` via [`bad_gateway`]. Backend `4xx` and `5xx`
//! answers count as failures and surface as [`ForwardError::Status`].

use std::error::Error as _;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

use super::headers::{declared_content_length, filter_headers, REQUEST_EXCLUDED, RESPONSE_EXCLUDED};
use super::target::{Target, TargetBases};
use crate::server::HttpClient;

pub const PROXY_ERROR_PREFIX: &str = "Proxy Error: ";

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("invalid target URL {url}: {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: http::Error,
    },

    #[error("{source}")]
    Transport {
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("timed out after {0:?} waiting for backend")]
    Timeout(Duration),

    #[error("failed to read backend body: {source}")]
    Body {
        #[source]
        source: hyper::Error,
    },

    #[error(
        "HTTP Error {}: {}",
        .0.as_u16(),
        .0.canonical_reason().unwrap_or("Unknown")
    )]
    Status(StatusCode),
}

impl ForwardError {
    /// One-line rendering of the error and every underlying cause.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            // Wrapping variants repeat their source's message.
            if !out.ends_with(&text) {
                out.push_str(": ");
                out.push_str(&text);
            }
            source = cause.source();
        }
        out
    }
}

/// A backend response ready to be returned to the caller.
#[derive(Debug)]
pub struct Relayed {
    pub target: Target,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

pub struct Forwarder {
    bases: TargetBases,
    client: HttpClient,
    timeout: Duration,
}

impl Forwarder {
    #[must_use]
    pub const fn new(bases: TargetBases, client: HttpClient, timeout: Duration) -> Self {
        Self {
            bases,
            client,
            timeout,
        }
    }

    #[must_use]
    pub const fn bases(&self) -> &TargetBases {
        &self.bases
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward a GET. No inbound headers and no body are carried.
    pub async fn get(&self, path_and_query: &str) -> Result<Relayed, ForwardError> {
        self.forward(Method::GET, path_and_query, HeaderMap::new(), Bytes::new())
            .await
    }

    /// Forward a POST carrying the declared number of body bytes and the
    /// inbound headers minus `Host` and `Connection`.
    pub async fn post(
        &self,
        path_and_query: &str,
        inbound: &HeaderMap,
        body: Bytes,
    ) -> Result<Relayed, ForwardError> {
        let declared = declared_content_length(inbound);
        let body = body.slice(..declared.min(body.len()));
        let headers = filter_headers(inbound, &REQUEST_EXCLUDED);
        self.forward(Method::POST, path_and_query, headers, body)
            .await
    }

    async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Relayed, ForwardError> {
        let (target, url) = self.bases.url_for(path_and_query);

        tracing::info!(
            method = %method,
            path = %path_and_query,
            target = %target,
            url = %url,
            "forwarding request"
        );

        let mut request = hyper::Request::builder()
            .method(method)
            .uri(&url)
            .body(Full::new(body))
            .map_err(|source| ForwardError::InvalidTarget {
                url: url.clone(),
                source,
            })?;
        *request.headers_mut() = headers;

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|source| ForwardError::Transport { source })?;
            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|source| ForwardError::Body { source })?
                .to_bytes();
            Ok::<_, ForwardError>((parts.status, parts.headers, body))
        };

        let (status, backend_headers, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ForwardError::Timeout(self.timeout))??;

        if status.is_client_error() || status.is_server_error() {
            tracing::debug!(
                target = %target,
                status = status.as_u16(),
                bytes = body.len(),
                "backend answered with an error status"
            );
            return Err(ForwardError::Status(status));
        }

        Ok(Relayed {
            target,
            status,
            headers: filter_headers(&backend_headers, &RESPONSE_EXCLUDED),
            body,
        })
    }
}

/// `502 Bad Gateway` with a plain-text description of `err`.
#[must_use]
pub fn bad_gateway(err: &ForwardError) -> Response {
    let body = format!("{PROXY_ERROR_PREFIX}{}", err.describe());
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))],
        body,
    )
        .into_response()
}

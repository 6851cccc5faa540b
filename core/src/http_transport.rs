//! reqwest-backed transport for live servers.

use crate::error::{Result, TransportError};
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::transport::Transport;
use std::future::Future;
use std::time::Duration;

/// Environment variable holding the server base URL.
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport that sends requests to a live server with reqwest.
///
/// Cookies are never stored: credentials travel only as explicit `Cookie`
/// headers set by middleware.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport for `base_url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidBaseUrl`] if `base_url` is not an
    /// `http://` or `https://` URL, or [`TransportError::RequestFailed`] if the
    /// HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a transport with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Same as [`ReqwestTransport::new`].
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(TransportError::InvalidBaseUrl(base_url));
        }

        // No idle pooling: one transport may be driven from several tokio
        // runtimes (one per #[tokio::test]), and pooled connections are bound
        // to the runtime that opened them.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a transport from `API_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidBaseUrl`] if the variable is unset or
    /// malformed.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV)
            .map_err(|_| TransportError::InvalidBaseUrl(format!("{BASE_URL_ENV} is not set")))?;
        Self::new(base_url)
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send {
        let mut builder = self
            .client
            .request(request.method, self.url_for(&request.path))
            .headers(request.headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        async move {
            let response = builder
                .send()
                .await
                .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::ResponseParseFailed(e.to_string()))?
                .to_vec();

            Ok(ApiResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = ReqwestTransport::new("localhost:8080");
        assert!(matches!(result, Err(TransportError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let transport = ReqwestTransport::new("http://localhost:8080/").unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8080");
        assert_eq!(transport.url_for("/api/x"), "http://localhost:8080/api/x");
        assert_eq!(transport.url_for("api/x"), "http://localhost:8080/api/x");
    }

    #[tokio::test]
    async fn test_sends_headers_query_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .and(query_param("dry", "1"))
            .and(header("cookie", "sid=abc"))
            .and(body_json(json!({"items": [1, 2]})))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("location", "/api/orders/9")
                    .set_body_json(json!({"id": 9})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(server.uri()).unwrap();
        let request = ApiRequest::post("/api/orders")
            .query("dry", "1")
            .try_header("Cookie", "sid=abc")
            .unwrap()
            .json(&json!({"items": [1, 2]}))
            .unwrap();

        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.header_values("location"), vec!["/api/orders/9"]);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["id"], 9);
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(server.uri()).unwrap();
        let response = transport.send(ApiRequest::get("/api/members/me")).await.unwrap();

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(!response.is_success());
    }
}

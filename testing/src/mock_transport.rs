//! In-memory transport with routed canned responses.

use http::header::{CONTENT_TYPE, HeaderValue, LOCATION, SET_COOKIE};
use http::{Method, StatusCode};
use shopcheck_core::{ApiRequest, ApiResponse, Result, Transport};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Transport that records requests and answers from a route table.
///
/// Routes are keyed by method and exact path (query excluded). Unrouted
/// requests get an empty `404`. Requests are recorded after middleware has
/// run, so assertions see exactly what would have gone over the wire.
///
/// # Example
///
/// ```
/// use shopcheck_testing::{MockTransport, json_response};
/// use shopcheck_core::{Method, StatusCode};
///
/// let transport = MockTransport::new().route(
///     Method::GET,
///     "/api/members/me",
///     json_response(StatusCode::OK, &serde_json::json!({"id": 1})),
/// );
/// assert_eq!(transport.call_count("/api/members/me"), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    routes: HashMap<(Method, String), ApiResponse>,
    requests: Vec<ApiRequest>,
}

impl MockTransport {
    /// Create a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route (builder form).
    #[must_use]
    pub fn route(self, method: Method, path: impl Into<String>, response: ApiResponse) -> Self {
        self.set_route(method, path, response);
        self
    }

    /// Add or replace a route.
    pub fn set_route(&self, method: Method, path: impl Into<String>, response: ApiResponse) {
        self.lock().routes.insert((method, path.into()), response);
    }

    /// Route the member API endpoints to a backend that registers anyone and
    /// issues `cookie` on sign-in.
    #[must_use]
    pub fn with_member_backend(self, member_id: i64, cookie: &str) -> Self {
        self.route(
            Method::POST,
            shopcheck_auth::constants::paths::MEMBERS,
            created_response(&format!("/api/members/{member_id}")),
        )
        .route(
            Method::POST,
            shopcheck_auth::constants::paths::SIGN_IN,
            sign_in_response(cookie),
        )
    }

    /// Every recorded request, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// Recorded requests to `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|request| request.path == path)
            .cloned()
            .collect()
    }

    /// Most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<ApiRequest> {
        self.lock().requests.last().cloned()
    }

    /// Number of requests sent to `path`.
    #[must_use]
    pub fn call_count(&self, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|request| request.path == path)
            .count()
    }

    /// Forget recorded requests. Routes are kept.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MockTransport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send {
        let response = {
            let mut state = self.lock();
            let key = (request.method.clone(), request.path.clone());
            let response = state
                .routes
                .get(&key)
                .cloned()
                .unwrap_or_else(|| ApiResponse::new(StatusCode::NOT_FOUND));
            tracing::trace!(method = %request.method, path = %request.path, status = %response.status, "mock dispatch");
            state.requests.push(request);
            response
        };
        async move { Ok(response) }
    }
}

/// Response with a JSON body.
#[must_use]
pub fn json_response(status: StatusCode, body: &serde_json::Value) -> ApiResponse {
    let mut response = ApiResponse::new(status);
    response
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response.body = body.to_string().into_bytes();
    response
}

/// Successful sign-in issuing `cookie` (a `name=value` pair) with the usual
/// attributes.
///
/// A `cookie` that is not a valid header value yields a sign-in without
/// `Set-Cookie`.
#[must_use]
pub fn sign_in_response(cookie: &str) -> ApiResponse {
    let mut response = ApiResponse::new(StatusCode::OK);
    if let Ok(value) = HeaderValue::from_str(&format!("{cookie}; Path=/; HttpOnly")) {
        response.headers.append(SET_COOKIE, value);
    }
    response
}

/// `201 Created` pointing at `location`.
#[must_use]
pub fn created_response(location: &str) -> ApiResponse {
    let mut response = ApiResponse::new(StatusCode::CREATED);
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers.insert(LOCATION, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unrouted_request_is_not_found() {
        let transport = MockTransport::new();

        let response = transport.send(ApiRequest::get("/nowhere")).await.unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(transport.call_count("/nowhere"), 1);
    }

    #[tokio::test]
    async fn test_routes_match_method_and_path() {
        let transport = MockTransport::new().route(
            Method::POST,
            "/api/orders",
            json_response(StatusCode::CREATED, &json!({"id": 9})),
        );

        let created = transport.send(ApiRequest::post("/api/orders")).await.unwrap();
        let listed = transport.send(ApiRequest::get("/api/orders")).await.unwrap();

        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(created.json::<serde_json::Value>().unwrap()["id"], 9);
        assert_eq!(listed.status, StatusCode::NOT_FOUND);
        assert_eq!(transport.requests_to("/api/orders").len(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_recordings() {
        let transport = MockTransport::new();
        let clone = transport.clone();

        clone.send(ApiRequest::delete("/api/carts/1")).await.unwrap();

        assert_eq!(transport.last_request().unwrap().method, Method::DELETE);
        transport.clear_requests();
        assert!(clone.requests().is_empty());
    }

    #[test]
    fn test_sign_in_response_issues_cookie() {
        let response = sign_in_response("sid=abc");

        assert_eq!(response.set_cookies(), vec!["sid=abc; Path=/; HttpOnly".to_string()]);
    }
}

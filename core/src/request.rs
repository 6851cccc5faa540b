//! Outgoing API calls.
//!
//! An [`ApiRequest`] is a plain value: middleware receives it by value, may
//! rewrite it, and hands it on. Nothing is sent until a
//! [`Transport`](crate::transport::Transport) dispatches it.

use crate::error::{Result, TransportError};
use http::header::{HeaderName, HeaderValue};
use http::{Extensions, HeaderMap, Method};
use serde::Serialize;

/// A single outgoing call.
///
/// `path` is relative to the transport's base URL (e.g. `/api/members/me`).
/// `extensions` carries typed per-call options that never reach the wire.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the base URL, starting with `/`
    pub path: String,
    /// Query parameters in insertion order
    pub query: Vec<(String, String)>,
    /// Request headers (names are case-insensitive)
    pub headers: HeaderMap,
    /// Optional JSON body
    pub body: Option<serde_json::Value>,
    /// Typed per-call options for middleware
    pub extensions: Extensions,
}

impl ApiRequest {
    /// Create a request with no headers, query, or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            extensions: Extensions::new(),
        }
    }

    /// `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST` request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT` request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `PATCH` request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// `DELETE` request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set a header from already-validated parts, replacing any previous value.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a header from strings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidHeader`] if the name or value is not a
    /// legal HTTP header.
    pub fn try_header(self, name: &str, value: &str) -> Result<Self> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| TransportError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(self.header(header_name, header_value))
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::RequestFailed`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| TransportError::RequestFailed(format!("body serialization: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Insert a typed per-call option.
    #[must_use]
    pub fn extension<X: Clone + Send + Sync + 'static>(mut self, value: X) -> Self {
        self.extensions.insert(value);
        self
    }

    /// Header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_parts() {
        let request = ApiRequest::post("/api/members")
            .query("page", "1")
            .try_header("X-Trace", "abc")
            .unwrap()
            .json(&json!({"name": "Kim"}))
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/api/members");
        assert_eq!(request.query, vec![("page".to_string(), "1".to_string())]);
        assert_eq!(request.header_str("x-trace"), Some("abc"));
        assert_eq!(request.body, Some(json!({"name": "Kim"})));
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let result = ApiRequest::get("/").try_header("bad header", "v");
        assert!(matches!(result, Err(TransportError::InvalidHeader { .. })));

        let result = ApiRequest::get("/").try_header("x-ok", "line\nbreak");
        assert!(matches!(result, Err(TransportError::InvalidHeader { .. })));
    }

    #[test]
    fn test_extensions_survive_clone() {
        #[derive(Clone, Debug, PartialEq)]
        struct Marker(u8);

        let request = ApiRequest::get("/").extension(Marker(7));
        let copy = request.clone();
        assert_eq!(copy.extensions.get::<Marker>(), Some(&Marker(7)));
    }
}

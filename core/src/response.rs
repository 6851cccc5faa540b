//! Responses handed back by a transport.

use crate::error::{Result, TransportError};
use http::{HeaderMap, StatusCode, header};
use serde::de::DeserializeOwned;

/// A fully-buffered API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Create a response with no headers or body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ResponseParseFailed`] if the body is not valid
    /// JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| TransportError::ResponseParseFailed(e.to_string()))
    }

    /// Body as UTF-8 text, lossily decoded.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Every value of a (possibly repeated) header, in arrival order.
    ///
    /// Values that are not valid UTF-8 are skipped.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    /// Raw `Set-Cookie` values.
    #[must_use]
    pub fn set_cookies(&self) -> Vec<String> {
        self.header_values(header::SET_COOKIE.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_repeated_set_cookie_values_are_kept() {
        let mut response = ApiResponse::new(StatusCode::OK);
        response
            .headers
            .append(header::SET_COOKIE, HeaderValue::from_static("sid=a; Path=/"));
        response
            .headers
            .append(header::SET_COOKIE, HeaderValue::from_static("other=b; Secure"));

        assert_eq!(
            response.set_cookies(),
            vec!["sid=a; Path=/".to_string(), "other=b; Secure".to_string()]
        );
    }

    #[test]
    fn test_json_body() {
        let mut response = ApiResponse::new(StatusCode::CREATED);
        response.body = br#"{"id": 42}"#.to_vec();

        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["id"], 42);
        assert!(response.is_success());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let mut response = ApiResponse::new(StatusCode::OK);
        response.body = b"not json".to_vec();

        let result = response.json::<serde_json::Value>();
        assert!(matches!(result, Err(TransportError::ResponseParseFailed(_))));
    }
}

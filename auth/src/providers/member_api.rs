//! HTTP implementation of the sign-in and registration collaborators.

use super::{
    Registration, RegistrationProvider, RegistrationRequest, SignInOutcome, SignInProvider,
    SignInRequest,
};
use crate::constants::paths;
use crate::error::Result;
use crate::interceptor::IdentityRequestExt;
use serde::Serialize;
use shopcheck_core::{ApiClient, ApiRequest, ApiResponse, Transport, header};
use std::future::Future;

#[derive(Serialize)]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegistrationBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Member API over an [`ApiClient`].
///
/// - Sign-in: `POST /api/auth/login` with `{email, password}`; the credential
///   is read from `Set-Cookie`, else from a `token` body field
/// - Registration: `POST /api/members` with `{name, email, password}`; the
///   member id is read from the `Location` header, else from an `id` body field
///
/// Requests go through the client's middleware chain like any other call.
#[derive(Debug, Clone)]
pub struct HttpMemberApi<T> {
    client: ApiClient<T>,
    sign_in_path: String,
    members_path: String,
}

impl<T: Transport> HttpMemberApi<T> {
    /// Create a member API using the default backend paths.
    #[must_use]
    pub fn new(client: ApiClient<T>) -> Self {
        Self {
            client,
            sign_in_path: paths::SIGN_IN.to_string(),
            members_path: paths::MEMBERS.to_string(),
        }
    }

    /// Override the sign-in path.
    #[must_use]
    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self
    }

    /// Override the member registration path.
    #[must_use]
    pub fn with_members_path(mut self, path: impl Into<String>) -> Self {
        self.members_path = path.into();
        self
    }
}

impl<T: Transport> SignInProvider for HttpMemberApi<T> {
    fn sign_in(
        &self,
        request: &SignInRequest,
    ) -> impl Future<Output = Result<SignInOutcome>> + Send {
        async move {
            let call = ApiRequest::post(self.sign_in_path.as_str()).json(&SignInBody {
                email: &request.identity,
                password: &request.secret,
            })?;
            let response = self.client.execute(call).await?;

            Ok(SignInOutcome {
                status: response.status.as_u16(),
                issued: response.set_cookies(),
                token: body_string_field(&response, "token"),
            })
        }
    }
}

impl<T: Transport> RegistrationProvider for HttpMemberApi<T> {
    fn register(
        &self,
        request: &RegistrationRequest,
    ) -> impl Future<Output = Result<Registration>> + Send {
        async move {
            let call = ApiRequest::post(self.members_path.as_str())
                .json(&RegistrationBody {
                    name: &request.display_name,
                    email: &request.identity,
                    password: &request.secret,
                })?
                .without_auto_credential();
            let response = self.client.execute(call).await?;

            let location = response
                .header_values(header::LOCATION.as_str())
                .into_iter()
                .next();
            let member_id = location
                .as_deref()
                .and_then(id_from_location)
                .or_else(|| body_id_field(&response));

            Ok(Registration {
                status: response.status.as_u16(),
                location,
                member_id,
            })
        }
    }
}

/// Numeric id from the last path segment of a `Location` value.
fn id_from_location(location: &str) -> Option<i64> {
    location
        .split(['?', '#'])
        .next()?
        .trim_end_matches('/')
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

fn body_string_field(response: &ApiResponse, field: &str) -> Option<String> {
    let body: serde_json::Value = response.json().ok()?;
    body.get(field)?.as_str().map(str::to_string)
}

fn body_id_field(response: &ApiResponse) -> Option<i64> {
    let body: serde_json::Value = response.json().ok()?;
    match body.get("id")? {
        serde_json::Value::Number(number) => number.as_i64(),
        serde_json::Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_location() {
        assert_eq!(id_from_location("/api/members/42"), Some(42));
        assert_eq!(id_from_location("http://shop.test/api/members/7/"), Some(7));
        assert_eq!(id_from_location("/api/members/9?created=1"), Some(9));
        assert_eq!(id_from_location("/api/members/abc"), None);
        assert_eq!(id_from_location(""), None);
    }
}

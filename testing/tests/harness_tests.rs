//! Harness tests over `MockTransport`.
//!
//! Exercises the full request path (context → interceptor → transport)
//! without a server: session bootstrap, identity selection, opt-outs, and
//! what actually reaches the wire.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use serde_json::json;
use shopcheck_auth::{AccountConfig, IdentityClass, SessionConfig};
use shopcheck_core::{ApiRequest, HeaderValue, Method, StatusCode, header};
use shopcheck_testing::{TestContext, init_test_tracing, json_response, sign_in_response};
use tokio_test::assert_ok;

fn cookie_of(request: &ApiRequest) -> Option<&str> {
    request.header_str(header::COOKIE.as_str())
}

#[tokio::test]
async fn test_general_session_then_authenticated_call() {
    init_test_tracing();
    let (ctx, transport) = TestContext::mock(SessionConfig::new());
    let transport = transport.with_member_backend(55, "sid=member55").route(
        Method::GET,
        "/api/members/me",
        json_response(StatusCode::OK, &json!({"id": 55})),
    );

    assert_ok!(ctx.ensure_ready(IdentityClass::General).await);
    let response = ctx.send(ApiRequest::get("/api/members/me")).await.unwrap();

    assert!(response.is_success());
    assert_eq!(ctx.account(IdentityClass::General).unwrap().numeric_id, Some(55));

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    // Registration and sign-in go out bare; the profile call carries the session
    assert_eq!(cookie_of(&requests[0]), None);
    assert_eq!(cookie_of(&requests[1]), None);
    assert_eq!(cookie_of(&requests[2]), Some("sid=member55"));
}

#[tokio::test]
async fn test_registration_and_sign_in_bodies() {
    let config = SessionConfig::new().with_email_domain("shop.test");
    let (ctx, transport) = TestContext::mock(config);
    let transport = transport.with_member_backend(8, "sid=s");

    ctx.ensure_ready(IdentityClass::General).await.unwrap();

    let account = ctx.account(IdentityClass::General).unwrap();
    let registration = transport.requests_to("/api/members").pop().unwrap();
    let sign_in = transport.requests_to("/api/auth/login").pop().unwrap();
    assert_eq!(registration.method, Method::POST);
    assert_eq!(
        registration.body,
        Some(json!({
            "name": account.display_name,
            "email": account.identity,
            "password": account.secret,
        }))
    );
    assert_eq!(
        sign_in.body,
        Some(json!({"email": account.identity, "password": account.secret}))
    );
}

#[tokio::test]
async fn test_per_call_admin_selection() {
    let config = SessionConfig::new().with_admin(AccountConfig::fixed("admin@shop.test", "pw"));
    let (ctx, transport) = TestContext::mock(config);
    transport.set_route(Method::POST, "/api/auth/login", sign_in_response("sid=admin"));
    ctx.ensure_ready(IdentityClass::Admin).await.unwrap();
    ctx.store()
        .set_credential(IdentityClass::General, Some("sid=general".to_string()));

    ctx.send_as(IdentityClass::Admin, ApiRequest::get("/api/admin/members"))
        .await
        .unwrap();
    ctx.send(ApiRequest::get("/api/carts")).await.unwrap();

    let admin_call = transport.requests_to("/api/admin/members").pop().unwrap();
    let general_call = transport.requests_to("/api/carts").pop().unwrap();
    assert_eq!(cookie_of(&admin_call), Some("sid=admin"));
    assert!(admin_call.header_str("x-auth-identity").is_none());
    assert_eq!(cookie_of(&general_call), Some("sid=general"));
}

#[tokio::test]
async fn test_switching_active_identity() {
    let (ctx, transport) = TestContext::mock(SessionConfig::new());
    ctx.store()
        .set_credential(IdentityClass::Admin, Some("sid=admin".to_string()));

    ctx.store().set_active_identity(Some(IdentityClass::Admin));
    ctx.send(ApiRequest::get("/api/admin/orders")).await.unwrap();
    ctx.reset_active_identity();
    ctx.send(ApiRequest::get("/api/orders")).await.unwrap();

    assert_eq!(
        cookie_of(&transport.requests_to("/api/admin/orders")[0]),
        Some("sid=admin")
    );
    // No general session stored: sent unauthenticated
    assert_eq!(cookie_of(&transport.requests_to("/api/orders")[0]), None);
}

#[tokio::test]
async fn test_opt_outs_send_unauthenticated() {
    let (ctx, transport) = TestContext::mock(SessionConfig::new());
    ctx.store()
        .set_credential(IdentityClass::General, Some("sid=general".to_string()));

    ctx.send_anonymous(ApiRequest::get("/api/products")).await.unwrap();
    ctx.send(
        ApiRequest::get("/api/categories")
            .try_header("x-skip-auto-credential", "true")
            .unwrap(),
    )
    .await
    .unwrap();

    let products = transport.requests_to("/api/products").pop().unwrap();
    let categories = transport.requests_to("/api/categories").pop().unwrap();
    assert_eq!(cookie_of(&products), None);
    assert_eq!(cookie_of(&categories), None);
    assert!(categories.header_str("x-skip-auto-credential").is_none());
}

#[tokio::test]
async fn test_caller_cookie_is_left_untouched() {
    let (ctx, transport) = TestContext::mock(SessionConfig::new());
    ctx.store()
        .set_credential(IdentityClass::General, Some("sid=general".to_string()));

    ctx.send(
        ApiRequest::get("/api/members/me")
            .header(header::COOKIE, HeaderValue::from_static("sid=forged")),
    )
    .await
    .unwrap();

    assert_eq!(cookie_of(&transport.last_request().unwrap()), Some("sid=forged"));
}

#[tokio::test]
async fn test_cleared_credential_stops_attachment() {
    let (ctx, transport) = TestContext::mock(SessionConfig::new());
    let transport = transport.with_member_backend(3, "sid=member3");
    ctx.ensure_ready(IdentityClass::General).await.unwrap();

    ctx.store().clear(IdentityClass::General);
    ctx.send(ApiRequest::get("/api/members/me")).await.unwrap();

    assert_eq!(cookie_of(&transport.last_request().unwrap()), None);
    // The coordinator keeps its outcome; no second acquisition
    ctx.ensure_ready(IdentityClass::General).await.unwrap();
    assert_eq!(transport.call_count("/api/auth/login"), 1);
}

#[tokio::test]
async fn test_admin_without_configuration_never_calls_backend() {
    let (ctx, transport) = TestContext::mock(SessionConfig::new());

    let error = ctx.ensure_ready(IdentityClass::Admin).await.unwrap_err();

    assert!(error.is_configuration());
    assert!(transport.requests().is_empty());
}

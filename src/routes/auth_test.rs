use super::*;

use axum::body::Body;
use axum::http::{Request, header};
use tower::ServiceExt;

use crate::routes;
use crate::state::test_helpers;

fn form_req(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .expect("request should build")
}

fn location(resp: &axum::response::Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .expect("location header present")
        .to_str()
        .expect("location header is ascii")
}

// =============================================================================
// env_bool / cookie helpers
// =============================================================================

#[test]
fn env_bool_recognizes_true_and_false_spellings() {
    let key = "__TEST_RG_EB_1__";
    for (value, expected) in [("1", true), ("yes", true), ("off", false), ("0", false)] {
        unsafe { std::env::set_var(key, value) };
        assert_eq!(env_bool(key), Some(expected), "for {value:?}");
    }
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_unset_or_garbage_is_none() {
    assert_eq!(env_bool("__TEST_RG_EB_UNSET_42__"), None);
    let key = "__TEST_RG_EB_GARBAGE__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn session_cookie_is_http_only_site_wide() {
    let cookie = session_cookie("tok123".to_owned(), Duration::hours(24));
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "tok123");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
}

// =============================================================================
// POST /register
// =============================================================================

#[tokio::test]
async fn register_rejects_empty_login() {
    let app = routes::app(test_helpers::test_app_state());
    let resp = app
        .oneshot(form_req("/register", "login=++&password=pw1&role=User"))
        .await
        .expect("request should succeed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_empty_password() {
    let app = routes::app(test_helpers::test_app_state());
    let resp = app
        .oneshot(form_req("/register", "login=alice&password=&role=User"))
        .await
        .expect("request should succeed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_unknown_role() {
    let app = routes::app(test_helpers::test_app_state());
    let resp = app
        .oneshot(form_req("/register", "login=alice&password=pw1&role=Overlord"))
        .await
        .expect("request should succeed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_duplicate_login() {
    let app = routes::app(test_helpers::test_app_state());
    let first = app
        .clone()
        .oneshot(form_req("/register", "login=alice&password=pw1&role=User"))
        .await
        .expect("request should succeed");
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    let second = app
        .oneshot(form_req("/register", "login=alice&password=other&role=User"))
        .await
        .expect("request should succeed");
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_success_redirects_to_login() {
    let app = routes::app(test_helpers::test_app_state());
    let resp = app
        .oneshot(form_req("/register", "login=alice&password=pw1&role=User"))
        .await
        .expect("request should succeed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

// =============================================================================
// POST /login
// =============================================================================

#[tokio::test]
async fn login_unknown_user_is_unauthorized() {
    let app = routes::app(test_helpers::test_app_state());
    let resp = app
        .oneshot(form_req("/login", "login=ghost&password=pw1"))
        .await
        .expect("request should succeed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_wrong_password_is_unauthorized() {
    let app = routes::app(test_helpers::test_app_state());
    // Repeated failures keep getting the same answer.
    for _ in 0..3 {
        let resp = app
            .clone()
            .oneshot(form_req("/login", "login=user&password=wrong"))
            .await
            .expect("request should succeed");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn login_success_sets_cookie_and_redirects_to_profile() {
    let app = routes::app(test_helpers::test_app_state());
    let resp = app
        .oneshot(form_req("/login", "login=user&password=user"))
        .await
        .expect("request should succeed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/profile");

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie present")
        .to_str()
        .expect("set-cookie is ascii");
    assert!(set_cookie.starts_with("session_token="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn registered_user_can_log_in_with_same_credentials() {
    let app = routes::app(test_helpers::test_app_state());
    let reg = app
        .clone()
        .oneshot(form_req("/register", "login=carol&password=s3cret&role=User"))
        .await
        .expect("request should succeed");
    assert_eq!(reg.status(), StatusCode::SEE_OTHER);

    let login = app
        .oneshot(form_req("/login", "login=carol&password=s3cret"))
        .await
        .expect("request should succeed");
    assert_eq!(login.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&login), "/profile");
}

// =============================================================================
// GET /logout
// =============================================================================

#[tokio::test]
async fn logout_clears_cookie_and_redirects_home() {
    let app = routes::app(test_helpers::test_app_state());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/logout")
                .header(header::COOKIE, "session_token=whatever")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should succeed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie present")
        .to_str()
        .expect("set-cookie is ascii");
    assert!(set_cookie.starts_with("session_token="), "cookie should be cleared: {set_cookie}");
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn logout_without_cookie_still_succeeds() {
    let app = routes::app(test_helpers::test_app_state());
    let resp = app
        .oneshot(Request::builder().uri("/logout").body(Body::empty()).expect("request should build"))
        .await
        .expect("request should succeed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

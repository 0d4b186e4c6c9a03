//! Auth routes and the auth gate — registration, login/logout, the
//! `AuthUser` extractor, and the role check.
//!
//! DESIGN
//! ======
//! Authentication and authorization are two separate checks applied in
//! sequence. `AuthUser` answers "is there a live session" and redirects to
//! `/login` when there is not (a normal flow, not an error). `authorize`
//! answers "does the user's role equal X" against the *live* store record,
//! never the session snapshot, so an administrative role change takes
//! effect on the next request instead of persisting until re-login.

use axum::extract::{Form, FromRef, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::render;
use crate::services::password;
use crate::services::session::SessionUser;
use crate::services::store::{NewUser, StoreError};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(max_age)
        .build()
}

fn store_failure(context: &str, err: &StoreError) -> Response {
    tracing::error!(error = %err, "{context}");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}

// =============================================================================
// AUTH GATE
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication; an absent or
/// expired session redirects to `/login`.
pub struct AuthUser {
    pub user: SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(Redirect::to("/login").into_response());
        }

        let app_state = AppState::from_ref(state);
        let user = app_state
            .sessions
            .read(token)
            .await
            .map_err(|e| store_failure("session read failed", &e))?
            .ok_or_else(|| Redirect::to("/login").into_response())?;

        Ok(Self { user, token: token.to_owned() })
    }
}

/// Role check against the live store record.
///
/// The session's role claim is a login-time snapshot; this re-fetches the
/// user by id and compares the current role, in both storage modes. A user
/// deleted out from under an active session is denied the same way as a
/// role mismatch.
pub async fn authorize(state: &AppState, session: &SessionUser, required_role: &str) -> Result<(), Response> {
    let live = match state.users.find_by_id(session.id).await {
        Ok(record) => record,
        Err(e) => return Err(store_failure("role check lookup failed", &e)),
    };

    match live {
        Some(user) if user.role == required_role => Ok(()),
        _ => {
            tracing::info!(login = %session.login, required_role, "access denied");
            Err((StatusCode::FORBIDDEN, "access denied: insufficient privileges").into_response())
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /register` — registration form with role options from the store.
pub async fn register_form(State(state): State<AppState>) -> Response {
    let roles = match state.users.list_roles().await {
        Ok(roles) => roles,
        Err(e) => return store_failure("role list failed", &e),
    };

    let options: String = roles
        .iter()
        .map(|r| {
            let name = render::escape(&r.name);
            format!(r#"<option value="{name}">{name}</option>"#)
        })
        .collect();
    let body = format!(
        r#"<form method="post" action="/register">
        <label>Login: <input name="login" required></label><br>
        <label>Password: <input type="password" name="password" required></label><br>
        <label>Role: <select name="role">{options}</select></label><br>
        <button type="submit">Register</button>
        </form>"#
    );
    Html(render::page("Register", &body)).into_response()
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub login: String,
    pub password: String,
    pub role: String,
}

/// `POST /register` — create a user, redirect to `/login`.
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let login = form.login.trim();
    if login.is_empty() || form.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "login and password are required").into_response();
    }

    let new = NewUser {
        login: login.to_owned(),
        password: form.password,
        name: None,
        phone: None,
        role: form.role,
    };
    match state.users.create(new).await {
        Ok(user) => {
            tracing::info!(login = %user.login, role = %user.role, "user registered");
            Redirect::to("/login").into_response()
        }
        Err(e @ (StoreError::EmptyLogin | StoreError::DuplicateLogin | StoreError::UnknownRole)) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => store_failure("registration failed", &e),
    }
}

/// `GET /login` — login form.
pub async fn login_form() -> Html<String> {
    let body = r#"<form method="post" action="/login">
        <label>Login: <input name="login" required></label><br>
        <label>Password: <input type="password" name="password" required></label><br>
        <button type="submit">Log in</button>
        </form>"#;
    Html(render::page("Login", body))
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
}

/// `POST /login` — verify credentials, establish a session, set the cookie,
/// redirect to `/profile`.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let found = match state.users.find_by_login(form.login.trim()).await {
        Ok(found) => found,
        Err(e) => return store_failure("login lookup failed", &e),
    };

    // Unknown login and wrong password get the same answer.
    let Some(user) = found else {
        return (StatusCode::UNAUTHORIZED, "invalid login or password").into_response();
    };
    if !password::verify_blocking(form.password, user.credential.clone()).await {
        return (StatusCode::UNAUTHORIZED, "invalid login or password").into_response();
    }

    let snapshot = SessionUser { id: user.id, login: user.login.clone(), role: user.role.clone() };
    let token = match state.sessions.establish(snapshot).await {
        Ok(token) => token,
        Err(e) => return store_failure("session create failed", &e),
    };

    tracing::info!(login = %user.login, role = %user.role, "user logged in");
    let cookie = session_cookie(token, Duration::hours(24));
    (jar.add(cookie), Redirect::to("/profile")).into_response()
}

/// `GET /logout` — destroy the session (if any), clear the cookie, redirect
/// home. Never fails.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(COOKIE_NAME) {
        // Destroy is idempotent; a store hiccup here is not worth failing logout over.
        let _ = state.sessions.destroy(cookie.value()).await;
    }

    let cleared = session_cookie(String::new(), Duration::ZERO);
    (CookieJar::new().add(cleared), Redirect::to("/"))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

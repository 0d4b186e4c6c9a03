//! Role-gated pages: home, profile, admin.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::auth::{self, AuthUser};
use crate::render;
use crate::state::AppState;

/// `GET /` — home page; shows login state without requiring a session.
pub async fn home(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let user = match jar.get(auth::COOKIE_NAME).map(Cookie::value) {
        // A store failure on the public home page degrades to "not signed in".
        Some(token) => state.sessions.read(token).await.ok().flatten(),
        None => None,
    };

    let body = match user {
        Some(u) => format!(
            "<p>Signed in as: {} (role: {})</p>",
            render::escape(&u.login),
            render::escape(&u.role)
        ),
        None => "<p>You are not signed in.</p>".to_owned(),
    };
    Html(render::page("Home", &body))
}

/// `GET /profile` — authenticated page showing the live record's login and
/// role, not the session snapshot.
pub async fn profile(State(state): State<AppState>, auth: AuthUser) -> Result<Html<String>, Response> {
    let record = state.users.find_by_id(auth.user.id).await.map_err(|e| {
        tracing::error!(error = %e, "profile lookup failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    })?;

    // Account deleted since login: the session is no longer good for anything.
    let Some(record) = record else {
        return Err(Redirect::to("/login").into_response());
    };

    let mut body = format!(
        "<p>Login: {}<br>Role: {}",
        render::escape(&record.login),
        render::escape(&record.role)
    );
    if let Some(name) = &record.name {
        body.push_str(&format!("<br>Name: {}", render::escape(name)));
    }
    if let Some(phone) = &record.phone {
        body.push_str(&format!("<br>Phone: {}", render::escape(phone)));
    }
    body.push_str("</p>");
    Ok(Html(render::page("Profile", &body)))
}

/// `GET /admin` — requires an Administrator role on the live record.
pub async fn admin(State(state): State<AppState>, auth: AuthUser) -> Result<Html<String>, Response> {
    auth::authorize(&state, &auth.user, crate::services::store::ROLE_ADMIN).await?;
    Ok(Html(render::page(
        "Admin panel",
        "<p>Welcome to the admin panel. Administrators only.</p>",
    )))
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;

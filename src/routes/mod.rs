//! Router assembly.

pub mod auth;
pub mod pages;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/profile", get(pages::profile))
        .route("/admin", get(pages::admin))
        .route("/logout", get(auth::logout))
        .route("/healthz", get(pages::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

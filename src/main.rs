mod db;
mod render;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let no_db = routes::auth::env_bool("NO_DB").unwrap_or(false);
    let database_url = std::env::var("DATABASE_URL").ok();

    let state = match database_url {
        Some(url) if !no_db => {
            let pool = db::init_pool(&url).await.expect("database init failed");
            db::seed(&pool).await.expect("database seed failed");
            tracing::info!("persistent store ready");
            state::AppState::persistent(pool)
        }
        _ => {
            tracing::warn!("no database configured; using in-memory store with plaintext credentials (dev/test only)");
            state::AppState::memory()
        }
    };

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "rolegate listening");
    axum::serve(listener, app).await.expect("server failed");
}

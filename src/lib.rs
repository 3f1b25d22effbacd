//! Portfolio Site - content store, admin gate, and the HTTP surface over them

pub mod app;
pub mod auth;
pub mod comments;
pub mod content;
pub mod ingest;
pub mod logging;
pub mod routes;
pub mod share;
pub mod store;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::app::{Portfolio, SiteConfig};
use crate::routes::SharedPortfolio;
use crate::store::{StoreConfig, StoreError};

/// Uploads are embedded as data URLs, so the cap sits well above the store quota.
const BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to open local store: {0}")]
    Store(#[from] StoreError),
    #[error("invalid HOST/PORT configuration: {0}")]
    Addr(#[from] std::net::AddrParseError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configure CORS from ALLOWED_ORIGINS (comma-separated).
/// Falls back to the local frontend origins.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect::<Vec<HeaderValue>>()
        })
        .filter(|origins| !origins.is_empty())
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: SharedPortfolio) -> Router {
    let cors = configure_cors();

    Router::new()
        .route("/health", get(routes::health::health_ping))
        .route("/api/session", get(routes::auth::session))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/forgot-password", post(routes::auth::forgot_password))
        .route("/api/auth/change-password", post(routes::auth::change_password))
        .route("/api/auth/reader", post(routes::auth::reader_gate))
        .route(
            "/api/profile",
            get(routes::auth::get_profile).patch(routes::auth::update_profile),
        )
        .route("/api/profile/avatar", post(routes::auth::upload_avatar))
        .route(
            "/api/content",
            get(routes::content::list_all).post(routes::content::create),
        )
        .route("/api/content/{type}", get(routes::content::list_bucket))
        .route(
            "/api/content/{type}/{id}",
            axum::routing::delete(routes::content::delete),
        )
        .route(
            "/api/content/{type}/{id}/file",
            get(routes::content::download_file),
        )
        .route("/api/backup", get(routes::content::backup))
        .route("/api/backup/restore", post(routes::content::restore))
        .route(
            "/api/comments",
            get(routes::comments::list).post(routes::comments::add),
        )
        .route(
            "/api/settings/social",
            get(routes::settings::get_social).put(routes::settings::update_social),
        )
        .route("/api/share/resolve", post(routes::share::resolve))
        .route("/api/share/{id}", get(routes::share::share_url))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(axum::extract::DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Run the server (used by main).
pub async fn run() -> Result<(), ServerError> {
    dotenvy::dotenv().ok();

    // Dropping the guards stops the background log writers.
    let log_config = logging::LogConfig::default();
    let _log_guards = logging::init(&log_config);

    routes::health::init_start_time();

    let mut site_config = SiteConfig::default();
    if let Ok(path) = std::env::var("ADMIN_AVATAR_FILE") {
        if let Err(e) = site_config.embed_avatar_file(&path).await {
            tracing::warn!(error = %e, "ignoring ADMIN_AVATAR_FILE");
        }
    }
    if log_config.is_production() && std::env::var("SITE_URL").is_err() {
        tracing::warn!(
            site_url = %site_config.site_url,
            "SITE_URL not set; share links will point at the development origin"
        );
    }

    let store_config = StoreConfig::default();
    let store = store::open_store(&store_config).inspect_err(|e| {
        tracing::error!(dir = %store_config.dir.display(), error = %e, "cannot open local store");
    })?;
    let portfolio = Portfolio::load(store, site_config);
    let app = create_app(Arc::new(Mutex::new(portfolio)));

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = test_app();
        let (status, _) = get(&app, "/api/posts").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let app = test_app();
        let res = tower::ServiceExt::oneshot(
            app,
            axum::http::Request::get("/health")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
        assert!(res.headers().contains_key("x-request-id"));
    }
}

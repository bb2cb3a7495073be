//! Caravan site backend
//!
//! REST backend for the public caravan website and its admin panel, with
//! SQLite document persistence, media uploads and a change-event stream.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod events;
mod listing;
mod media;
mod models;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::DocumentStore;
use media::{MediaStore, MEDIA_ROUTE};
use models::PostFeed;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub media: Arc<MediaStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting caravan backend for project {}", config.project_id);
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Media directory: {:?}", config.media_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_api_key.is_none() {
        tracing::warn!(
            "No admin key configured (CARAVAN_ADMIN_API_KEY). Admin routes are open!"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let store = Arc::new(DocumentStore::new(pool));

    let media = Arc::new(MediaStore::open(&config.media_dir, &config.public_base_url).await?);

    let state = AppState {
        store: store.clone(),
        media,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Shut down cleanly");

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_key: Option<Arc<str>> = state.config.admin_api_key.as_deref().map(Arc::from);

    // Public site routes
    let mut public_routes = Router::new()
        .route("/api/revision", get(api::get_revision))
        .route("/api/events", get(api::change_events))
        // Caravans
        .route("/api/caravans", get(api::list_caravans))
        .route("/api/caravans/{id}", get(api::get_caravan))
        // Reviews
        .route(
            "/api/reviews",
            get(api::list_reviews).post(api::create_review),
        )
        .route("/api/reviews/summary/{caravan_id}", get(api::review_summary))
        // Dealers
        .route("/api/dealers", get(api::list_dealers))
        .route("/api/dealers/nearest", get(api::nearest_dealers))
        .route("/api/dealers/{id}", get(api::get_dealer))
        // Forms
        .route("/api/bookings", post(api::create_booking))
        .route("/api/newsletter", post(api::subscribe))
        .route("/api/inquiries/{kind}", post(api::submit_inquiry));
    for feed in [PostFeed::Blogs, PostFeed::Articles] {
        public_routes = api::post_routes(public_routes, feed);
    }

    // Admin routes
    let mut admin_routes = Router::new()
        // Caravans
        .route("/caravans", post(api::create_caravan))
        .route(
            "/caravans/{id}",
            put(api::update_caravan).delete(api::delete_caravan),
        )
        // Reviews
        .route(
            "/reviews/{id}",
            put(api::update_review).delete(api::delete_review),
        )
        // Bookings
        .route("/bookings", get(api::list_bookings))
        .route("/bookings/{id}", axum::routing::delete(api::delete_booking))
        .route("/bookings/{id}/status", put(api::update_booking_status))
        // Newsletter
        .route("/newsletter", get(api::list_subscribers))
        .route(
            "/newsletter/{id}",
            axum::routing::delete(api::delete_subscriber),
        )
        // Dealers
        .route("/dealers", post(api::create_dealer))
        .route(
            "/dealers/{id}",
            put(api::update_dealer).delete(api::delete_dealer),
        )
        // Inquiries
        .route("/inquiries/{kind}", get(api::list_inquiries))
        .route("/inquiries/{kind}/stats", get(api::inquiry_stats))
        .route(
            "/inquiries/{kind}/{id}",
            get(api::get_inquiry).delete(api::delete_inquiry),
        )
        .route(
            "/inquiries/{kind}/{id}/status",
            put(api::update_inquiry_status),
        )
        // Media
        .route("/uploads", post(api::upload_media));
    for feed in [PostFeed::Blogs, PostFeed::Articles] {
        admin_routes = api::admin_post_routes(admin_routes, feed);
    }
    let admin_routes = admin_routes.layer(middleware::from_fn(move |req, next| {
        auth::admin_auth_layer(admin_key.clone(), req, next)
    }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    let max_body = state.config.max_upload_bytes;
    let media_dir = state.media.dir().to_path_buf();

    Router::new()
        .merge(public_routes)
        .nest("/api/admin", admin_routes)
        .merge(health_routes)
        .nest_service(MEDIA_ROUTE, ServeDir::new(media_dir))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests;

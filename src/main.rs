use axum::{
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use mediashare_api::config;
use mediashare_api::database::manager::DatabaseManager;
use mediashare_api::handlers::{auth, content, ratings};
use mediashare_api::middleware::jwt_auth_middleware;
use mediashare_api::services::RatingService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting mediashare API in {:?} mode", config.environment);

    // The server still starts without a database; /health reports degraded
    // until it comes up and migrations are applied on the next boot.
    match DatabaseManager::migrate().await {
        Ok(()) => reconcile_counters().await,
        Err(e) => tracing::warn!("Skipping migrations, database unavailable: {}", e),
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("mediashare API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Safety net for the denormalized rating counters: every mutation keeps
/// them in its own transaction, so a non-zero repair count means something
/// outside this API touched the tables.
async fn reconcile_counters() {
    match RatingService::new().await {
        Ok(service) => match service.reconcile_rating_counts().await {
            Ok(0) => tracing::debug!("Rating counters verified"),
            Ok(repaired) => tracing::warn!("Repaired {} drifted rating counters", repaired),
            Err(e) => tracing::warn!("Rating counter reconciliation failed: {}", e),
        },
        Err(e) => tracing::warn!("Rating counter reconciliation skipped: {}", e),
    }
}

fn app() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api", get(api_info))
        .merge(auth_routes())
        .merge(content_routes())
        .merge(rating_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    let public = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/api/auth/me", get(auth::whoami))
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware));

    public.merge(protected)
}

fn content_routes() -> Router {
    let public = Router::new()
        .route("/api/content", get(content::content_list))
        .route("/api/content/categories", get(content::categories))
        .route("/api/content/:media_id", get(content::content_get));

    let protected = Router::new()
        .route("/api/content", post(content::content_create))
        .route(
            "/api/content/:media_id",
            put(content::content_put).delete(content::content_delete),
        )
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware));

    public.merge(protected)
}

fn rating_routes() -> Router {
    let public = Router::new()
        .route("/api/ratings", get(ratings::rating_list))
        .route("/api/ratings/media/:media_id/stats", get(ratings::media_stats))
        .route("/api/ratings/:rating_id", get(ratings::rating_get));

    let protected = Router::new()
        .route("/api/ratings", post(ratings::rating_create))
        .route(
            "/api/ratings/:rating_id",
            put(ratings::rating_put).delete(ratings::rating_delete),
        )
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware));

    public.merge(protected)
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "healthy",
                "service": "Content Sharing Platform API",
                "database": "ok",
                "timestamp": now,
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "service": "Content Sharing Platform API",
                "database_error": e.to_string(),
                "timestamp": now,
            })),
        ),
    }
}

async fn api_info() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Content Sharing Platform API",
        "version": version,
        "endpoints": {
            "auth": {
                "register": "POST /api/auth/register",
                "login": "POST /api/auth/login",
                "me": "GET /api/auth/me",
            },
            "content": {
                "create": "POST /api/content",
                "list": "GET /api/content",
                "get": "GET /api/content/:media_id",
                "update": "PUT /api/content/:media_id",
                "delete": "DELETE /api/content/:media_id",
                "categories": "GET /api/content/categories",
            },
            "ratings": {
                "create": "POST /api/ratings",
                "list": "GET /api/ratings",
                "get": "GET /api/ratings/:rating_id",
                "update": "PUT /api/ratings/:rating_id",
                "delete": "DELETE /api/ratings/:rating_id",
                "stats": "GET /api/ratings/media/:media_id/stats",
            },
        },
    }))
}

// HTTP route table: the API tier under /api, then the static asset tier.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::assets::StaticAssets;
use crate::health;
use crate::metrics;

/// Routes advertised by the service index.
pub const ENDPOINTS: &[&str] = &["GET /api", "GET /api/health", "GET /api/metrics"];

const SERVICE_NAME: &str = "FantasyRA Backend";

// ── Error helper ──────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> impl IntoResponse {
    (status, Json(json!({ "error": msg })))
}

// ── Router ────────────────────────────────────────────────────────────

/// Build the application router.
///
/// Tier 1 is the API: exact routes under `/api`, with a JSON 404 for
/// anything else under that prefix. Tier 2 exists only when a build was
/// found: real files from the build directory, then the entry document.
/// Without a build, non-API paths get the default empty 404.
pub fn router(assets: Option<StaticAssets>) -> Router {
    let api = Router::new()
        .route("/api", get(service_index))
        .route("/api/health", get(health::health_check))
        .route("/api/metrics", get(metrics_text))
        .route("/api/", any(api_not_found))
        .route("/api/{*rest}", any(api_not_found))
        .layer(cors_layer());

    // Attached after the CORS layer so asset responses don't carry it.
    let app = match assets {
        Some(assets) => api.fallback_service(assets.service()),
        None => api,
    };

    app.layer(middleware::from_fn(track_requests))
}

/// CORS policy for browser clients served from another origin. API tier only.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn track_requests(req: Request, next: Next) -> Response {
    let tier = metrics::request_tier(req.uri().path());
    let start = Instant::now();

    let response = next.run(req).await;

    metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[tier, response.status().as_str()])
        .inc();
    metrics::HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[tier])
        .observe(start.elapsed().as_secs_f64());

    response
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn service_index() -> impl IntoResponse {
    Json(json!({
        "service": SERVICE_NAME,
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ENDPOINTS,
    }))
}

async fn metrics_text() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

async fn api_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "Not Found")
}

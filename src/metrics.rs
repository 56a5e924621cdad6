// Prometheus metrics definitions for the FantasyRA backend.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// 1 when the startup probe found a front-end build, 0 in API-only mode.
    pub static ref STATIC_ENABLED: IntGauge =
        IntGauge::new("fantasyra_static_enabled", "Whether a static build is being served").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    /// Total HTTP requests, by route tier (api/static) and status.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("fantasyra_http_requests_total", "Total HTTP requests"),
        &["tier", "status"],
    )
    .unwrap();

    /// Total liveness probes answered.
    pub static ref HEALTH_CHECKS_TOTAL: IntCounter = IntCounter::new(
        "fantasyra_health_checks_total",
        "Health checks answered",
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Request duration in seconds, by route tier.
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "fantasyra_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["tier"],
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Safe to call more than once;
/// every server instance calls it on start.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(STATIC_ENABLED.clone()),
            Box::new(HTTP_REQUESTS_TOTAL.clone()),
            Box::new(HEALTH_CHECKS_TOTAL.clone()),
            Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()),
        ];

        for c in collectors {
            if let Err(e) = REGISTRY.register(c) {
                tracing::warn!("Failed to register metric: {e}");
            }
        }
    });
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Classify a request path into the route tier that answers it. Used as a
/// metric label so asset paths don't explode label cardinality.
pub fn request_tier(path: &str) -> &'static str {
    if path == "/api" || path.starts_with("/api/") {
        "api"
    } else {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_tier_api() {
        assert_eq!(request_tier("/api"), "api");
        assert_eq!(request_tier("/api/health"), "api");
        assert_eq!(request_tier("/api/unknown/deep"), "api");
    }

    #[test]
    fn test_request_tier_static() {
        assert_eq!(request_tier("/"), "static");
        assert_eq!(request_tier("/wiki"), "static");
        assert_eq!(request_tier("/assets/app.js"), "static");
        // Only the /api segment counts, not a prefix of another word
        assert_eq!(request_tier("/apiary"), "static");
    }

    #[test]
    fn test_register_twice_does_not_panic() {
        register_metrics();
        register_metrics();
        HEALTH_CHECKS_TOTAL.inc();
        let output = gather_metrics();
        assert!(output.contains("fantasyra_health_checks_total"));
    }

    #[test]
    fn test_metric_increments() {
        STATIC_ENABLED.set(1);
        assert_eq!(STATIC_ENABLED.get(), 1);
        STATIC_ENABLED.set(0);

        HTTP_REQUESTS_TOTAL.with_label_values(&["api", "200"]).inc();
        HTTP_REQUEST_DURATION_SECONDS
            .with_label_values(&["static"])
            .observe(0.002);
    }
}

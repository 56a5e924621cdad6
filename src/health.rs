// Liveness payload served at GET /api/health.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::metrics;

/// Server-side liveness payload. Built fresh for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    /// Milliseconds since the Unix epoch.
    pub now: i64,
}

impl HealthStatus {
    pub fn now() -> Self {
        Self {
            ok: true,
            now: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// GET /api/health - always 200, no I/O, no inputs consulted.
pub async fn health_check() -> Json<HealthStatus> {
    metrics::HEALTH_CHECKS_TOTAL.inc();
    Json(HealthStatus::now())
}

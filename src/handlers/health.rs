//! Health check handler

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: i64,
}

pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Service banner at `/`
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "NetShield firewall decision service",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
    }))
}

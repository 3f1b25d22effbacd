/**
 * Health Routes
 * Liveness plus Local Store usage
 */
use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::routes::SharedPortfolio;

// Track server start time for uptime calculation
lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUsage {
    pub used_bytes: usize,
    pub quota_bytes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub store: StoreUsage,
}

/// GET /health
pub async fn health_ping(State(state): State<SharedPortfolio>) -> impl IntoResponse {
    let (used_bytes, quota_bytes) = state.lock().await.store_usage();
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime: SERVER_START.elapsed().as_secs(),
        store: StoreUsage {
            used_bytes,
            quota_bytes,
        },
    })
}

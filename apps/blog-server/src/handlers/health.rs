//! Health check endpoint.

use actix_web::{HttpResponse, web};
use inkwell_shared::dto::HealthResponse;

use crate::state::{AppState, Storage};

/// Health check endpoint - returns server and storage status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = match &state.storage {
        Storage::Memory => true,
        #[cfg(feature = "postgres")]
        Storage::Postgres(db) => db.is_healthy().await,
    };

    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage.name().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

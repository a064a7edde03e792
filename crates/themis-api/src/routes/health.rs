use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{config::StorageBackend, error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Returns the health status of the API and its storage backend
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    let storage = match state.config.storage.backend {
        StorageBackend::Memory => "memory",
        StorageBackend::Mongodb => "mongodb",
    };
    let storage_status = match state.chat.persistence().ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Storage ping failed");
            "disconnected"
        }
    };
    services.insert(storage.to_string(), storage_status.to_string());
    services.insert("llm".to_string(), state.config.llm.model.clone());

    let status = if storage_status == "connected" { "healthy" } else { "degraded" };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}

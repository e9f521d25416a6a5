//! Health endpoints

use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::service::UrlService;
use crate::storage::Storage;

const SERVICE_NAME: &str = "Shortly";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: HealthStatus,
    details: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Components {
    storage: ComponentHealth,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: HealthStatus,
    timestamp: DateTime<Utc>,
    components: Components,
}

/// Health of Shortly and its storage
///
/// Always answers, `DOWN` signals the storage can not be reached
pub async fn health<S: Storage>(
    Extension(service): Extension<UrlService<S>>,
) -> Json<HealthResponse> {
    let storage = if service.is_healthy().await {
        ComponentHealth {
            status: HealthStatus::Up,
            details: "Storage reachable",
        }
    } else {
        ComponentHealth {
            status: HealthStatus::Down,
            details: "Storage unreachable",
        }
    };

    Json(HealthResponse {
        status: storage.status,
        timestamp: Utc::now(),
        components: Components { storage },
    })
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    message: &'static str,
    timestamp: DateTime<Utc>,
    service: &'static str,
}

/// Liveness, without touching the storage
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong",
        timestamp: Utc::now(),
        service: SERVICE_NAME,
    })
}

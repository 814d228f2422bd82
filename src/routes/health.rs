use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthData {
    fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is up", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::success(
        "Health check",
        HealthData::new("ok"),
        Some(Meta::empty()),
    ))
}

#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Database reachable", body = ApiResponse<HealthData>),
        (status = 503, description = "Database unreachable", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn readiness(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    match state.orm.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Ready",
                HealthData::new("ok"),
                Some(Meta::empty()),
            )),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::success(
                    "Not ready",
                    HealthData::new("database unreachable"),
                    Some(Meta::empty()),
                )),
            )
        }
    }
}

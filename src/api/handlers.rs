use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::collections::HashMap;

use crate::api::response::ApiResponse;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> ApiResponse<RootResponse> {
    let api = state.settings().api();
    ApiResponse::ok(
        "OK",
        RootResponse {
            message: api.project_name.clone(),
            version: api.version.clone(),
            api_prefix: api.api_v1_str.clone(),
        },
    )
}

pub(crate) async fn healthz(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let mut components = HashMap::new();

    let (status_code, status) = match repositories::health::ping(state.db()).await {
        Ok(()) => {
            components.insert("database".to_string(), "healthy".to_string());
            (StatusCode::OK, "healthy")
        }
        Err(err) => {
            tracing::error!(error = %err, "Database health check failed");
            components.insert("database".to_string(), "unhealthy".to_string());
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };

    let body = HealthResponse {
        service: "exam-lifecycle".to_string(),
        status: status.to_string(),
        components,
    };
    if status_code == StatusCode::OK {
        ApiResponse::ok(status, body)
    } else {
        ApiResponse::message(status_code, status).with_data(body)
    }
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

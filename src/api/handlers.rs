//! API request handlers

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cli::inspect_export;
use crate::error::CapTableError;
use crate::transform::run_transformation;

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    pub fn err(message: impl Into<String>, kind: &str) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
            error_kind: Some(kind.to_string()),
        }
    }
}

/// HTTP status for a terminal transformation error
pub fn status_for(error: &CapTableError) -> StatusCode {
    match error {
        CapTableError::MissingFile(_) => StatusCode::NOT_FOUND,
        CapTableError::Format(_)
        | CapTableError::SheetNotFound { .. }
        | CapTableError::Workbook(_)
        | CapTableError::Config(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CapTableError::Write(_) | CapTableError::Io(_) | CapTableError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Run blocking spreadsheet work off the async executor and wrap the result
async fn blocking_response<T, F>(work: F) -> (StatusCode, Json<ApiResponse<T>>)
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T, CapTableError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(data)) => (StatusCode::OK, Json(ApiResponse::ok(data))),
        Ok(Err(e)) => (status_for(&e), Json(ApiResponse::err(e.to_string(), e.kind()))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(format!("worker failed: {}", e), "internal")),
        ),
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(RootResponse {
        name: "Carta Cap Table API".to_string(),
        version: state.version.clone(),
        description: "Populate a cap table template from a Carta export".to_string(),
        endpoints: vec![
            endpoint("/health", "GET", "Health check endpoint"),
            endpoint("/version", "GET", "Get server version"),
            endpoint("/api/v1/transform", "POST", "Populate a template from an export"),
            endpoint("/api/v1/inspect", "POST", "Parse an export without writing anything"),
        ],
    }))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["transform".to_string(), "inspect".to_string()],
    }))
}

/// Transform request
#[derive(Deserialize)]
pub struct TransformRequest {
    pub export_path: String,
    pub template_path: String,
    #[serde(default)]
    pub output_dir: Option<String>,
}

/// POST /api/v1/transform - Populate a template
pub async fn transform(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransformRequest>,
) -> impl IntoResponse {
    let config = state.transform.clone();
    blocking_response(move || {
        let output_dir = req.output_dir.map(PathBuf::from);
        run_transformation(
            Path::new(&req.export_path),
            Path::new(&req.template_path),
            output_dir.as_deref(),
            &config,
        )
    })
    .await
}

/// Inspect request
#[derive(Deserialize)]
pub struct InspectRequest {
    pub export_path: String,
    #[serde(default)]
    pub sheet: Option<String>,
}

/// POST /api/v1/inspect - Parse an export
pub async fn inspect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InspectRequest>,
) -> impl IntoResponse {
    let config = state.transform.clone();
    blocking_response(move || {
        inspect_export(Path::new(&req.export_path), req.sheet.as_deref(), &config)
    })
    .await
}

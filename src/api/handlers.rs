//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::BridgeError;
use crate::serie::Serie;
use crate::transform::transform_file;

use super::server::AppState;

/// Multipart field carrying the spreadsheet
pub const FILE_FIELD: &str = "excelFile";
/// Multipart field carrying the caller's session id
pub const SESSION_FIELD: &str = "sessionId";
/// Multipart field carrying the serie code
pub const SERIE_FIELD: &str = "serie";

const ALLOWED_CONTENT_TYPES: [&str; 3] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/octet-stream",
];

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }
}

/// Error body for the conversion endpoints: `{"error": "..."}`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error carrying the HTTP status it maps to
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        let status = match err {
            BridgeError::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
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

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Factura Bridge".to_string(),
        version: state.version.clone(),
        description: "Converts booking spreadsheets into the invoice import layout".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new(
                "/api/transform",
                "POST",
                "Upload a spreadsheet (multipart: excelFile, sessionId, serie) and convert it",
            ),
            EndpointInfo::new(
                "/api/progress/:session_id",
                "GET",
                "Poll conversion progress for a session",
            ),
            EndpointInfo::new(
                "/api/download/:filename",
                "GET",
                "Download a converted file",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
}

/// GET /health - Health check
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        active_sessions: state.progress.len(),
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
        features: vec![
            "transform".to_string(),
            "progress".to_string(),
            "download".to_string(),
        ],
    }))
}

/// Successful conversion response
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    pub success: bool,
    pub message: String,
    pub output_file: String,
    pub session_id: String,
}

/// Upload pulled out of the multipart body
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Whether an upload looks like a spreadsheet, by content type or extension
pub fn is_spreadsheet(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    if content_type.is_some_and(|ct| ALLOWED_CONTENT_TYPES.contains(&ct)) {
        return true;
    }

    file_name
        .map(|name| name.to_ascii_lowercase())
        .is_some_and(|name| name.ends_with(".xlsx") || name.ends_with(".xls"))
}

/// Accept only bare file names, never paths
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
}

/// Extension for the stored upload; the reader picks its format from it
fn upload_extension(file_name: Option<&str>) -> &'static str {
    match file_name.map(|name| name.to_ascii_lowercase()) {
        Some(name) if name.ends_with(".xls") => "xls",
        _ => "xlsx",
    }
}

/// Name for a converted file, unique per millisecond
pub fn output_file_name() -> String {
    format!("converted_{}.xlsx", chrono::Utc::now().timestamp_millis())
}

/// POST /api/transform - Upload and convert a spreadsheet
pub async fn transform_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TransformResponse>, ApiError> {
    let mut upload: Option<Upload> = None;
    let mut session_id: Option<String> = None;
    let mut serie = Serie::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e))
                })?;
                upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            SESSION_FIELD => {
                let text = field.text().await.map_err(|e| {
                    ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e))
                })?;
                if !text.trim().is_empty() {
                    session_id = Some(text.trim().to_string());
                }
            }
            SERIE_FIELD => {
                let text = field.text().await.map_err(|e| {
                    ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e))
                })?;
                if !text.trim().is_empty() {
                    serie = text.parse().map_err(|_| {
                        ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid serie: {}", text))
                    })?;
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "No file provided"))?;

    if !is_spreadsheet(upload.file_name.as_deref(), upload.content_type.as_deref()) {
        return Err(BridgeError::UnsupportedFileType(
            "only Excel files (.xlsx, .xls) are accepted".to_string(),
        )
        .into());
    }

    let session_id =
        session_id.unwrap_or_else(|| chrono::Utc::now().timestamp_millis().to_string());
    let output_name = output_file_name();
    let input_path = state.upload_dir.join(format!(
        "{}.{}",
        Uuid::new_v4(),
        upload_extension(upload.file_name.as_deref())
    ));
    let output_path = state.output_dir.join(&output_name);

    let job = ConversionJob {
        session_id: session_id.clone(),
        serie,
        upload,
        input_path,
        output_path,
        output_name: output_name.clone(),
    };

    // Detached so progress and cleanup finish even if the client goes away
    tokio::spawn(run_conversion(state, job))
        .await
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Conversion task aborted: {}", e),
            )
        })??;

    Ok(Json(TransformResponse {
        success: true,
        message: "File converted successfully".to_string(),
        output_file: output_name,
        session_id,
    }))
}

/// One accepted upload on its way through the converter
struct ConversionJob {
    session_id: String,
    serie: Serie,
    upload: Upload,
    input_path: PathBuf,
    output_path: PathBuf,
    output_name: String,
}

/// Store the upload, convert it, and settle the session's progress entry
async fn run_conversion(state: Arc<AppState>, job: ConversionJob) -> Result<(), ApiError> {
    let ConversionJob {
        session_id,
        serie,
        upload,
        input_path,
        output_path,
        output_name,
    } = job;

    tokio::fs::write(&input_path, &upload.bytes)
        .await
        .map_err(|e| ApiError::from(BridgeError::Io(e)))?;

    state.progress.start(&session_id);
    info!(session = %session_id, serie = %serie, file = ?upload.file_name, "conversion started");

    let joined = {
        let store = state.progress.clone();
        let sid = session_id.clone();
        let input = input_path.clone();
        let output = output_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut report = |current: usize, total: usize| store.update(&sid, current, total);
            transform_file(&input, &output, Some(&mut report), serie)
        })
        .await
    };

    let result = match joined {
        Ok(outcome) => outcome.map_err(ApiError::from),
        Err(e) => Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Conversion task aborted: {}", e),
        )),
    };

    match result {
        Ok(()) => {
            remove_quietly(&input_path).await;
            state.progress.complete(&session_id, &output_name);
            info!(session = %session_id, output = %output_name, "conversion completed");
            Ok(())
        }
        Err(e) => {
            error!(session = %session_id, error = %e.message, "conversion failed");
            remove_quietly(&input_path).await;
            remove_quietly(&output_path).await;
            state.progress.fail(&session_id, &e.message);
            Err(e)
        }
    }
}

async fn remove_quietly(path: &FsPath) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove temporary file");
        }
    }
}

/// GET /api/progress/:session_id - Poll progress
pub async fn progress(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Response {
    match state.progress.get(&session_id) {
        Some(entry) => Json(entry).into_response(),
        None => ApiError::not_found("Session not found").into_response(),
    }
}

/// GET /api/download/:filename - Download a converted file
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    if !is_safe_file_name(&filename) {
        return Err(ApiError::not_found("File not found"));
    }

    let path: PathBuf = state.output_dir.join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::not_found("File not found"))?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

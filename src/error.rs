use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    #[error("Unknown executor: {0}")]
    UnknownExecutor(String),

    #[error("Unknown test type: {0}")]
    UnknownTestType(String),

    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),

    #[error("Invalid duration literal: {0}")]
    InvalidDuration(String),

    #[error("Invalid JSON file")]
    InvalidImport,

    #[error("No file provided")]
    MissingFile,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for WorkbenchError {
    fn into_response(self) -> Response {
        let status = match &self {
            WorkbenchError::UnknownExecutor(_) => StatusCode::BAD_REQUEST,
            WorkbenchError::UnknownTestType(_) => StatusCode::BAD_REQUEST,
            WorkbenchError::UnknownMethod(_) => StatusCode::BAD_REQUEST,
            WorkbenchError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
            WorkbenchError::InvalidImport => StatusCode::BAD_REQUEST,
            WorkbenchError::MissingFile => StatusCode::BAD_REQUEST,
            WorkbenchError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WorkbenchError::Json(_) => StatusCode::BAD_REQUEST,
            WorkbenchError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

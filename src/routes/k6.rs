use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::info;

use crate::error::WorkbenchError;
use crate::model::{TestConfig, TestResult};
use crate::report::{self, extract_summary};
use crate::results;
use crate::state::SharedState;
use crate::validation::validate;

/// POST /api/k6/script: Compile a TestConfig into script text.
pub async fn compile_script(
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, WorkbenchError> {
    let config = TestConfig::from_value(body)?;
    let script = crate::k6::compile(&config)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "script": script,
    })))
}

/// POST /api/k6/validate: Report problems in the fields the config actually uses.
pub async fn validate_config(
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, WorkbenchError> {
    let config = TestConfig::from_value(body)?;
    let errors = validate(&config);

    Ok(Json(serde_json::json!({
        "valid": errors.is_empty(),
        "errors": errors,
    })))
}

/// POST /api/k6/parse: Body is the raw console output of `k6 run`.
pub async fn parse_output(body: String) -> Json<serde_json::Value> {
    let metrics = extract_summary(&body);
    Json(serde_json::json!({
        "success": true,
        "metrics": metrics,
    }))
}

/// POST /api/k6/timeseries: Body is `k6 run --out json` NDJSON.
pub async fn timeseries(body: String) -> Json<report::TimeSeries> {
    Json(report::aggregate(&body))
}

/// POST /api/k6/import: Multipart upload with a `file` field.
pub async fn import_result(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, WorkbenchError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WorkbenchError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.txt").to_string();
        let content = field
            .text()
            .await
            .map_err(|e| WorkbenchError::BadRequest(e.to_string()))?;

        info!(
            "Importing {} ({} bytes, limit {})",
            file_name,
            content.len(),
            state.config.max_body_bytes
        );
        let result = results::import_file(&file_name, &content, Utc::now())?;

        return Ok(Json(serde_json::json!({
            "success": true,
            "result": result,
        })));
    }

    Err(WorkbenchError::MissingFile)
}

/// POST /api/k6/export: Echo a result back as a downloadable file.
pub async fn export_result(
    Json(result): Json<TestResult>,
) -> Result<impl IntoResponse, WorkbenchError> {
    let body = results::export_json(&result)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        results::export_file_name(&result)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

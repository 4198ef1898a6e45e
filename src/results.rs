use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::error::WorkbenchError;
use crate::model::{TestConfig, TestResult, TestStatus};
use crate::report::extract_summary;

/// Build the result record for a finished run from its console output.
pub fn from_run(
    config: TestConfig,
    raw_output: String,
    duration_ms: u64,
    success: bool,
    now: DateTime<Utc>,
) -> TestResult {
    let metrics = extract_summary(&raw_output);
    TestResult {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp: now.timestamp_millis(),
        config,
        metrics,
        raw_output,
        duration: duration_ms,
        status: if success {
            TestStatus::Success
        } else {
            TestStatus::Failed
        },
    }
}

pub fn export_json(result: &TestResult) -> Result<String, WorkbenchError> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn export_file_name(result: &TestResult) -> String {
    format!("k6-result-{}.json", result.id)
}

/// Turn an uploaded file into a result.
///
/// A `.json` file holding a previously exported result is taken as-is. A `.json` file
/// that is valid JSON but not a result is rejected. Anything else is treated as raw
/// console output and run through the summary extractor.
pub fn import_file(
    file_name: &str,
    content: &str,
    now: DateTime<Utc>,
) -> Result<TestResult, WorkbenchError> {
    if file_name.to_ascii_lowercase().ends_with(".json") {
        match serde_json::from_str::<Value>(content) {
            Ok(value) => return exported_result(value),
            Err(e) => {
                warn!("{} is not valid JSON ({}), importing as raw output", file_name, e);
            }
        }
    }

    info!("Importing {} as raw console output", file_name);
    Ok(from_run(
        TestConfig::imported(),
        content.to_string(),
        0,
        true,
        now,
    ))
}

fn exported_result(value: Value) -> Result<TestResult, WorkbenchError> {
    let has_field = |name: &str| value.get(name).is_some_and(|v| !v.is_null());
    if !has_field("metrics") || !has_field("rawOutput") {
        return Err(WorkbenchError::InvalidImport);
    }
    serde_json::from_value(value).map_err(|e| {
        warn!("Result file has the right shape but failed to load: {}", e);
        WorkbenchError::InvalidImport
    })
}

pub fn import_path(path: &Path, now: DateTime<Utc>) -> Result<TestResult, WorkbenchError> {
    let content = std::fs::read_to_string(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    import_file(&file_name, &content, now)
}

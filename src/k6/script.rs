use std::fmt::Write as _;
use tracing::{debug, warn};

use super::executors::{descriptor, ExecutorCategory};
use super::resolve_options;
use crate::error::WorkbenchError;
use crate::model::TestConfig;

const PROLOGUE: &str = "import http from 'k6/http';\nimport { check, sleep } from 'k6';\n\n";
const DEFAULT_CHECK: &str = "status is 200";

/// Render `config` as a k6 script.
///
/// Output depends only on the config: no clock, no randomness, no I/O.
pub fn compile(config: &TestConfig) -> Result<String, WorkbenchError> {
    let options = resolve_options(config);
    let options_json = serde_json::to_string_pretty(&serde_json::Value::Object(options))?;

    let mut script = String::from(PROLOGUE);
    let _ = write!(script, "export const options = {};\n\n", options_json);
    script.push_str("export default function () {\n");

    render_request(&mut script, config)?;
    render_checks(&mut script, &config.checks);
    render_pacing(&mut script, config);

    script.push_str("}\n");

    debug!(
        test_type = %config.test_type,
        executor = %config.executor,
        bytes = script.len(),
        "Compiled k6 script"
    );
    Ok(script)
}

fn render_request(script: &mut String, config: &TestConfig) -> Result<(), WorkbenchError> {
    let headers = if config.headers.is_empty() {
        "{}".to_string()
    } else {
        indent_continuation(&serde_json::to_string_pretty(&config.headers)?, "    ")
    };
    let function = config.method.k6_function();
    let endpoint = js_string(&config.endpoint);

    if config.method.carries_body() {
        let payload = indent_continuation(&payload_literal(config.body.as_deref())?, "  ");
        let _ = write!(script, "  const payload = {};\n\n", payload);
        let _ = writeln!(
            script,
            "  const res = http.{}({}, JSON.stringify(payload), {{",
            function, endpoint
        );
    } else {
        let _ = writeln!(script, "  const res = http.{}({}, {{", function, endpoint);
    }
    let _ = writeln!(script, "    headers: {},", headers);
    script.push_str("  });\n\n");
    Ok(())
}

/// Blank bodies become `{}`; JSON bodies are normalized; anything else is passed
/// through as a script expression.
fn payload_literal(body: Option<&str>) -> Result<String, WorkbenchError> {
    let body = body.map(str::trim).unwrap_or_default();
    if body.is_empty() {
        return Ok("{}".to_string());
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => Ok(serde_json::to_string_pretty(&value)?),
        Err(e) => {
            warn!("Request body is not valid JSON, emitting verbatim: {}", e);
            Ok(body.to_string())
        }
    }
}

fn render_checks(script: &mut String, checks: &[String]) {
    script.push_str("  check(res, {\n");
    if checks.is_empty() {
        let _ = writeln!(
            script,
            "    {}: (r) => r.status === 200,",
            js_string(DEFAULT_CHECK)
        );
    } else {
        for label in checks {
            let _ = writeln!(script, "    {}: (r) => r.status === 200,", js_string(label));
        }
    }
    script.push_str("  });\n\n");
}

fn render_pacing(script: &mut String, config: &TestConfig) {
    match config.think_time {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => {
            let _ = writeln!(script, "  sleep({});", seconds);
        }
        _ => {
            if descriptor(config.executor).category != ExecutorCategory::ArrivalRate {
                script.push_str("  sleep(1);\n");
            }
        }
    }
}

/// Single-quoted JS string literal.
fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn indent_continuation(text: &str, prefix: &str) -> String {
    let mut lines = text.lines();
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        out.push_str(prefix);
        out.push_str(line);
    }
    out
}

//! Duration literals and human-readable formatting.
//!
//! Two grammars live here. Config-side literals (`30s`, `1.5m`, `8h`) accept the
//! `ms|s|m|h` units the engine schedules with. Report-side tokens (`avg=12.5ms`) only
//! ever use `ms` or `s`.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::WorkbenchError;

static DURATION_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(ms|s|m|h)$").unwrap());

static REPORT_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\d.]+)(ms|s)$").unwrap());

pub fn is_valid_duration(literal: &str) -> bool {
    DURATION_LITERAL.is_match(literal)
}

/// Convert a config duration literal to milliseconds.
pub fn parse_duration_ms(literal: &str) -> Result<f64, WorkbenchError> {
    let caps = DURATION_LITERAL
        .captures(literal)
        .ok_or_else(|| WorkbenchError::InvalidDuration(literal.to_string()))?;
    let value: f64 = caps[1]
        .parse()
        .map_err(|_| WorkbenchError::InvalidDuration(literal.to_string()))?;

    let factor = match &caps[2] {
        "ms" => 1.0,
        "s" => 1_000.0,
        "m" => 60_000.0,
        _ => 3_600_000.0,
    };
    Ok(value * factor)
}

/// Normalize a report token such as `1.5s` or `250ms` to milliseconds.
pub fn report_duration_ms(token: &str) -> Option<f64> {
    let caps = REPORT_DURATION.captures(token)?;
    let value: f64 = caps[1].parse().ok()?;
    match &caps[2] {
        "s" => Some(value * 1_000.0),
        _ => Some(value),
    }
}

pub fn format_duration(ms: f64) -> String {
    if ms < 1_000.0 {
        format!("{}ms", ms)
    } else if ms < 60_000.0 {
        format!("{:.2}s", ms / 1_000.0)
    } else if ms < 3_600_000.0 {
        format!("{:.2}m", ms / 60_000.0)
    } else {
        format!("{:.2}h", ms / 3_600_000.0)
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.2} KB", b / KB)
    } else if b < KB * KB * KB {
        format!("{:.2} MB", b / (KB * KB))
    } else {
        format!("{:.2} GB", b / (KB * KB * KB))
    }
}

pub fn format_percentage(value: f64, total: f64) -> String {
    if total == 0.0 {
        return "0%".to_string();
    }
    format!("{:.2}%", value / total * 100.0)
}

//! Operator-facing checks on a [`TestConfig`] before it is compiled.
//!
//! Only fields the selected test type and executor actually consume are inspected;
//! leftovers from a previous selection are never reported.

use serde::Serialize;

use crate::duration::is_valid_duration;
use crate::model::{ExecutorType, TestConfig, TestType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn is_valid_url(endpoint: &str) -> bool {
    url::Url::parse(endpoint).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Blank is valid; the compiler substitutes an empty object.
pub fn is_valid_json(text: &str) -> bool {
    text.trim().is_empty() || serde_json::from_str::<serde_json::Value>(text).is_ok()
}

pub fn validate(config: &TestConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !is_valid_url(&config.endpoint) {
        issues.push(ValidationIssue::new(
            "endpoint",
            "Endpoint must be a valid http(s) URL",
        ));
    }

    for key in config.headers.keys() {
        if key.trim().is_empty() {
            issues.push(ValidationIssue::new("headers", "Header key cannot be empty"));
        }
    }

    if config.method.carries_body() && !is_valid_json(config.body.as_deref().unwrap_or("")) {
        issues.push(ValidationIssue::new("body", "Body must be valid JSON"));
    }

    if let Some(think_time) = config.think_time {
        if !think_time.is_finite() || think_time < 0.0 {
            issues.push(ValidationIssue::new(
                "thinkTime",
                "Think time must be a non-negative number of seconds",
            ));
        }
    }

    if config.test_type != TestType::Custom {
        validate_executor_fields(config, &mut issues);
    }

    issues
}

fn validate_executor_fields(config: &TestConfig, issues: &mut Vec<ValidationIssue>) {
    let check_duration = |field: &str, value: &Option<String>, issues: &mut Vec<ValidationIssue>| {
        if let Some(literal) = value.as_deref().filter(|s| !s.trim().is_empty()) {
            if !is_valid_duration(literal) {
                issues.push(ValidationIssue::new(
                    field,
                    format!("Invalid duration '{}' (expected e.g. 30s, 5m, 1h)", literal),
                ));
            }
        }
    };

    match config.executor {
        ExecutorType::ConstantVus => check_duration("duration", &config.duration, issues),
        ExecutorType::ConstantArrivalRate => {
            check_duration("duration", &config.duration, issues);
            check_duration("timeUnit", &config.time_unit, issues);
        }
        ExecutorType::RampingArrivalRate => {
            check_duration("timeUnit", &config.time_unit, issues);
            validate_stages(config, issues);
        }
        ExecutorType::RampingVus => validate_stages(config, issues),
        ExecutorType::SharedIterations | ExecutorType::PerVuIterations => {}
    }
}

fn validate_stages(config: &TestConfig, issues: &mut Vec<ValidationIssue>) {
    for (i, stage) in config.stages.iter().enumerate() {
        if !is_valid_duration(&stage.duration) {
            issues.push(ValidationIssue::new(
                format!("stages[{}].duration", i),
                format!("Invalid duration '{}'", stage.duration),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, Stage};

    fn base(executor: ExecutorType) -> TestConfig {
        TestConfig::new(
            TestType::Smoke,
            executor,
            HttpMethod::Get,
            "https://api.example.com/health",
        )
    }

    #[test]
    fn test_valid_config_has_no_issues() {
        assert!(validate(&base(ExecutorType::ConstantVus)).is_empty());
    }

    #[test]
    fn test_bad_endpoint() {
        let mut config = base(ExecutorType::ConstantVus);
        config.endpoint = "not a url".into();
        let issues = validate(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "endpoint");
        assert!(!is_valid_url("ftp://example.com"));
    }

    #[test]
    fn test_body_checked_only_for_body_methods() {
        let mut config = base(ExecutorType::ConstantVus);
        config.body = Some("{broken".into());
        assert!(validate(&config).is_empty());

        config.method = HttpMethod::Post;
        let issues = validate(&config);
        assert_eq!(issues[0].field, "body");
    }

    #[test]
    fn test_unused_fields_are_ignored() {
        let mut config = base(ExecutorType::SharedIterations);
        config.duration = Some("forever".into());
        config.stages = vec![Stage::new("2x", 10)];
        config.time_unit = Some("??".into());
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn test_stage_duration_checked_for_ramping() {
        let mut config = base(ExecutorType::RampingVus);
        config.stages = vec![Stage::new("30s", 10), Stage::new("2x", 0)];
        let issues = validate(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "stages[1].duration");
    }

    #[test]
    fn test_custom_skips_executor_fields() {
        let mut config = base(ExecutorType::ConstantVus);
        config.test_type = TestType::Custom;
        config.duration = Some("2x".into());
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn test_negative_think_time() {
        let mut config = base(ExecutorType::ConstantVus);
        config.think_time = Some(-1.0);
        assert_eq!(validate(&config)[0].field, "thinkTime");
    }
}

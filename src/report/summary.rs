use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

use crate::duration::report_duration_ms;
use crate::model::{
    Counter, DataTransfer, DurationStats, FailureRate, IndividualCheck, Metrics, VusGauge,
    VusMaxGauge,
};

/// A duration token as printed in the summary: a number followed by `ms` or `s`.
const DUR: &str = r"([\d.]+(?:ms|s))";
/// Human byte quantity, e.g. `1.2 MB` or `340 kB`.
const BYTES: &str = r"([\d.]+\s+[kKMGT]?B)";

fn trend_pattern(metric: &str) -> Regex {
    Regex::new(&format!(
        r"\b{metric}[.:\s]+avg={DUR}\s+min={DUR}\s+med={DUR}\s+max={DUR}\s+p\(90\)={DUR}\s+p\(95\)={DUR}"
    ))
    .unwrap()
}

fn counter_pattern(metric: &str) -> Regex {
    Regex::new(&format!(r"\b{metric}[.:\s]+(\d+)\s+([\d.]+)/s")).unwrap()
}

fn gauge_pattern(metric: &str) -> Regex {
    Regex::new(&format!(r"\b{metric}[.:\s]+(\d+)\s+min=(\d+)\s+max=(\d+)")).unwrap()
}

fn data_pattern(metric: &str) -> Regex {
    Regex::new(&format!(r"\b{metric}[.:\s]+{BYTES}\s+{BYTES}/s")).unwrap()
}

static CHECKS_TOTAL: LazyLock<Regex> = LazyLock::new(|| counter_pattern("checks_total"));
static CHECKS_SUCCEEDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bchecks_succeeded[.:\s]+([\d.]+)%\s+(\d+)\s+out of\s+(\d+)").unwrap()
});
// Pre-1.0 layout: `checks....: 97.50% ✓ 39 ✗ 1`
static LEGACY_CHECKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bchecks[.:\s]+([\d.]+)%\s+✓\s+(\d+)\s+✗\s+(\d+)").unwrap()
});
static INDIVIDUAL_CHECK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[✓✗][ \t]+(.+?)\r?\n[ \t]*↳[ \t]*([\d.]+)%[ \t]+—[ \t]+✓[ \t]*(\d+)[ \t]*/[ \t]*✗[ \t]*(\d+)",
    )
    .unwrap()
});
static HTTP_REQ_DURATION: LazyLock<Regex> = LazyLock::new(|| trend_pattern("http_req_duration"));
static HTTP_REQ_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bhttp_req_failed[.:\s]+([\d.]+)%\s+(\d+)\s+out of\s+(\d+)").unwrap()
});
static LEGACY_HTTP_REQ_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bhttp_req_failed[.:\s]+([\d.]+)%\s+✓\s+(\d+)\s+✗\s+(\d+)").unwrap()
});
static HTTP_REQS: LazyLock<Regex> = LazyLock::new(|| counter_pattern("http_reqs"));
static ITERATION_DURATION: LazyLock<Regex> =
    LazyLock::new(|| trend_pattern("iteration_duration"));
static ITERATIONS: LazyLock<Regex> = LazyLock::new(|| counter_pattern("iterations"));
static VUS: LazyLock<Regex> = LazyLock::new(|| gauge_pattern("vus"));
static VUS_MAX: LazyLock<Regex> = LazyLock::new(|| gauge_pattern("vus_max"));
static DATA_RECEIVED: LazyLock<Regex> = LazyLock::new(|| data_pattern("data_received"));
static DATA_SENT: LazyLock<Regex> = LazyLock::new(|| data_pattern("data_sent"));

/// One recognizable section of the end-of-test summary. Each matcher reads the whole
/// report and fills in only its own fields.
struct Section {
    name: &'static str,
    extract: fn(&str, &mut Metrics) -> bool,
}

static SECTIONS: &[Section] = &[
    Section { name: "checks_total", extract: checks_total },
    Section { name: "checks_succeeded", extract: checks_succeeded },
    Section { name: "individual_checks", extract: individual_checks },
    Section { name: "http_req_duration", extract: http_req_duration },
    Section { name: "http_req_failed", extract: http_req_failed },
    Section { name: "http_reqs", extract: http_reqs },
    Section { name: "iteration_duration", extract: iteration_duration },
    Section { name: "iterations", extract: iterations },
    Section { name: "vus", extract: vus },
    Section { name: "vus_max", extract: vus_max },
    Section { name: "data_received", extract: data_received },
    Section { name: "data_sent", extract: data_sent },
];

/// Pull every recognizable metric out of a k6 end-of-test summary.
///
/// Never fails: sections that are missing or garbled are simply left as `None`.
pub fn extract_summary(raw: &str) -> Metrics {
    let mut metrics = Metrics::default();
    if raw.trim().is_empty() {
        return metrics;
    }

    let mut matched = Vec::new();
    for section in SECTIONS {
        if (section.extract)(raw, &mut metrics) {
            matched.push(section.name);
        }
    }
    debug!(sections = ?matched, "Extracted summary sections");
    metrics
}

fn float(caps: &Captures, i: usize) -> Option<f64> {
    caps.get(i)?.as_str().parse().ok()
}

fn int(caps: &Captures, i: usize) -> Option<u64> {
    caps.get(i)?.as_str().parse().ok()
}

fn duration(caps: &Captures, i: usize) -> Option<f64> {
    report_duration_ms(caps.get(i)?.as_str())
}

// 100 - 97.5 must come out as 2.5, not 2.5000000000000036.
fn complement(percentage: f64) -> f64 {
    ((100.0 - percentage) * 1e6).round() / 1e6
}

fn checks_total(raw: &str, metrics: &mut Metrics) -> bool {
    metrics.checks_total = CHECKS_TOTAL.captures(raw).and_then(|c| int(&c, 1));
    metrics.checks_total.is_some()
}

fn checks_succeeded(raw: &str, metrics: &mut Metrics) -> bool {
    let succeeded = CHECKS_SUCCEEDED
        .captures(raw)
        .and_then(|c| Some((float(&c, 1)?, int(&c, 3)?)))
        .or_else(|| {
            LEGACY_CHECKS.captures(raw).and_then(|c| {
                let passed = int(&c, 2)?;
                let failed = int(&c, 3)?;
                Some((float(&c, 1)?, passed + failed))
            })
        });

    match succeeded {
        // A percentage of nothing carries no information.
        Some((_, 0)) | None => false,
        Some((percentage, _)) => {
            metrics.checks_succeeded = Some(percentage);
            metrics.checks_failed = Some(complement(percentage));
            true
        }
    }
}

fn individual_checks(raw: &str, metrics: &mut Metrics) -> bool {
    metrics.individual_checks = INDIVIDUAL_CHECK
        .captures_iter(raw)
        .filter_map(|c| {
            Some(IndividualCheck {
                name: c.get(1)?.as_str().trim().to_string(),
                percentage: float(&c, 2)?,
                passes: int(&c, 3)?,
                fails: int(&c, 4)?,
            })
        })
        .collect();
    !metrics.individual_checks.is_empty()
}

fn trend(pattern: &Regex, raw: &str) -> Option<DurationStats> {
    let c = pattern.captures(raw)?;
    Some(DurationStats {
        avg: duration(&c, 1)?,
        min: duration(&c, 2)?,
        med: duration(&c, 3)?,
        max: duration(&c, 4)?,
        p90: duration(&c, 5)?,
        p95: duration(&c, 6)?,
    })
}

fn http_req_duration(raw: &str, metrics: &mut Metrics) -> bool {
    metrics.http_req_duration = trend(&HTTP_REQ_DURATION, raw);
    metrics.http_req_duration.is_some()
}

fn iteration_duration(raw: &str, metrics: &mut Metrics) -> bool {
    metrics.iteration_duration = trend(&ITERATION_DURATION, raw);
    metrics.iteration_duration.is_some()
}

fn http_req_failed(raw: &str, metrics: &mut Metrics) -> bool {
    let failed = HTTP_REQ_FAILED
        .captures(raw)
        .and_then(|c| {
            Some(FailureRate {
                percentage: float(&c, 1)?,
                count: int(&c, 2)?,
                total: int(&c, 3)?,
            })
        })
        .or_else(|| {
            // Legacy rate layout counts `true` samples (failures) under ✓.
            LEGACY_HTTP_REQ_FAILED.captures(raw).and_then(|c| {
                let failures = int(&c, 2)?;
                let successes = int(&c, 3)?;
                Some(FailureRate {
                    percentage: float(&c, 1)?,
                    count: failures,
                    total: failures + successes,
                })
            })
        });

    metrics.http_req_failed = failed.filter(|f| f.total > 0);
    metrics.http_req_failed.is_some()
}

fn counter(pattern: &Regex, raw: &str) -> Option<Counter> {
    let c = pattern.captures(raw)?;
    Some(Counter {
        total: int(&c, 1)?,
        rate: float(&c, 2)?,
    })
}

fn http_reqs(raw: &str, metrics: &mut Metrics) -> bool {
    metrics.http_reqs = counter(&HTTP_REQS, raw);
    metrics.http_reqs.is_some()
}

fn iterations(raw: &str, metrics: &mut Metrics) -> bool {
    metrics.iterations = counter(&ITERATIONS, raw);
    metrics.iterations.is_some()
}

fn vus(raw: &str, metrics: &mut Metrics) -> bool {
    metrics.vus = VUS.captures(raw).and_then(|c| {
        Some(VusGauge {
            current: int(&c, 1)?,
            min: int(&c, 2)?,
            max: int(&c, 3)?,
        })
    });
    metrics.vus.is_some()
}

fn vus_max(raw: &str, metrics: &mut Metrics) -> bool {
    metrics.vus_max = VUS_MAX.captures(raw).and_then(|c| {
        Some(VusMaxGauge {
            value: int(&c, 1)?,
            min: int(&c, 2)?,
            max: int(&c, 3)?,
        })
    });
    metrics.vus_max.is_some()
}

fn transfer(pattern: &Regex, raw: &str) -> Option<DataTransfer> {
    let c = pattern.captures(raw)?;
    Some(DataTransfer {
        total: c.get(1)?.as_str().to_string(),
        rate: format!("{}/s", c.get(2)?.as_str()),
    })
}

fn data_received(raw: &str, metrics: &mut Metrics) -> bool {
    metrics.data_received = transfer(&DATA_RECEIVED, raw);
    metrics.data_received.is_some()
}

fn data_sent(raw: &str, metrics: &mut Metrics) -> bool {
    metrics.data_sent = transfer(&DATA_SENT, raw);
    metrics.data_sent.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_is_exact() {
        assert_eq!(complement(97.5), 2.5);
        assert_eq!(complement(99.9), 0.1);
        assert_eq!(complement(100.0), 0.0);
    }

    #[test]
    fn test_vus_pattern_does_not_match_vus_max() {
        let raw = "vus_max........: 10  min=10 max=10\n";
        let metrics = extract_summary(raw);
        assert!(metrics.vus.is_none());
        assert_eq!(
            metrics.vus_max,
            Some(VusMaxGauge { value: 10, min: 10, max: 10 })
        );
    }

    #[test]
    fn test_iterations_not_confused_with_iteration_duration() {
        let raw = "iteration_duration.: avg=1s min=1s med=1s max=1s p(90)=1s p(95)=1s\n";
        let metrics = extract_summary(raw);
        assert!(metrics.iterations.is_none());
        assert_eq!(metrics.iteration_duration.map(|d| d.avg), Some(1000.0));
    }

    #[test]
    fn test_data_rate_keeps_per_second_suffix() {
        let raw = "data_received..: 1.2 MB 340 kB/s\n";
        let metrics = extract_summary(raw);
        assert_eq!(
            metrics.data_received,
            Some(DataTransfer {
                total: "1.2 MB".into(),
                rate: "340 kB/s".into(),
            })
        );
    }

    #[test]
    fn test_zero_total_checks_are_omitted() {
        let raw = "checks_succeeded...: 0.00% 0 out of 0\n";
        let metrics = extract_summary(raw);
        assert!(metrics.checks_succeeded.is_none());
        assert!(metrics.checks_failed.is_none());
    }

    #[test]
    fn test_legacy_rate_layout() {
        let raw = "checks.........: 97.50% ✓ 39 ✗ 1\nhttp_req_failed: 2.50%  ✓ 1  ✗ 39\n";
        let metrics = extract_summary(raw);
        assert_eq!(metrics.checks_succeeded, Some(97.5));
        assert_eq!(metrics.checks_failed, Some(2.5));
        assert_eq!(
            metrics.http_req_failed,
            Some(FailureRate { percentage: 2.5, count: 1, total: 40 })
        );
    }
}

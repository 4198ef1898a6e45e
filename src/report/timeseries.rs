use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const BUCKET_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    /// Milliseconds since the start of the run, floored to the bucket.
    pub time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub http_req_duration: Vec<ChartDataPoint>,
    pub http_reqs: Vec<ChartDataPoint>,
    pub vus: Vec<ChartDataPoint>,
}

/// One line of `k6 run --out json`.
#[derive(Debug, Deserialize)]
struct Record {
    #[serde(rename = "type")]
    kind: Option<String>,
    metric: Option<String>,
    time: Option<String>,
    data: Option<RecordData>,
}

#[derive(Debug, Deserialize)]
struct RecordData {
    time: Option<String>,
    value: Option<f64>,
}

impl Record {
    fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self
            .time
            .as_deref()
            .or_else(|| self.data.as_ref().and_then(|d| d.time.as_deref()))?;
        DateTime::parse_from_rfc3339(raw).ok()
    }
}

#[derive(Debug, Default)]
struct Bucket {
    duration_sum: f64,
    duration_count: u64,
    requests: Option<f64>,
    vus_max: Option<f64>,
}

/// Per-second bucketing of streamed point records.
///
/// Lines can be pushed as they become available; buckets are keyed by time so the
/// order of arrival does not matter once the start time is fixed.
#[derive(Debug, Default)]
pub struct TimeSeriesAggregator {
    start: Option<DateTime<FixedOffset>>,
    buckets: BTreeMap<i64, Bucket>,
    skipped: usize,
}

impl TimeSeriesAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one NDJSON line. Blank and unparsable lines are ignored.
    pub fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match serde_json::from_str::<Record>(line) {
            Ok(record) => self.push_record(record),
            Err(_) => self.skipped += 1,
        }
    }

    fn push_record(&mut self, record: Record) {
        let Some(timestamp) = record.timestamp() else {
            return;
        };
        let start = *self.start.get_or_insert(timestamp);

        if record.kind.as_deref() != Some("Point") {
            return;
        }
        let Some(value) = record.data.as_ref().and_then(|d| d.value) else {
            return;
        };

        let offset = (timestamp - start).num_milliseconds();
        let bucket_time = offset.div_euclid(BUCKET_MS) * BUCKET_MS;

        match record.metric.as_deref() {
            Some("http_req_duration") => {
                let bucket = self.buckets.entry(bucket_time).or_default();
                bucket.duration_sum += value;
                bucket.duration_count += 1;
            }
            Some("http_reqs") => {
                let bucket = self.buckets.entry(bucket_time).or_default();
                *bucket.requests.get_or_insert(0.0) += value;
            }
            Some("vus") => {
                let bucket = self.buckets.entry(bucket_time).or_default();
                bucket.vus_max = Some(bucket.vus_max.map_or(value, |m| m.max(value)));
            }
            _ => {}
        }
    }

    /// Number of lines that could not be parsed as JSON.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> TimeSeries {
        let mut series = TimeSeries::default();
        for (time, bucket) in &self.buckets {
            let time = *time;
            if bucket.duration_count > 0 {
                series.http_req_duration.push(ChartDataPoint {
                    time,
                    value: bucket.duration_sum / bucket.duration_count as f64,
                });
            }
            if let Some(value) = bucket.requests {
                series.http_reqs.push(ChartDataPoint { time, value });
            }
            if let Some(value) = bucket.vus_max {
                series.vus.push(ChartDataPoint { time, value });
            }
        }
        debug!(
            buckets = self.buckets.len(),
            skipped = self.skipped,
            "Aggregated time series"
        );
        series
    }
}

/// Bucket a complete NDJSON stream in one pass.
pub fn aggregate(ndjson: &str) -> TimeSeries {
    let mut aggregator = TimeSeriesAggregator::new();
    for line in ndjson.lines() {
        aggregator.push_line(line);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(metric: &str, time: &str, value: f64) -> String {
        format!(
            r#"{{"type":"Point","metric":"{}","time":"{}","data":{{"value":{}}}}}"#,
            metric, time, value
        )
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(aggregate(""), TimeSeries::default());
    }

    #[test]
    fn test_garbage_lines_are_counted_and_skipped() {
        let mut agg = TimeSeriesAggregator::new();
        agg.push_line("not json");
        agg.push_line("{\"type\": ");
        agg.push_line(&point("vus", "2024-05-01T10:00:00Z", 3.0));
        assert_eq!(agg.skipped(), 2);
        let series = agg.finish();
        assert_eq!(series.vus, vec![ChartDataPoint { time: 0, value: 3.0 }]);
    }

    #[test]
    fn test_time_falls_back_to_data_time() {
        let line = r#"{"type":"Point","metric":"http_reqs","data":{"time":"2024-05-01T10:00:00.500Z","value":1}}"#;
        let series = aggregate(line);
        assert_eq!(series.http_reqs, vec![ChartDataPoint { time: 0, value: 1.0 }]);
    }

    #[test]
    fn test_vus_zero_is_reported() {
        let series = aggregate(&point("vus", "2024-05-01T10:00:00Z", 0.0));
        assert_eq!(series.vus, vec![ChartDataPoint { time: 0, value: 0.0 }]);
    }

    #[test]
    fn test_out_of_order_records_sorted() {
        let input = [
            point("http_reqs", "2024-05-01T10:00:00Z", 1.0),
            point("http_reqs", "2024-05-01T10:00:02.100Z", 1.0),
            point("http_reqs", "2024-05-01T10:00:01.900Z", 1.0),
        ]
        .join("\n");
        let times: Vec<i64> = aggregate(&input).http_reqs.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0, 1000, 2000]);
    }
}

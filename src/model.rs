use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::WorkbenchError;

/// Named load-shape preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestType {
    Smoke,
    AverageLoad,
    Stress,
    Soak,
    Spike,
    Breakpoint,
    Custom,
}

impl TestType {
    pub const ALL: [TestType; 7] = [
        TestType::Smoke,
        TestType::AverageLoad,
        TestType::Stress,
        TestType::Soak,
        TestType::Spike,
        TestType::Breakpoint,
        TestType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Smoke => "smoke",
            TestType::AverageLoad => "average-load",
            TestType::Stress => "stress",
            TestType::Soak => "soak",
            TestType::Spike => "spike",
            TestType::Breakpoint => "breakpoint",
            TestType::Custom => "custom",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| WorkbenchError::UnknownTestType(s.to_string()))
    }
}

/// Load-generation strategy understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutorType {
    SharedIterations,
    PerVuIterations,
    ConstantVus,
    RampingVus,
    ConstantArrivalRate,
    RampingArrivalRate,
}

impl ExecutorType {
    pub const ALL: [ExecutorType; 6] = [
        ExecutorType::SharedIterations,
        ExecutorType::PerVuIterations,
        ExecutorType::ConstantVus,
        ExecutorType::RampingVus,
        ExecutorType::ConstantArrivalRate,
        ExecutorType::RampingArrivalRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutorType::SharedIterations => "shared-iterations",
            ExecutorType::PerVuIterations => "per-vu-iterations",
            ExecutorType::ConstantVus => "constant-vus",
            ExecutorType::RampingVus => "ramping-vus",
            ExecutorType::ConstantArrivalRate => "constant-arrival-rate",
            ExecutorType::RampingArrivalRate => "ramping-arrival-rate",
        }
    }
}

impl fmt::Display for ExecutorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutorType {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExecutorType::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| WorkbenchError::UnknownExecutor(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// GET and DELETE requests are emitted without a payload.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    /// Name of the k6/http function issuing this request.
    pub fn k6_function(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "del",
            HttpMethod::Patch => "patch",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            other => Err(WorkbenchError::UnknownMethod(other.to_string())),
        }
    }
}

/// One linear ramp segment of a load schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub duration: String,
    pub target: u32,
}

impl Stage {
    pub fn new(duration: impl Into<String>, target: u32) -> Self {
        Self {
            duration: duration.into(),
            target,
        }
    }
}

/// Request headers in the order the operator entered them. Names are unique; a repeated
/// name replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// `null` is an empty set; non-string values keep their JSON text, null values are dropped.
impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .flatten()
            .filter_map(|(name, value)| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(text) => Some((name, text)),
                other => Some((name, other.to_string())),
            })
            .collect())
    }
}

/// Form inputs arrive as numbers, numeric strings, blanks or nulls depending on how the
/// field was last edited. Only the numeric ones carry a value.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + FromStr,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(text)) => text.trim().parse().ok(),
            Some(value) => T::deserialize(value).ok(),
            None => None,
        })
    }

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}

/// Declarative description of a load test.
///
/// Which optional fields matter depends on `test_type` and `executor`; the rest are
/// carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    pub test_type: TestType,
    pub executor: ExecutorType,
    pub endpoint: String,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub vus: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub stages: Vec<Stage>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub iterations: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub rate: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<String>,
    #[serde(
        rename = "preAllocatedVUs",
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub pre_allocated_vus: Option<u32>,
    #[serde(
        rename = "maxVUs",
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_vus: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub checks: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub think_time: Option<f64>,
}

impl TestConfig {
    /// Minimal config for a given target; every optional field left empty.
    pub fn new(
        test_type: TestType,
        executor: ExecutorType,
        method: HttpMethod,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            test_type,
            executor,
            endpoint: endpoint.into(),
            method,
            headers: Headers::new(),
            body: None,
            vus: None,
            duration: None,
            stages: Vec::new(),
            iterations: None,
            rate: None,
            time_unit: None,
            pre_allocated_vus: None,
            max_vus: None,
            checks: Vec::new(),
            think_time: None,
        }
    }

    /// Parse a config document, reporting unknown executor or test type identifiers
    /// by name rather than as a generic deserialization failure.
    pub fn from_json(text: &str) -> Result<Self, WorkbenchError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, WorkbenchError> {
        if let Some(executor) = value.get("executor").and_then(|v| v.as_str()) {
            executor.parse::<ExecutorType>()?;
        }
        if let Some(test_type) = value.get("testType").and_then(|v| v.as_str()) {
            test_type.parse::<TestType>()?;
        }
        if let Some(method) = value.get("method").and_then(|v| v.as_str()) {
            method.parse::<HttpMethod>()?;
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Placeholder attached to results imported from raw console text, where the
    /// originating config is unknown.
    pub fn imported() -> Self {
        Self::new(
            TestType::Custom,
            ExecutorType::SharedIterations,
            HttpMethod::Get,
            "imported",
        )
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            vus: Some(10),
            duration: Some("30s".to_string()),
            ..Self::new(
                TestType::Smoke,
                ExecutorType::ConstantVus,
                HttpMethod::Get,
                "",
            )
        }
    }
}

/// avg/min/med/max/p90/p95, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    pub avg: f64,
    pub min: f64,
    pub med: f64,
    pub max: f64,
    pub p90: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureRate {
    pub percentage: f64,
    pub count: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub total: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VusGauge {
    pub current: u64,
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VusMaxGauge {
    pub value: u64,
    pub min: u64,
    pub max: u64,
}

/// Byte counters are kept exactly as the report prints them ("1.2 MB", "340 kB/s").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTransfer {
    pub total: String,
    pub rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualCheck {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
    pub percentage: f64,
}

/// Sparse record of everything recognized in a run summary. `None` means the section
/// was not present in the source text, which is distinct from a reported zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks_total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks_succeeded: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks_failed: Option<f64>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub individual_checks: Vec<IndividualCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_req_duration: Option<DurationStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_req_failed: Option<FailureRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_reqs: Option<Counter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_duration: Option<DurationStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<Counter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vus: Option<VusGauge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vus_max: Option<VusMaxGauge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_received: Option<DataTransfer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_sent: Option<DataTransfer>,
}

impl Metrics {
    /// True when no section at all was recognized.
    pub fn is_empty(&self) -> bool {
        *self == Metrics::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Success,
    Failed,
}

/// One completed (or imported) run. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub config: TestConfig,
    pub metrics: Metrics,
    pub raw_output: String,
    /// Wall-clock run time in milliseconds.
    pub duration: u64,
    pub status: TestStatus,
}

use serde::Serialize;
use serde_json::{json, Value};

use super::Options;
use crate::model::{ExecutorType, Stage, TestConfig};

/// How an executor schedules work. Arrival-rate executors pace themselves, so the
/// generated script must not add its own sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutorCategory {
    Iteration,
    Vu,
    ArrivalRate,
}

pub struct ExecutorDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub category: ExecutorCategory,
    pub options: fn(&TestConfig) -> Options,
}

static SHARED_ITERATIONS: ExecutorDescriptor = ExecutorDescriptor {
    name: "Shared Iterations",
    description: "Fixed total iterations shared among VUs",
    category: ExecutorCategory::Iteration,
    options: shared_iterations,
};

static PER_VU_ITERATIONS: ExecutorDescriptor = ExecutorDescriptor {
    name: "Per VU Iterations",
    description: "Each VU runs a fixed number of iterations",
    category: ExecutorCategory::Iteration,
    options: per_vu_iterations,
};

static CONSTANT_VUS: ExecutorDescriptor = ExecutorDescriptor {
    name: "Constant VUs",
    description: "Fixed number of VUs throughout the test",
    category: ExecutorCategory::Vu,
    options: constant_vus,
};

static RAMPING_VUS: ExecutorDescriptor = ExecutorDescriptor {
    name: "Ramping VUs",
    description: "VU count increases/decreases per schedule",
    category: ExecutorCategory::Vu,
    options: ramping_vus,
};

static CONSTANT_ARRIVAL_RATE: ExecutorDescriptor = ExecutorDescriptor {
    name: "Constant Arrival Rate",
    description: "Fixed iterations per time period (precise RPS control)",
    category: ExecutorCategory::ArrivalRate,
    options: constant_arrival_rate,
};

static RAMPING_ARRIVAL_RATE: ExecutorDescriptor = ExecutorDescriptor {
    name: "Ramping Arrival Rate",
    description: "Variable iteration rate over time",
    category: ExecutorCategory::ArrivalRate,
    options: ramping_arrival_rate,
};

pub fn descriptor(executor: ExecutorType) -> &'static ExecutorDescriptor {
    match executor {
        ExecutorType::SharedIterations => &SHARED_ITERATIONS,
        ExecutorType::PerVuIterations => &PER_VU_ITERATIONS,
        ExecutorType::ConstantVus => &CONSTANT_VUS,
        ExecutorType::RampingVus => &RAMPING_VUS,
        ExecutorType::ConstantArrivalRate => &CONSTANT_ARRIVAL_RATE,
        ExecutorType::RampingArrivalRate => &RAMPING_ARRIVAL_RATE,
    }
}

/// Options fragment for the config's executor, with defaults for anything omitted.
pub fn executor_options(config: &TestConfig) -> Options {
    (descriptor(config.executor).options)(config)
}

// Zero counts are treated as "not set", matching how the UI leaves blank inputs.
fn positive<T: Copy + Default + PartialEq>(value: Option<T>) -> Option<T> {
    value.filter(|v| *v != T::default())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn stages_value(stages: &[Stage]) -> Value {
    Value::Array(
        stages
            .iter()
            .map(|s| json!({ "duration": s.duration, "target": s.target }))
            .collect(),
    )
}

fn stages_or(config: &TestConfig, fallback: &[(&str, u32)]) -> Value {
    if config.stages.is_empty() {
        let defaults: Vec<Stage> = fallback.iter().map(|(d, t)| Stage::new(*d, *t)).collect();
        stages_value(&defaults)
    } else {
        stages_value(&config.stages)
    }
}

fn max_vus(config: &TestConfig, fallback: u32) -> u32 {
    positive(config.max_vus).unwrap_or_else(|| {
        positive(config.pre_allocated_vus)
            .map(|pre| pre.saturating_mul(2))
            .unwrap_or(fallback)
    })
}

fn shared_iterations(config: &TestConfig) -> Options {
    let mut options = Options::new();
    options.insert("executor".into(), json!("shared-iterations"));
    options.insert("vus".into(), json!(positive(config.vus).unwrap_or(10)));
    options.insert(
        "iterations".into(),
        json!(positive(config.iterations).unwrap_or(100)),
    );
    options
}

fn per_vu_iterations(config: &TestConfig) -> Options {
    let mut options = Options::new();
    options.insert("executor".into(), json!("per-vu-iterations"));
    options.insert("vus".into(), json!(positive(config.vus).unwrap_or(10)));
    options.insert(
        "iterations".into(),
        json!(positive(config.iterations).unwrap_or(10)),
    );
    options
}

fn constant_vus(config: &TestConfig) -> Options {
    let mut options = Options::new();
    options.insert("executor".into(), json!("constant-vus"));
    options.insert("vus".into(), json!(positive(config.vus).unwrap_or(10)));
    options.insert(
        "duration".into(),
        json!(non_blank(&config.duration).unwrap_or("30s")),
    );
    options
}

fn ramping_vus(config: &TestConfig) -> Options {
    let mut options = Options::new();
    options.insert("executor".into(), json!("ramping-vus"));
    options.insert("startVUs".into(), json!(0));
    options.insert(
        "stages".into(),
        stages_or(config, &[("30s", 10), ("1m", 10), ("30s", 0)]),
    );
    options
}

fn constant_arrival_rate(config: &TestConfig) -> Options {
    let mut options = Options::new();
    options.insert("executor".into(), json!("constant-arrival-rate"));
    options.insert("rate".into(), json!(positive(config.rate).unwrap_or(30)));
    options.insert(
        "timeUnit".into(),
        json!(non_blank(&config.time_unit).unwrap_or("1s")),
    );
    options.insert(
        "duration".into(),
        json!(non_blank(&config.duration).unwrap_or("1m")),
    );
    options.insert(
        "preAllocatedVUs".into(),
        json!(positive(config.pre_allocated_vus).unwrap_or(10)),
    );
    options.insert("maxVUs".into(), json!(max_vus(config, 20)));
    options
}

fn ramping_arrival_rate(config: &TestConfig) -> Options {
    let mut options = Options::new();
    options.insert("executor".into(), json!("ramping-arrival-rate"));
    options.insert("startRate".into(), json!(0));
    options.insert(
        "timeUnit".into(),
        json!(non_blank(&config.time_unit).unwrap_or("1s")),
    );
    options.insert(
        "preAllocatedVUs".into(),
        json!(positive(config.pre_allocated_vus).unwrap_or(10)),
    );
    options.insert("maxVUs".into(), json!(max_vus(config, 50)));
    options.insert(
        "stages".into(),
        stages_or(config, &[("30s", 10), ("1m", 50), ("30s", 0)]),
    );
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, TestType};

    fn config(executor: ExecutorType) -> TestConfig {
        TestConfig::new(TestType::Custom, executor, HttpMethod::Get, "http://localhost")
    }

    #[test]
    fn test_shared_iterations_defaults() {
        let options = executor_options(&config(ExecutorType::SharedIterations));
        assert_eq!(
            Value::Object(options),
            json!({"executor": "shared-iterations", "vus": 10, "iterations": 100})
        );
    }

    #[test]
    fn test_per_vu_iterations_uses_supplied_fields() {
        let mut cfg = config(ExecutorType::PerVuIterations);
        cfg.vus = Some(4);
        cfg.iterations = Some(25);
        let options = executor_options(&cfg);
        assert_eq!(options["vus"], json!(4));
        assert_eq!(options["iterations"], json!(25));
    }

    #[test]
    fn test_zero_vus_falls_back_to_default() {
        let mut cfg = config(ExecutorType::ConstantVus);
        cfg.vus = Some(0);
        cfg.duration = Some("   ".into());
        let options = executor_options(&cfg);
        assert_eq!(options["vus"], json!(10));
        assert_eq!(options["duration"], json!("30s"));
    }

    #[test]
    fn test_constant_arrival_rate_max_vus_doubles_pre_allocated() {
        let mut cfg = config(ExecutorType::ConstantArrivalRate);
        cfg.pre_allocated_vus = Some(15);
        let options = executor_options(&cfg);
        assert_eq!(options["preAllocatedVUs"], json!(15));
        assert_eq!(options["maxVUs"], json!(30));
    }

    #[test]
    fn test_constant_arrival_rate_max_vus_fallback() {
        let options = executor_options(&config(ExecutorType::ConstantArrivalRate));
        assert_eq!(options["preAllocatedVUs"], json!(10));
        assert_eq!(options["maxVUs"], json!(20));
        assert_eq!(options["rate"], json!(30));
        assert_eq!(options["timeUnit"], json!("1s"));
        assert_eq!(options["duration"], json!("1m"));
    }

    #[test]
    fn test_explicit_max_vus_wins() {
        let mut cfg = config(ExecutorType::RampingArrivalRate);
        cfg.pre_allocated_vus = Some(15);
        cfg.max_vus = Some(100);
        assert_eq!(executor_options(&cfg)["maxVUs"], json!(100));
    }

    #[test]
    fn test_ramping_arrival_rate_defaults() {
        let options = executor_options(&config(ExecutorType::RampingArrivalRate));
        assert_eq!(options["maxVUs"], json!(50));
        assert_eq!(options["startRate"], json!(0));
        assert_eq!(
            options["stages"],
            json!([
                {"duration": "30s", "target": 10},
                {"duration": "1m", "target": 50},
                {"duration": "30s", "target": 0}
            ])
        );
    }

    #[test]
    fn test_ramping_vus_keeps_user_stages() {
        let mut cfg = config(ExecutorType::RampingVus);
        cfg.stages = vec![Stage::new("10s", 5), Stage::new("20s", 0)];
        let options = executor_options(&cfg);
        assert_eq!(
            options["stages"],
            json!([{"duration": "10s", "target": 5}, {"duration": "20s", "target": 0}])
        );
        let keys: Vec<&str> = options.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["executor", "startVUs", "stages"]);
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            descriptor(ExecutorType::ConstantArrivalRate).category,
            ExecutorCategory::ArrivalRate
        );
        assert_eq!(
            descriptor(ExecutorType::RampingVus).category,
            ExecutorCategory::Vu
        );
        assert_eq!(
            descriptor(ExecutorType::SharedIterations).category,
            ExecutorCategory::Iteration
        );
    }
}

//! Translation from a declarative [`TestConfig`] to a k6 script.
//!
//! Options come from two independent fragments: the archetype profile (what the test
//! means) and the executor (how load is scheduled). Executor keys win on collision,
//! except for `custom` tests, which emit no options at all.

pub mod executors;
pub mod profiles;
pub mod script;

pub use executors::{descriptor, ExecutorCategory, ExecutorDescriptor};
pub use script::compile;

use crate::model::{TestConfig, TestType};

/// Engine options literal. Insertion order is preserved in the rendered script.
pub type Options = serde_json::Map<String, serde_json::Value>;

/// Merge the profile and executor fragments for `config`.
pub fn resolve_options(config: &TestConfig) -> Options {
    if config.test_type == TestType::Custom {
        return Options::new();
    }

    let mut options = profiles::profile_options(config.test_type);
    // Existing keys keep their position and take the executor's value.
    for (key, value) in executors::executor_options(config) {
        options.insert(key, value);
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExecutorType, HttpMethod};
    use serde_json::json;

    #[test]
    fn test_executor_wins_on_collision() {
        let mut config = TestConfig::new(
            TestType::Smoke,
            ExecutorType::ConstantVus,
            HttpMethod::Get,
            "http://localhost",
        );
        config.vus = Some(7);
        let options = resolve_options(&config);
        let keys: Vec<&str> = options.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["vus", "duration", "executor"]);
        assert_eq!(options["vus"], json!(7));
        assert_eq!(options["duration"], json!("30s"));
    }

    #[test]
    fn test_profile_stages_survive_non_stage_executor() {
        let config = TestConfig::new(
            TestType::Stress,
            ExecutorType::SharedIterations,
            HttpMethod::Get,
            "http://localhost",
        );
        let options = resolve_options(&config);
        assert_eq!(options["stages"].as_array().map(Vec::len), Some(3));
        assert_eq!(options["executor"], json!("shared-iterations"));
    }

    #[test]
    fn test_breakpoint_executor_replaced_by_selected_one() {
        let config = TestConfig::new(
            TestType::Breakpoint,
            ExecutorType::ConstantArrivalRate,
            HttpMethod::Get,
            "http://localhost",
        );
        let options = resolve_options(&config);
        assert_eq!(options["executor"], json!("constant-arrival-rate"));
        assert_eq!(options["maxVUs"], json!(20));
        // Stages come from the profile; constant-arrival-rate has none of its own.
        assert_eq!(options["stages"], json!([{"duration": "2h", "target": 20000}]));
    }

    #[test]
    fn test_custom_drops_both_fragments() {
        let mut config = TestConfig::new(
            TestType::Custom,
            ExecutorType::RampingArrivalRate,
            HttpMethod::Get,
            "http://localhost",
        );
        config.pre_allocated_vus = Some(40);
        assert!(resolve_options(&config).is_empty());
    }
}

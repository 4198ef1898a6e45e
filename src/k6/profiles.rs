use serde_json::json;

use super::executors::stages_value;
use super::Options;
use crate::model::{Stage, TestType};

pub struct ProfileDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}

pub fn describe(test_type: TestType) -> ProfileDescriptor {
    let (name, description) = match test_type {
        TestType::Smoke => ("Smoke Test", "Minimal load sanity check (2-5 VUs, 1-2 min)"),
        TestType::AverageLoad => (
            "Average Load",
            "Typical real-world load with gradual ramp-up",
        ),
        TestType::Stress => ("Stress Test", "Beyond normal capacity (200+ VUs)"),
        TestType::Soak => ("Soak Test", "Extended duration to detect memory leaks"),
        TestType::Spike => ("Spike Test", "Sudden sharp load increases"),
        TestType::Breakpoint => ("Breakpoint Test", "Find maximum throughput limits"),
        TestType::Custom => ("Custom Test", "Fully customizable configuration"),
    };
    ProfileDescriptor { name, description }
}

/// Canonical options fragment for an archetype. `Custom` contributes nothing.
pub fn profile_options(test_type: TestType) -> Options {
    let mut options = Options::new();
    match test_type {
        TestType::Smoke => {
            options.insert("vus".into(), json!(3));
            options.insert("duration".into(), json!("1m"));
        }
        TestType::AverageLoad => {
            options.insert("stages".into(), schedule(&[("5m", 100), ("30m", 100), ("5m", 0)]));
        }
        TestType::Stress => {
            options.insert("stages".into(), schedule(&[("10m", 200), ("30m", 200), ("5m", 0)]));
        }
        TestType::Soak => {
            options.insert("stages".into(), schedule(&[("5m", 100), ("8h", 100), ("5m", 0)]));
        }
        TestType::Spike => {
            options.insert("stages".into(), schedule(&[("2m", 2000), ("1m", 0)]));
        }
        TestType::Breakpoint => {
            options.insert("executor".into(), json!("ramping-arrival-rate"));
            options.insert("startRate".into(), json!(0));
            options.insert("timeUnit".into(), json!("1s"));
            options.insert("preAllocatedVUs".into(), json!(500));
            options.insert("maxVUs".into(), json!(1000));
            options.insert("stages".into(), schedule(&[("2h", 20000)]));
        }
        TestType::Custom => {}
    }
    options
}

fn schedule(stages: &[(&str, u32)]) -> serde_json::Value {
    let stages: Vec<Stage> = stages.iter().map(|(d, t)| Stage::new(*d, *t)).collect();
    stages_value(&stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_smoke_profile() {
        assert_eq!(
            Value::Object(profile_options(TestType::Smoke)),
            json!({"vus": 3, "duration": "1m"})
        );
    }

    #[test]
    fn test_stress_profile_schedule() {
        let options = profile_options(TestType::Stress);
        assert_eq!(
            options["stages"],
            json!([
                {"duration": "10m", "target": 200},
                {"duration": "30m", "target": 200},
                {"duration": "5m", "target": 0}
            ])
        );
    }

    #[test]
    fn test_breakpoint_profile_pins_arrival_rate() {
        let options = profile_options(TestType::Breakpoint);
        assert_eq!(options["executor"], json!("ramping-arrival-rate"));
        assert_eq!(options["maxVUs"], json!(1000));
        assert_eq!(options["stages"], json!([{"duration": "2h", "target": 20000}]));
    }

    #[test]
    fn test_custom_profile_is_empty() {
        assert!(profile_options(TestType::Custom).is_empty());
    }

    #[test]
    fn test_every_profile_is_described() {
        for test_type in TestType::ALL {
            let d = describe(test_type);
            assert!(!d.name.is_empty());
            assert!(!d.description.is_empty());
        }
    }
}

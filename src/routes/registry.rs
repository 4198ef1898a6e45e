use axum::Json;
use serde::Serialize;

use crate::k6::{descriptor, profiles, ExecutorCategory, Options};
use crate::model::{ExecutorType, TestType};

#[derive(Serialize)]
pub struct ExecutorInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ExecutorCategory,
}

#[derive(Serialize)]
pub struct TestTypeInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// The archetype's own options fragment, before executor fields are merged in.
    pub options: Options,
}

pub fn executor_listing() -> Vec<ExecutorInfo> {
    ExecutorType::ALL
        .into_iter()
        .map(|executor| {
            let d = descriptor(executor);
            ExecutorInfo {
                id: executor.as_str(),
                name: d.name,
                description: d.description,
                category: d.category,
            }
        })
        .collect()
}

pub fn test_type_listing() -> Vec<TestTypeInfo> {
    TestType::ALL
        .into_iter()
        .map(|test_type| {
            let d = profiles::describe(test_type);
            TestTypeInfo {
                id: test_type.as_str(),
                name: d.name,
                description: d.description,
                options: profiles::profile_options(test_type),
            }
        })
        .collect()
}

/// GET /api/executors
pub async fn executors() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "executors": executor_listing() }))
}

/// GET /api/test-types
pub async fn test_types() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "test_types": test_type_listing() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_listing_order_and_categories() {
        let listing = executor_listing();
        let ids: Vec<&str> = listing.iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![
                "shared-iterations",
                "per-vu-iterations",
                "constant-vus",
                "ramping-vus",
                "constant-arrival-rate",
                "ramping-arrival-rate",
            ]
        );
        let json = serde_json::to_value(&listing[4]).unwrap();
        assert_eq!(json["category"], "arrival-rate");
    }

    #[test]
    fn test_test_type_listing_includes_custom_empty_options() {
        let listing = test_type_listing();
        let custom = listing.iter().find(|t| t.id == "custom").unwrap();
        assert!(custom.options.is_empty());
        let smoke = listing.iter().find(|t| t.id == "smoke").unwrap();
        assert_eq!(smoke.options["vus"], 3);
    }
}

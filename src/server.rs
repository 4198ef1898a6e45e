use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        // Health
        .route("/health", get(crate::routes::health::health))
        // Registry listings for the config form
        .route("/api/executors", get(crate::routes::registry::executors))
        .route("/api/test-types", get(crate::routes::registry::test_types))
        // Config -> script
        .route("/api/k6/script", post(crate::routes::k6::compile_script))
        .route("/api/k6/validate", post(crate::routes::k6::validate_config))
        // Output -> metrics
        .route("/api/k6/parse", post(crate::routes::k6::parse_output))
        .route("/api/k6/timeseries", post(crate::routes::k6::timeseries))
        // Result files
        .route("/api/k6/import", post(crate::routes::k6::import_result))
        .route("/api/k6/export", post(crate::routes::k6::export_result))
        .layer(body_limit)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

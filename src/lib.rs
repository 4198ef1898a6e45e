// Library crate for the CLI and integration tests.

pub mod config;
pub mod duration;
pub mod error;
pub mod k6;
pub mod model;
pub mod report;
pub mod results;
pub mod routes;
pub mod server;
pub mod state;
pub mod validation;

pub mod health;
pub mod k6;
pub mod registry;

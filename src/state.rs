use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub type SharedState = Arc<WorkbenchState>;

/// Everything handlers share. The translation layer itself is stateless, so this is
/// read-only after startup.
pub struct WorkbenchState {
    pub config: ServerConfig,
    pub started_at: DateTime<Utc>,
}

impl WorkbenchState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

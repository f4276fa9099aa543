use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub database: String,
    pub checked_at: DateTime<Utc>,
}

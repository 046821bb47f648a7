//! Cross-backend aggregation for `/v1/models` and `/health`

pub mod health;
pub mod models;

pub use health::{check_health, HealthReport, ServiceStatus};
pub use models::{list_models, ModelDescriptor, ModelList};

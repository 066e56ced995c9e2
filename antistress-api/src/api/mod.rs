//! HTTP API handlers for antistress-api

pub mod extract;
pub mod health;
pub mod workers;

pub use extract::ValidatedJson;
pub use health::{health_check, health_routes, root};
pub use workers::{create_worker, delete_worker, worker_routes, worker_stress_level};

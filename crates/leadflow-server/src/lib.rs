//! Leadflow server library surface, exposed for integration tests.

pub mod handlers;
pub mod routes;

pub use routes::{create_router, AppState};

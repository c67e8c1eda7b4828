//! HTTP request handlers.

mod health;
mod sns;

pub use health::{health_check, liveness_check, readiness_check};
pub use sns::receive_sns;

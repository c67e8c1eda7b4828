//! Fanout HTTP API and application facade.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod handlers;
pub mod server;

pub use app::EventHub;
pub use config::Config;
pub use server::{create_router, start_server, AppState};

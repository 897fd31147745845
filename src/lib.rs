pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod health;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod types;

pub mod config;
pub mod replay;
pub mod server;
pub mod setup;
pub mod telemetry;

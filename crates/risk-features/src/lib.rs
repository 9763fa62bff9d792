pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod telemetry;

pub mod config;
pub mod market;
pub mod telemetry;

pub use market::types::U256;

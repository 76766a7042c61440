//! Shared foundation for the leakcheck workspace: configuration loading,
//! logging setup and the core error type.

mod config;
mod error;
pub mod logging;

pub use config::{Config, DetectionConfig, GlobalConfig, load_config};
pub use error::CoreError;

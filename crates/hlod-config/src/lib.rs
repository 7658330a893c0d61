//! Configuration system for the HLOD runtime.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BuildConfig, CONFIG_FILE_NAME, Config, DebugConfig, LodConfig, SimplifyConfig,
    StreamingConfig,
};
pub use error::ConfigError;

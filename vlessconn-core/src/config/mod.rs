//! Configuration management for `vlessconn`
//!
//! This module provides the `ConfigManager` for locating the config
//! directory and loading and saving settings in TOML format.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_ENV, ConfigManager};
pub use settings::{AppSettings, DEFAULT_CONNECT_TIMEOUT_SECS, LoggingSettings, Theme};

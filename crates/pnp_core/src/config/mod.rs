//! Configuration management for the job processor.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use pnp_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/pnp.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Logs folder: {}", config.settings().paths.logs_folder);
//!
//! config.settings_mut().motion.xy_feed_rate = 0.5;
//! config.update_section(ConfigSection::Motion).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{ConfigSection, LoggingSettings, MotionSettings, PathSettings, Settings};

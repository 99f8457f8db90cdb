//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Motion feed rates used by the job processor.
    #[serde(default)]
    pub motion: MotionSettings,
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for per-job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level written to job logs.
    #[serde(default)]
    pub level: LogLevel,

    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of recent lines to dump when a job fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Prefix job log lines with a timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

impl LoggingSettings {
    /// Build the job logger configuration from these settings.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            compact: self.compact,
            progress_step: self.progress_step.max(1),
            error_tail: self.error_tail as usize,
            show_timestamps: self.show_timestamps,
        }
    }
}

/// Feed-rate ratios (fraction of each axis' maximum speed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionSettings {
    /// Ratio for retracts to safe height.
    #[serde(default = "default_feed_rate")]
    pub safe_z_feed_rate: f64,

    /// Ratio for X/Y travel at safe height.
    #[serde(default = "default_feed_rate")]
    pub xy_feed_rate: f64,

    /// Ratio for the final descent onto a pick or place location.
    #[serde(default = "default_feed_rate")]
    pub z_feed_rate: f64,
}

fn default_feed_rate() -> f64 {
    1.0
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            safe_z_feed_rate: default_feed_rate(),
            xy_feed_rate: default_feed_rate(),
            z_feed_rate: default_feed_rate(),
        }
    }
}

impl MotionSettings {
    pub fn safe_z_ratio(&self) -> f64 {
        sanitize_ratio(self.safe_z_feed_rate)
    }

    pub fn xy_ratio(&self) -> f64 {
        sanitize_ratio(self.xy_feed_rate)
    }

    pub fn z_ratio(&self) -> f64 {
        sanitize_ratio(self.z_feed_rate)
    }
}

/// Ratios outside (0, 1] fall back to full speed.
fn sanitize_ratio(value: f64) -> f64 {
    if value > 0.0 && value <= 1.0 {
        value
    } else {
        default_feed_rate()
    }
}

/// Configuration sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Logging,
    Motion,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 3] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Motion,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Motion => "motion",
        }
    }

    /// Comment written above the section.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Log and job directories",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Motion => "Motion feed-rate ratios (0 < ratio <= 1)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[logging]"));
        assert!(toml.contains("[motion]"));
        assert!(toml.contains("logs_folder"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[motion]\nxy_feed_rate = 0.5";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.motion.xy_feed_rate, 0.5);
        assert_eq!(parsed.motion.safe_z_feed_rate, 1.0);
        assert!(parsed.logging.compact);
        assert_eq!(parsed.paths.logs_folder, ".logs");
    }

    #[test]
    fn paths_section_holds_only_logs_folder() {
        let toml = toml::to_string_pretty(&PathSettings::default()).unwrap();
        assert_eq!(toml.trim(), "logs_folder = \".logs\"");

        let parsed: Settings =
            toml::from_str("[paths]\nlogs_folder = \"out\"\nlast_job = \"old\"").unwrap();
        assert_eq!(parsed.paths.logs_folder, "out");
    }

    #[test]
    fn out_of_range_ratios_fall_back_to_full_speed() {
        let motion = MotionSettings {
            safe_z_feed_rate: 0.0,
            xy_feed_rate: 1.5,
            z_feed_rate: 0.25,
        };
        assert_eq!(motion.safe_z_ratio(), 1.0);
        assert_eq!(motion.xy_ratio(), 1.0);
        assert_eq!(motion.z_ratio(), 0.25);
    }

    #[test]
    fn log_level_reads_lowercase() {
        let parsed: Settings = toml::from_str("[logging]\nlevel = \"debug\"").unwrap();
        assert_eq!(parsed.logging.level, LogLevel::Debug);
        assert_eq!(parsed.logging.log_config().level, LogLevel::Debug);
    }
}

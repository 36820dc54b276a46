//! Application settings model
//!
//! Settings are stored as TOML. Every field has a default so that partial
//! or older files still load.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::tracing::TracingLevel;

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Color theme of the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme
    #[default]
    Dark,
    /// Light theme
    Light,
    /// Follow the system preference
    System,
}

impl Theme {
    /// Returns all themes
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Dark, Self::Light, Self::System]
    }

    /// Returns the config-file spelling of the theme
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::Validation {
                key: "theme".to_string(),
                reason: format!("unknown theme '{s}' (expected dark, light or system)"),
            })
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level name (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    /// Parses the configured level
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown level name.
    pub fn tracing_level(&self) -> ConfigResult<TracingLevel> {
        self.level
            .parse::<TracingLevel>()
            .map_err(|_| ConfigError::Validation {
                key: "logging.level".to_string(),
                reason: format!("unknown log level '{}'", self.level),
            })
    }
}

/// User-adjustable application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Connect to the selected profile on startup
    pub auto_connect: bool,
    /// Ask the tunnel to block traffic while disconnected
    pub kill_switch: bool,
    /// Color theme
    pub theme: Theme,
    /// Seconds to wait for a tunnel to come up; 0 waits forever
    pub connect_timeout_secs: u64,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            auto_connect: false,
            kill_switch: false,
            theme: Theme::default(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            logging: LoggingSettings::default(),
        }
    }
}

impl AppSettings {
    /// Checks that every setting has an acceptable value
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first bad setting.
    pub fn validate(&self) -> ConfigResult<()> {
        self.logging.tracing_level()?;
        Ok(())
    }

    /// Sets a setting from its dotted key and text value
    ///
    /// Keys: `auto_connect`, `kill_switch`, `theme`, `connect_timeout_secs`,
    /// `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown key or a value that does
    /// not fit the key.
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        match key {
            "auto_connect" => self.auto_connect = parse_bool(key, value)?,
            "kill_switch" => self.kill_switch = parse_bool(key, value)?,
            "theme" => self.theme = value.parse()?,
            "connect_timeout_secs" => {
                self.connect_timeout_secs =
                    value.parse().map_err(|_| ConfigError::Validation {
                        key: key.to_string(),
                        reason: format!("expected a number of seconds, got '{value}'"),
                    })?;
            }
            "logging.level" => {
                let logging = LoggingSettings {
                    level: value.to_lowercase(),
                };
                logging.tracing_level()?;
                self.logging = logging;
            }
            _ => {
                return Err(ConfigError::Validation {
                    key: key.to_string(),
                    reason: "unknown setting".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the connect timeout, or `None` when disabled
    #[must_use]
    pub const fn connect_timeout(&self) -> Option<std::time::Duration> {
        if self.connect_timeout_secs == 0 {
            None
        } else {
            Some(std::time::Duration::from_secs(self.connect_timeout_secs))
        }
    }
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::Validation {
            key: key.to_string(),
            reason: format!("expected true or false, got '{value}'"),
        }),
    }
}

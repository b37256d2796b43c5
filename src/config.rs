//! Engine configuration
//!
//! Process-wide settings for logging and date handling. Installed once;
//! when nothing is installed the environment is read on first use.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::observability::Severity;
use crate::util::date::DateFormat;

/// Environment variable overriding the log threshold
pub const LOG_LEVEL_ENV: &str = "SCHEMATA_LOG_LEVEL";

/// Environment variable overriding the default date format
pub const DATE_FORMAT_ENV: &str = "SCHEMATA_DATE_FORMAT";

static CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Schema engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum severity that reaches the log (default: WARN)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,

    /// Format used by date attributes declared without one (default: "rfc3339")
    ///
    /// Any value other than "rfc3339" is a chrono strftime pattern.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_log_level() -> Severity {
    Severity::Warn
}

fn default_date_format() -> String {
    "rfc3339".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            date_format: default_date_format(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration document; missing keys take their defaults
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Build a configuration from `SCHEMATA_*` environment variables
    ///
    /// Unset or unparseable variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any variable source keyed like the environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup(LOG_LEVEL_ENV).and_then(|v| Severity::parse(&v)) {
            config.log_level = level;
        }

        if let Some(format) = lookup(DATE_FORMAT_ENV) {
            if !format.trim().is_empty() {
                config.date_format = format;
            }
        }

        config
    }

    /// Install this configuration process-wide
    ///
    /// Returns false when a configuration was already installed or read.
    pub fn install(self) -> bool {
        CONFIG.set(self).is_ok()
    }

    /// The active configuration
    pub fn current() -> &'static EngineConfig {
        CONFIG.get_or_init(Self::from_env)
    }

    /// The default date format as a typed value
    pub fn default_date_format(&self) -> DateFormat {
        DateFormat::from(self.date_format.as_str())
    }
}

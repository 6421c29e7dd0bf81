//! Settings loading helpers.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::lookup::LookupOptions;
use crate::stats::{ReportFormat, StatsReporter};

/// Environment variable naming the settings file.
pub const CONFIG_PATH_ENV: &str = "CONFMAP_CONFIG";

/// Prefix of `CONFMAP__section__field` override variables.
pub const OVERRIDE_PREFIX: &str = "CONFMAP__";

/// Errors returned by settings loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error while reading settings files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Invalid value for a key.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Settings key.
        key: String,
        /// Raw value string.
        value: String,
    },
    /// Unknown settings key.
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Top-level settings schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfmapConfig {
    /// Lookup engine settings.
    pub lookup: Option<LookupConfigSpec>,
    /// Statistics reporting settings.
    pub stats: Option<StatsConfigSpec>,
}

impl ConfmapConfig {
    /// Load settings from a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load settings from the `CONFMAP_CONFIG` env var (if set),
    /// then apply `CONFMAP__section__field` overrides.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV).ok() {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment overrides in-place.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        for (key, value) in env::vars() {
            let Some(path) = key.strip_prefix(OVERRIDE_PREFIX) else {
                continue;
            };
            let path = path.to_ascii_lowercase();
            let parts: Vec<&str> = path.split("__").collect();
            let value = value.trim();

            match parts.as_slice() {
                ["lookup", "statistics"] => {
                    self.lookup_mut().statistics = Some(parse_value(&key, value)?);
                }
                ["lookup", "prefix_index"] => {
                    self.lookup_mut().prefix_index = Some(parse_value(&key, value)?);
                }
                ["stats", "report_format"] => {
                    self.stats_mut().report_format = Some(parse_value(&key, value)?);
                }
                ["stats", "detailed"] => {
                    self.stats_mut().detailed = Some(parse_value(&key, value)?);
                }
                _ => return Err(ConfigError::UnknownKey(key)),
            }
        }

        Ok(())
    }

    /// Build `LookupOptions` using defaults plus overrides.
    pub fn to_lookup_options(&self) -> LookupOptions {
        let mut options = LookupOptions::default();
        if let Some(lookup) = &self.lookup {
            lookup.apply_to(&mut options);
        }
        options
    }

    /// Configured report format, text unless set.
    pub fn report_format(&self) -> ReportFormat {
        self.stats
            .as_ref()
            .and_then(|stats| stats.report_format)
            .unwrap_or_default()
    }

    /// Build a `StatsReporter` from the `[stats]` section.
    pub fn to_stats_reporter(&self) -> StatsReporter {
        let reporter = StatsReporter::new(self.report_format());
        match self.stats.as_ref().and_then(|stats| stats.detailed) {
            Some(detailed) => reporter.with_detailed(detailed),
            None => reporter,
        }
    }

    fn lookup_mut(&mut self) -> &mut LookupConfigSpec {
        self.lookup.get_or_insert_with(LookupConfigSpec::default)
    }

    fn stats_mut(&mut self) -> &mut StatsConfigSpec {
        self.stats.get_or_insert_with(StatsConfigSpec::default)
    }
}

/// Lookup engine overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupConfigSpec {
    /// Start with statistics collection enabled.
    pub statistics: Option<bool>,
    /// Answer prefix lookups from a trie index.
    pub prefix_index: Option<bool>,
}

impl LookupConfigSpec {
    fn apply_to(&self, options: &mut LookupOptions) {
        if let Some(value) = self.statistics {
            options.statistics = value;
        }
        if let Some(value) = self.prefix_index {
            options.prefix_index = value;
        }
    }
}

/// Statistics reporting overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsConfigSpec {
    /// Report output format.
    pub report_format: Option<ReportFormat>,
    /// Whether reports list associated patterns.
    pub detailed: Option<bool>,
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE: &str = "fragments.yaml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration of the fragments command line
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FragmentsConfig {
    /// Log level used when neither `RUST_LOG` nor `--debug` is set
    pub log_level: String,
    /// Fixture file replayed as the data source
    pub fixtures: Option<PathBuf>,
    /// Rows buffered between the source and the fetcher
    pub buffer: usize,
}

impl Default for FragmentsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            fixtures: None,
            buffer: 16,
        }
    }
}

impl FragmentsConfig {
    /// Load configuration from a specific file.
    ///
    /// A relative fixtures path is resolved against the directory of the file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();

        if !config_path.exists() {
            return Err(anyhow!(
                "Configuration file not found at: {}",
                config_path.display()
            ));
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: FragmentsConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        if let (Some(fixtures), Some(dir)) = (&config.fixtures, config_path.parent()) {
            if fixtures.is_relative() {
                config.fixtures = Some(dir.join(fixtures));
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or the defaults when there is no such file
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a specific file
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(anyhow!(
                "Unknown log level '{}', expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        if self.buffer == 0 {
            return Err(anyhow!("Buffer size must be at least 1"));
        }

        Ok(())
    }
}

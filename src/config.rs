//! Centralized configuration management for pkgform

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

/// How generated field ids are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// Random suffix, collision unchecked
    Random,
    /// Monotonic counter per renderer
    Sequential,
}

impl std::str::FromStr for IdStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "random" | "uuid" => Ok(IdStrategy::Random),
            "sequential" | "counter" => Ok(IdStrategy::Sequential),
            other => Err(anyhow::anyhow!(
                "Unsupported id strategy: {}. Supported strategies: random, sequential",
                other
            )),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix for generated field ids
    pub id_prefix: String,
    /// Strategy for generated field ids
    pub id_strategy: IdStrategy,
    /// Log file written by the terminal UI
    pub log_file: PathBuf,
    /// Event poll interval (milliseconds)
    pub tick_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            id_prefix: "form-input-".to_string(),
            id_strategy: IdStrategy::Random,
            log_file: PathBuf::from("./pkgform.log"),
            tick_ms: 50,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let id_prefix = lookup("PKGFORM_ID_PREFIX").unwrap_or(defaults.id_prefix);
        let id_strategy =
            parse_var(&lookup, "PKGFORM_ID_STRATEGY")?.unwrap_or(defaults.id_strategy);
        let log_file = lookup("PKGFORM_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);
        let tick_ms = parse_var(&lookup, "PKGFORM_TICK_MS")?.unwrap_or(defaults.tick_ms);

        Ok(Config {
            id_prefix,
            id_strategy,
            log_file,
            tick_ms,
        })
    }

    /// Get event poll interval as Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(anyhow::anyhow!("PKGFORM_TICK_MS must be greater than zero"));
        }

        if let Some(parent) = self.log_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(anyhow::anyhow!(
                    "Log file directory does not exist: {}",
                    parent.display()
                ));
            }
        }

        Ok(())
    }
}

/// Parse a variable from the lookup as a specific type
fn parse_var<F, T>(lookup: &F, var_name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: Into<anyhow::Error>,
{
    match lookup(var_name) {
        Some(val) => val
            .parse::<T>()
            .map(Some)
            .map_err(Into::<anyhow::Error>::into)
            .with_context(|| format!("Failed to parse environment variable {} = '{}'", var_name, val)),
        None => Ok(None),
    }
}

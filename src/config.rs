//! Runtime settings, read from the environment (and an optional `.env` file).

use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;
use thiserror::Error;

pub const LOG_FILE_VAR: &str = "HEMOLIFE_LOG_FILE";
pub const LOG_LEVEL_VAR: &str = "HEMOLIFE_LOG_LEVEL";
pub const LOW_STOCK_VAR: &str = "HEMOLIFE_LOW_STOCK";

pub const DEFAULT_LOG_FILE: &str = "./hemolife.log";
pub const DEFAULT_LOW_STOCK: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    /// Available units under which a blood group is reported as short
    pub low_stock_threshold: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: LevelFilter::Info,
            low_stock_threshold: DEFAULT_LOW_STOCK,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from any variable source; unset variables
    /// keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(LOG_FILE_VAR).filter(|path| !path.trim().is_empty()) {
            config.log_file = PathBuf::from(path);
        }
        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            config.log_level = parse(LOG_LEVEL_VAR, &level)?;
        }
        if let Some(threshold) = lookup(LOW_STOCK_VAR) {
            config.low_stock_threshold = parse(LOW_STOCK_VAR, &threshold)?;
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (LOG_FILE_VAR, "/tmp/bank.log"),
            (LOG_LEVEL_VAR, "debug"),
            (LOW_STOCK_VAR, " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.log_file, PathBuf::from("/tmp/bank.log"));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.low_stock_threshold, 5);
    }

    #[test]
    fn test_invalid_values() {
        let invalid_cases = vec![
            (LOG_LEVEL_VAR, "loud"),
            (LOW_STOCK_VAR, "-1"),
            (LOW_STOCK_VAR, "three"),
        ];

        for (var, value) in invalid_cases {
            assert!(Config::from_lookup(lookup(&[(var, value)])).is_err(),
                    "{}={} was accepted !", var, value);
        }
    }

    #[test]
    fn test_blank_log_file_keeps_default() {
        let config = Config::from_lookup(lookup(&[(LOG_FILE_VAR, "  ")])).unwrap();
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }
}

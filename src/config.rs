//! Planner configuration
//!
//! Layered as defaults, then an optional JSON file, then `CFO_HELPER_*`
//! environment variables.

use crate::accounts::FREE_PLAN_MAX_USAGE;
use crate::finance::PROJECTION_MONTHS;
use crate::scenarios::{DEFAULT_HISTORY_LIMIT, DEFAULT_RECENT_LIMIT};
use crate::store::DEFAULT_STORE_DIR;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_PREFIX: &str = "CFO_HELPER_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    /// Directory of the file-backed store
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// Quick saves kept in history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Scenarios listed as "recent"
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Base live-feed tick period
    #[serde(default = "default_feed_interval_ms")]
    pub feed_interval_ms: u64,

    /// Random extra added once to the tick period
    #[serde(default = "default_feed_jitter_ms")]
    pub feed_jitter_ms: u64,

    #[serde(default = "default_free_plan_max_usage")]
    pub free_plan_max_usage: u32,

    #[serde(default = "default_projection_months")]
    pub projection_months: usize,

    /// Fixed RNG seed for a reproducible live feed
    #[serde(default)]
    pub feed_seed: Option<u64>,
}

fn default_store_dir() -> PathBuf { PathBuf::from(DEFAULT_STORE_DIR) }
fn default_history_limit() -> usize { DEFAULT_HISTORY_LIMIT }
fn default_recent_limit() -> usize { DEFAULT_RECENT_LIMIT }
fn default_feed_interval_ms() -> u64 { 15_000 }
fn default_feed_jitter_ms() -> u64 { 15_000 }
fn default_free_plan_max_usage() -> u32 { FREE_PLAN_MAX_USAGE }
fn default_projection_months() -> usize { PROJECTION_MONTHS }

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            history_limit: default_history_limit(),
            recent_limit: default_recent_limit(),
            feed_interval_ms: default_feed_interval_ms(),
            feed_jitter_ms: default_feed_jitter_ms(),
            free_plan_max_usage: default_free_plan_max_usage(),
            projection_months: default_projection_months(),
            feed_seed: None,
        }
    }
}

impl PlannerConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Defaults or `path`, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect();
        self.apply_env_map(&vars)
    }

    /// Apply overrides from `CFO_HELPER_*` keys; unknown keys are ignored
    pub fn apply_env_map(&mut self, vars: &HashMap<String, String>) -> Result<(), ConfigError> {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "STORE_DIR" => self.store_dir = PathBuf::from(value),
                "HISTORY_LIMIT" => self.history_limit = parse_env(key, value)?,
                "RECENT_LIMIT" => self.recent_limit = parse_env(key, value)?,
                "FEED_INTERVAL_MS" => self.feed_interval_ms = parse_env(key, value)?,
                "FEED_JITTER_MS" => self.feed_jitter_ms = parse_env(key, value)?,
                "FREE_PLAN_MAX_USAGE" => self.free_plan_max_usage = parse_env(key, value)?,
                "PROJECTION_MONTHS" => self.projection_months = parse_env(key, value)?,
                "FEED_SEED" => self.feed_seed = Some(parse_env(key, value)?),
                _ => {}
            }
        }
        Ok(())
    }

    /// Defaults with overrides from `vars`
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_map(vars)?;
        Ok(config)
    }

    pub fn feed_interval(&self) -> Duration {
        Duration::from_millis(self.feed_interval_ms)
    }

    pub fn feed_jitter(&self) -> Duration {
        Duration::from_millis(self.feed_jitter_ms)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.store_dir, PathBuf::from("data/store"));
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.recent_limit, 5);
        assert_eq!(config.feed_interval(), Duration::from_secs(15));
        assert_eq!(config.free_plan_max_usage, 10);
        assert_eq!(config.projection_months, 12);
        assert!(config.feed_seed.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("planner.json");
        file.write_str(r#"{"historyLimit": 3, "feedSeed": 7}"#).unwrap();

        let config = PlannerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.history_limit, 3);
        assert_eq!(config.feed_seed, Some(7));
        assert_eq!(config.recent_limit, 5);
    }

    #[test]
    fn test_env_overrides() {
        let config = PlannerConfig::from_env_map(&vars(&[
            ("CFO_HELPER_STORE_DIR", "/tmp/cfo"),
            ("CFO_HELPER_FEED_INTERVAL_MS", "250"),
            ("CFO_HELPER_FEED_SEED", "42"),
            ("CFO_HELPER_UNKNOWN", "x"),
            ("HOME", "/root"),
        ]))
        .unwrap();

        assert_eq!(config.store_dir, PathBuf::from("/tmp/cfo"));
        assert_eq!(config.feed_interval_ms, 250);
        assert_eq!(config.feed_seed, Some(42));
    }

    #[test]
    fn test_invalid_env_value() {
        let err = PlannerConfig::from_env_map(&vars(&[("CFO_HELPER_HISTORY_LIMIT", "ten")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { key, value } if key == "CFO_HELPER_HISTORY_LIMIT" && value == "ten"
        ));
    }

    #[test]
    fn test_malformed_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("planner.json");
        file.write_str("{ nope").unwrap();
        assert!(matches!(PlannerConfig::from_file(file.path()), Err(ConfigError::Json(_))));
    }
}

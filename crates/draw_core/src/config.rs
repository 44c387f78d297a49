//! # Draw configuration
//!
//! Competition-wide defaults that an operator form or a JSON file supplies
//! once per event. Each class turns them into `DrawOptions` by adding its
//! first start time.
//!
//! ```rust
//! use draw_core::config::DrawConfig;
//!
//! let individual = DrawConfig::individual();
//! let sprint = DrawConfig::sprint();
//! assert!(sprint.interval_secs < individual.interval_secs);
//! ```

use crate::options::{DrawOptions, ShortfallPolicy};
use crate::policy::DrawPolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{env, fs};
use thiserror::Error;

pub const DRAW_CONFIG_PATH_ENV: &str = "DRAW_CONFIG_PATH";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawConfig {
    #[serde(default = "default_policy")]
    pub policy: DrawPolicy,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: i64,
    #[serde(default)]
    pub vacancies: u32,
    #[serde(default = "default_club_separation")]
    pub club_separation: bool,
    #[serde(default = "default_min_club_separation")]
    pub min_club_separation: usize,
    #[serde(default)]
    pub repair_window: Option<usize>,
    #[serde(default)]
    pub shortfall: ShortfallPolicy,
    /// Empty intervals between chained classes on a shared start.
    #[serde(default)]
    pub class_gap: u32,
}

fn default_policy() -> DrawPolicy {
    DrawPolicy::Meos
}

fn default_interval_secs() -> i64 {
    120
}

fn default_club_separation() -> bool {
    true
}

fn default_min_club_separation() -> usize {
    2
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self::individual()
    }
}

impl DrawConfig {
    /// Classic individual start: two-minute interval, clubs two slots apart.
    pub fn individual() -> Self {
        Self {
            policy: default_policy(),
            interval_secs: default_interval_secs(),
            vacancies: 0,
            club_separation: default_club_separation(),
            min_club_separation: default_min_club_separation(),
            repair_window: None,
            shortfall: ShortfallPolicy::Degrade,
            class_gap: 0,
        }
    }

    /// Short interval, wider club spacing.
    pub fn sprint() -> Self {
        Self { interval_secs: 60, min_club_separation: 3, ..Self::individual() }
    }

    /// Club blind random draw, for training events.
    pub fn relaxed() -> Self {
        Self {
            policy: DrawPolicy::Random,
            club_separation: false,
            min_club_separation: 1,
            ..Self::individual()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DrawConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs <= 0 {
            return Err(ConfigError::Validation(format!(
                "interval_secs must be positive, got {}",
                self.interval_secs
            )));
        }
        if self.min_club_separation == 0 {
            return Err(ConfigError::Validation("min_club_separation must be at least 1".into()));
        }
        self.policy.validate().map_err(|e| ConfigError::Validation(e.to_string()))?;
        self.to_options(DateTime::UNIX_EPOCH)
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    pub fn to_options(&self, first_start: DateTime<Utc>) -> DrawOptions {
        let mut options = DrawOptions::new(first_start, self.interval_secs)
            .with_vacancies(self.vacancies)
            .with_shortfall(self.shortfall);
        options.club_separation = self.club_separation;
        options.min_club_separation = self.min_club_separation;
        options.repair_window = self.repair_window;
        options
    }

    /// Loads the file named by `DRAW_CONFIG_PATH`. `Ok(None)` when unset.
    pub fn load_from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(path) = env::var(DRAW_CONFIG_PATH_ENV) else {
            return Ok(None);
        };
        let path = path.trim();
        if path.is_empty() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_string(), source })?;
        Self::from_json(&content)
    }
}

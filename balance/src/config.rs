use std::time::Duration;

use balance_common::{config::get_config_by_file, error::ConfigError};
use serde::{Deserialize, Serialize};

use crate::error::BalanceError;

pub const DEFAULT_WEIGHT: i32 = 50;
pub const MAX_WEIGHT: i32 = 100;
pub const DEFAULT_WARM_UP_MS: u64 = 10 * 60 * 1000;

/// Client side defaults applied to every channel group.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BalanceConfig {
    default_weight: i32,
    max_weight: i32,
    warm_up_ms: u64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            default_weight: DEFAULT_WEIGHT,
            max_weight: MAX_WEIGHT,
            warm_up_ms: DEFAULT_WARM_UP_MS,
        }
    }
}

impl BalanceConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let config: Self = get_config_by_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.max_weight < 0 {
            return Err(BalanceError::Config(Box::new(ConfigError::Invalid(format!(
                "max_weight must not be negative : {}",
                self.max_weight
            )))));
        }
        Ok(())
    }

    pub fn default_weight(&self) -> i32 {
        self.default_weight
    }

    pub fn max_weight(&self) -> i32 {
        self.max_weight
    }

    pub fn warm_up(&self) -> Duration {
        Duration::from_millis(self.warm_up_ms)
    }

    pub fn set_default_weight(mut self, default_weight: i32) -> Self {
        self.default_weight = default_weight;
        self
    }

    pub fn set_warm_up(mut self, warm_up: Duration) -> Self {
        self.warm_up_ms = warm_up.as_millis() as u64;
        self
    }
}

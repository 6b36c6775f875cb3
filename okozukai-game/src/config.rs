//! Build-time game configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// Tunable constants that shape a campaign's arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_monthly_allowance")]
    pub monthly_allowance: i64,
    #[serde(default = "GameConfig::default_min_goal_price")]
    pub min_goal_price: i64,
    #[serde(default = "GameConfig::default_max_goal_price")]
    pub max_goal_price: i64,
    /// Plans longer than this are flagged as long but may still start.
    #[serde(default = "GameConfig::default_max_months")]
    pub max_months: u32,
    #[serde(default = "GameConfig::default_start_month")]
    pub start_month: u32,
    #[serde(default = "GameConfig::default_temptations_per_month")]
    pub temptations_per_month: u32,
    #[serde(default = "GameConfig::default_happening_probability")]
    pub happening_probability: f64,
}

impl GameConfig {
    #[must_use]
    pub const fn default_monthly_allowance() -> i64 {
        constants::MONTHLY_ALLOWANCE
    }

    #[must_use]
    pub const fn default_min_goal_price() -> i64 {
        constants::MIN_GOAL_PRICE
    }

    #[must_use]
    pub const fn default_max_goal_price() -> i64 {
        constants::MAX_GOAL_PRICE
    }

    #[must_use]
    pub const fn default_max_months() -> u32 {
        constants::MAX_MONTHS
    }

    #[must_use]
    pub const fn default_start_month() -> u32 {
        constants::START_MONTH
    }

    #[must_use]
    pub const fn default_temptations_per_month() -> u32 {
        constants::TEMPTATION_PER_MONTH
    }

    #[must_use]
    pub const fn default_happening_probability() -> f64 {
        constants::HAPPENING_PROBABILITY
    }

    /// Validate configuration bounds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monthly_allowance <= 0 {
            return Err(ConfigError::NonPositive {
                field: "monthly_allowance",
                value: self.monthly_allowance,
            });
        }
        if self.min_goal_price > self.max_goal_price {
            return Err(ConfigError::GoalRangeInverted {
                min: self.min_goal_price,
                max: self.max_goal_price,
            });
        }
        if self.max_months == 0 {
            return Err(ConfigError::NonPositive {
                field: "max_months",
                value: 0,
            });
        }
        if !(1..=constants::MONTHS_PER_YEAR).contains(&self.start_month) {
            return Err(ConfigError::StartMonth(self.start_month));
        }
        if !(0.0..=1.0).contains(&self.happening_probability) {
            return Err(ConfigError::Probability(self.happening_probability));
        }
        Ok(())
    }

    /// Whether a goal price lies inside the configured goal range.
    #[must_use]
    pub fn goal_price_in_range(&self, price: i64) -> bool {
        (self.min_goal_price..=self.max_goal_price).contains(&price)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            monthly_allowance: Self::default_monthly_allowance(),
            min_goal_price: Self::default_min_goal_price(),
            max_goal_price: Self::default_max_goal_price(),
            max_months: Self::default_max_months(),
            start_month: Self::default_start_month(),
            temptations_per_month: Self::default_temptations_per_month(),
            happening_probability: Self::default_happening_probability(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: i64 },
    #[error("minimum goal price {min} exceeds maximum {max}")]
    GoalRangeInverted { min: i64, max: i64 },
    #[error("start month must be within 1..=12 (got {0})")]
    StartMonth(u32),
    #[error("happening probability must be within 0.0..=1.0 (got {0:.3})")]
    Probability(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: GameConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(cfg, GameConfig::default());
        cfg.validate().expect("defaults are valid");
        assert_eq!(cfg.monthly_allowance, 500);
        assert_eq!(cfg.start_month, 4);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let cfg = GameConfig {
            start_month: 13,
            ..GameConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::StartMonth(13)));

        let cfg = GameConfig {
            happening_probability: 1.5,
            ..GameConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Probability(_))));

        let cfg = GameConfig {
            min_goal_price: 7000,
            ..GameConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::GoalRangeInverted { min: 7000, .. })
        ));

        let cfg = GameConfig {
            monthly_allowance: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive {
                field: "monthly_allowance",
                ..
            })
        ));
    }

    #[test]
    fn goal_range_is_inclusive() {
        let cfg = GameConfig::default();
        assert!(cfg.goal_price_in_range(1500));
        assert!(cfg.goal_price_in_range(6000));
        assert!(!cfg.goal_price_in_range(6001));
    }
}

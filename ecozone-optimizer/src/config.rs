use serde::{Deserialize, Serialize};

use crate::dto::NeedLevel;
use crate::errors::ConfigError;

pub const DEFAULT_UNCONSTRAINED_BUDGET: f64 = 10_000_000_000.0;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RewardWeights {
    pub co2: f64,
    pub health: f64,
    pub sustainability: f64,
    pub policy: f64,
    pub cost: f64,
    pub budget_violation: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            co2: 0.25,
            health: 0.20,
            sustainability: 0.10,
            policy: 0.35,
            cost: -0.40,
            budget_violation: -0.20,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UrgencyTier {
    pub aqi_above: f64,
    pub multiplier: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RewardConfig {
    pub weights: RewardWeights,
    /// Reduction percentage at which each objective switches from linear to sqrt growth.
    pub co2_threshold_pct: f64,
    pub health_threshold_pct: f64,
    pub sustainability_threshold_pct: f64,
    pub default_alignment: f64,
    pub balanced_budget_fraction: f64,
    pub overspend_fraction: f64,
    pub overspend_penalty: f64,
    pub safe_aqi: f64,
    pub safe_co2: f64,
    pub diversity_modulus: u64,
    pub diversity_penalty: f64,
    /// Checked in order; the first tier whose threshold is exceeded applies.
    pub urgency: Vec<UrgencyTier>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            weights: RewardWeights::default(),
            co2_threshold_pct: 30.0,
            health_threshold_pct: 25.0,
            sustainability_threshold_pct: 10.0,
            default_alignment: 0.5,
            balanced_budget_fraction: 0.2,
            overspend_fraction: 0.25,
            overspend_penalty: 0.5,
            safe_aqi: 120.0,
            safe_co2: 460.0,
            diversity_modulus: 5,
            diversity_penalty: 0.1,
            urgency: vec![
                UrgencyTier {
                    aqi_above: 170.0,
                    multiplier: 1.5,
                },
                UrgencyTier {
                    aqi_above: 120.0,
                    multiplier: 1.2,
                },
            ],
        }
    }
}

impl RewardConfig {
    pub fn urgency_multiplier(&self, aqi: f64) -> f64 {
        self.urgency
            .iter()
            .find(|tier| aqi > tier.aqi_above)
            .map(|tier| tier.multiplier)
            .unwrap_or(1.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AllocatorConfig {
    pub not_required_co2: f64,
    pub not_required_aqi: f64,
    pub co2_baseline: f64,
    pub co2_excess_cap: f64,
    pub co2_weight: f64,
    pub aqi_baseline: f64,
    pub aqi_excess_cap: f64,
    pub aqi_weight: f64,
    pub moderate_need: f64,
    pub high_need: f64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            not_required_co2: 400.0,
            not_required_aqi: 80.0,
            co2_baseline: 380.0,
            co2_excess_cap: 120.0,
            co2_weight: 0.5,
            aqi_baseline: 50.0,
            aqi_excess_cap: 200.0,
            aqi_weight: 0.25,
            moderate_need: 20.0,
            high_need: 50.0,
        }
    }
}

impl AllocatorConfig {
    pub fn is_not_required(&self, co2: f64, aqi: f64) -> bool {
        co2 < self.not_required_co2 && aqi < self.not_required_aqi
    }

    pub fn need_score(&self, co2: f64, aqi: f64) -> f64 {
        let co2_excess = (co2 - self.co2_baseline).max(0.0).min(self.co2_excess_cap);
        let aqi_excess = (aqi - self.aqi_baseline).max(0.0).min(self.aqi_excess_cap);
        self.co2_weight * co2_excess + self.aqi_weight * aqi_excess
    }

    pub fn need_level(&self, need: f64) -> NeedLevel {
        if need >= self.high_need {
            NeedLevel::High
        } else if need >= self.moderate_need {
            NeedLevel::Moderate
        } else {
            NeedLevel::Low
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OptimizerConfig {
    pub snapshot_hash: String,
    pub snapshot_version: u32,
    pub unconstrained_budget: f64,
    pub reward: RewardConfig,
    pub allocator: AllocatorConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            snapshot_hash: "cfg-ecozone-default".into(),
            snapshot_version: 1,
            unconstrained_budget: DEFAULT_UNCONSTRAINED_BUDGET,
            reward: RewardConfig::default(),
            allocator: AllocatorConfig::default(),
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.unconstrained_budget.is_finite() && self.unconstrained_budget > 0.0) {
            return Err(ConfigError::InvalidField("unconstrained_budget".into()));
        }
        let reward = &self.reward;
        for (field, value) in [
            ("reward.co2_threshold_pct", reward.co2_threshold_pct),
            ("reward.health_threshold_pct", reward.health_threshold_pct),
            (
                "reward.sustainability_threshold_pct",
                reward.sustainability_threshold_pct,
            ),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::InvalidField(field.into()));
            }
        }
        if reward.diversity_modulus == 0 {
            return Err(ConfigError::InvalidField("reward.diversity_modulus".into()));
        }
        if !(0.0..=1.0).contains(&reward.balanced_budget_fraction) {
            return Err(ConfigError::InvalidField(
                "reward.balanced_budget_fraction".into(),
            ));
        }
        if reward.urgency.iter().any(|tier| tier.multiplier <= 0.0) {
            return Err(ConfigError::InvalidField("reward.urgency".into()));
        }
        let allocator = &self.allocator;
        if allocator.co2_excess_cap < 0.0 || allocator.aqi_excess_cap < 0.0 {
            return Err(ConfigError::InvalidField("allocator.excess_cap".into()));
        }
        if allocator.moderate_need > allocator.high_need {
            return Err(ConfigError::InvalidField("allocator.moderate_need".into()));
        }
        Ok(())
    }

    /// Applies `ECOZONE_*` overrides from a key/value source such as `std::env::vars()`.
    /// Unknown keys are ignored; unparsable values are rejected.
    pub fn apply_env_overrides<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "ECOZONE_SNAPSHOT_HASH" => self.snapshot_hash = value,
                "ECOZONE_UNCONSTRAINED_BUDGET" => {
                    self.unconstrained_budget = parse_number(&key, &value)?;
                }
                "ECOZONE_NOT_REQUIRED_CO2" => {
                    self.allocator.not_required_co2 = parse_number(&key, &value)?;
                }
                "ECOZONE_NOT_REQUIRED_AQI" => {
                    self.allocator.not_required_aqi = parse_number(&key, &value)?;
                }
                _ => {}
            }
        }
        self.validate()
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidField(key.to_string()))
}

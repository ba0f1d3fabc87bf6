//! Advisor configuration and its validation.
//!
//! Every section is optional; missing keys fall back to the defaults
//! below. Present-but-invalid values are errors.

use crate::domain::adjustment::{default_rules, rules_from_config, AdjustmentRule};
use crate::domain::allocation::{default_universe, policy_by_name, RiskTier};
use crate::domain::error::AdvisorError;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::universe::AssetUniverse;
use crate::ports::config_port::ConfigPort;
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_POLICY: &str = "heuristic";
pub const DEFAULT_PRICE_DIR: &str = "prices";

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub annualization_factor: f64,
    pub benchmark: Option<String>,
    pub policy: String,
    pub price_dir: PathBuf,
    pub universes: HashMap<RiskTier, AssetUniverse>,
    pub rules: Vec<AdjustmentRule>,
}

impl AdvisorConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AdvisorError> {
        let annualization_factor = read_annualization_factor(config)?;
        let policy = read_policy(config)?;

        let benchmark = config
            .get_string("portfolio", "benchmark")
            .map(|b| b.trim().to_uppercase())
            .filter(|b| !b.is_empty());

        let price_dir = config
            .get_string("data", "price_dir")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PRICE_DIR));

        let mut universes = HashMap::new();
        for tier in RiskTier::ALL {
            universes.insert(tier, read_universe(config, tier)?);
        }

        let rules = rules_from_config(config)?.unwrap_or_else(default_rules);

        Ok(Self {
            annualization_factor,
            benchmark,
            policy,
            price_dir,
            universes,
            rules,
        })
    }

    pub fn universe_for(&self, tier: RiskTier) -> AssetUniverse {
        match self.universes.get(&tier) {
            Some(u) => u.clone(),
            None => builtin_universe(tier),
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            annualization_factor: TRADING_DAYS_PER_YEAR,
            benchmark: None,
            policy: DEFAULT_POLICY.to_string(),
            price_dir: PathBuf::from(DEFAULT_PRICE_DIR),
            universes: RiskTier::ALL
                .into_iter()
                .map(|t| (t, builtin_universe(t)))
                .collect(),
            rules: default_rules(),
        }
    }
}

fn builtin_universe(tier: RiskTier) -> AssetUniverse {
    AssetUniverse::from_known(default_universe(tier))
}

fn read_annualization_factor(config: &dyn ConfigPort) -> Result<f64, AdvisorError> {
    let Some(raw) = config.get_string("portfolio", "annualization_factor") else {
        return Ok(TRADING_DAYS_PER_YEAR);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(AdvisorError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "annualization_factor".to_string(),
            reason: "annualization_factor must be a positive number".to_string(),
        }),
    }
}

fn read_policy(config: &dyn ConfigPort) -> Result<String, AdvisorError> {
    let name = config
        .get_string("portfolio", "policy")
        .unwrap_or_else(|| DEFAULT_POLICY.to_string());
    match policy_by_name(&name) {
        Some(policy) => Ok(policy.name().to_string()),
        None => Err(AdvisorError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "policy".to_string(),
            reason: format!("unknown allocation policy '{}'", name.trim()),
        }),
    }
}

fn read_universe(config: &dyn ConfigPort, tier: RiskTier) -> Result<AssetUniverse, AdvisorError> {
    match config.get_string("universe", tier.as_str()) {
        None => Ok(builtin_universe(tier)),
        Some(raw) => AssetUniverse::parse(&raw).map_err(|e| AdvisorError::ConfigInvalid {
            section: "universe".to_string(),
            key: tier.as_str().to_string(),
            reason: e.to_string(),
        }),
    }
}

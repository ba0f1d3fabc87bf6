//! Target-weight allocation by risk tier.
//!
//! An [`AllocationPolicy`] proposes raw weights for a tier and a number of
//! slots; [`allocate`] pads or truncates them to the universe, rejects
//! degenerate output and normalizes. Swapping the policy is the seam for
//! a real optimizer.

use crate::domain::error::AdvisorError;
use crate::domain::universe::AssetUniverse;
use crate::domain::weights::WeightVector;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RiskTier {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [
        RiskTier::Conservative,
        RiskTier::Moderate,
        RiskTier::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Conservative => "conservative",
            RiskTier::Moderate => "moderate",
            RiskTier::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(RiskTier::Conservative),
            "moderate" => Ok(RiskTier::Moderate),
            "aggressive" => Ok(RiskTier::Aggressive),
            other => Err(AdvisorError::UnknownRiskTier(other.to_string())),
        }
    }
}

/// Default symbols for a tier when the caller names none.
pub fn default_universe(tier: RiskTier) -> &'static [&'static str] {
    match tier {
        RiskTier::Conservative => &["BND", "VTI", "VEA", "VWO"],
        RiskTier::Moderate => &["VTI", "VEA", "VWO", "BND", "VNQ"],
        RiskTier::Aggressive => &["VTI", "VEA", "VWO", "VNQ", "QQQ"],
    }
}

/// Source of raw, unnormalized weights aligned to universe order.
pub trait AllocationPolicy {
    fn raw_weights(&self, tier: RiskTier, asset_count: usize) -> Vec<f64>;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> AllocationPolicy for F
where
    F: Fn(RiskTier, usize) -> Vec<f64>,
{
    fn raw_weights(&self, tier: RiskTier, asset_count: usize) -> Vec<f64> {
        self(tier, asset_count)
    }
}

const CONSERVATIVE_TABLE: [f64; 4] = [0.4, 0.3, 0.2, 0.1];
const AGGRESSIVE_TABLE: [f64; 5] = [0.40, 0.25, 0.20, 0.10, 0.05];

/// Fixed per-tier tables: conservative and aggressive front-load the
/// first slots, moderate spreads evenly.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl AllocationPolicy for HeuristicPolicy {
    fn raw_weights(&self, tier: RiskTier, asset_count: usize) -> Vec<f64> {
        match tier {
            RiskTier::Conservative => CONSERVATIVE_TABLE.to_vec(),
            RiskTier::Moderate => equal_weights(asset_count),
            RiskTier::Aggressive => AGGRESSIVE_TABLE.to_vec(),
        }
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeightPolicy;

impl AllocationPolicy for EqualWeightPolicy {
    fn raw_weights(&self, _tier: RiskTier, asset_count: usize) -> Vec<f64> {
        equal_weights(asset_count)
    }

    fn name(&self) -> &str {
        "equal_weight"
    }
}

fn equal_weights(asset_count: usize) -> Vec<f64> {
    if asset_count == 0 {
        return Vec::new();
    }
    vec![1.0 / asset_count as f64; asset_count]
}

/// Look up a shipped policy by config name.
pub fn policy_by_name(name: &str) -> Option<Box<dyn AllocationPolicy + Send + Sync>> {
    match name.trim().to_lowercase().as_str() {
        "heuristic" => Some(Box::new(HeuristicPolicy)),
        "equal_weight" | "equal" => Some(Box::new(EqualWeightPolicy)),
        _ => None,
    }
}

/// Normalized weights for `universe` under `policy`.
pub fn allocate(
    tier: RiskTier,
    universe: &AssetUniverse,
    policy: &dyn AllocationPolicy,
) -> Result<WeightVector, AdvisorError> {
    if universe.is_empty() {
        return Err(AdvisorError::EmptyUniverse);
    }

    let mut raw = policy.raw_weights(tier, universe.len());
    raw.resize(universe.len(), 0.0);

    debug!(policy = policy.name(), %tier, assets = universe.len(), "allocating");

    let total: f64 = raw.iter().map(|w| w.max(0.0)).sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(AdvisorError::DegenerateWeight {
            reason: format!(
                "policy '{}' produced no positive weight for {} assets at tier {}",
                policy.name(),
                universe.len(),
                tier
            ),
        });
    }

    WeightVector::from_pairs(universe.iter().cloned().zip(raw)).normalized()
}

/// [`allocate`] over a plain symbol list, validating it as a universe first.
pub fn allocate_symbols<S: AsRef<str>>(
    tier: RiskTier,
    symbols: &[S],
    policy: &dyn AllocationPolicy,
) -> Result<WeightVector, AdvisorError> {
    let universe = AssetUniverse::new(symbols.iter().map(|s| s.as_ref()))?;
    allocate(tier, &universe, policy)
}

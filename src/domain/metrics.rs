//! Portfolio-level risk and return statistics.

use super::returns::ReturnSeries;
use super::weights::WeightVector;
use crate::domain::error::AdvisorError;

/// Volatility at or below this is treated as zero for ratio purposes.
pub const VOLATILITY_EPSILON: f64 = 1e-12;

/// Daily data convention.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioStats {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

impl PortfolioStats {
    /// Annualized expected return, volatility and Sharpe ratio of
    /// `weights` held against `returns`.
    ///
    /// The Sharpe ratio is reported as 0 when volatility is effectively
    /// zero. That is a convention, not a measurement: the ratio is
    /// undefined there.
    pub fn compute(
        weights: &WeightVector,
        returns: &ReturnSeries,
        annualization_factor: f64,
    ) -> Result<Self, AdvisorError> {
        let w = weights.aligned_to(returns.symbols())?;

        let means = returns.mean(annualization_factor);
        let expected_return = dot(&means, &w);

        let cov = returns.covariance(annualization_factor);
        let variance: f64 = cov
            .iter()
            .zip(&w)
            .map(|(row, wi)| wi * dot(row, &w))
            .sum();
        if !expected_return.is_finite() || !variance.is_finite() {
            return Err(AdvisorError::DegenerateWeight {
                reason: format!(
                    "portfolio moments are not finite (return {expected_return}, variance {variance})"
                ),
            });
        }
        let volatility = variance.max(0.0).sqrt();

        Ok(PortfolioStats {
            expected_return,
            volatility,
            sharpe_ratio: guarded_ratio(expected_return, volatility),
        })
    }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `numerator / volatility`, or exactly 0 when volatility is not
/// meaningfully positive.
pub(crate) fn guarded_ratio(numerator: f64, volatility: f64) -> f64 {
    if volatility > VOLATILITY_EPSILON {
        numerator / volatility
    } else {
        0.0
    }
}

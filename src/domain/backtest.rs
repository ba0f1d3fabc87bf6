//! Historical replay of a fixed weight vector.
//!
//! Weights are held constant every period (continuous rebalancing);
//! there are no trades, fees or cash.

use super::metrics::{dot, guarded_ratio};
use super::returns::ReturnSeries;
use super::weights::WeightVector;
use crate::domain::error::AdvisorError;
use chrono::NaiveDate;

/// Fewest return periods for which a CAGR is reported.
pub const MIN_BACKTEST_PERIODS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestResult {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub periods: usize,
    pub total_return: f64,
    pub cagr: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub cumulative_value_series: Vec<f64>,
    pub benchmark_return: Option<f64>,
}

/// Parameters for [`run_backtest_with`].
#[derive(Debug, Clone)]
pub struct BacktestRequest<'a> {
    pub weights: &'a WeightVector,
    pub annualization_factor: f64,
    pub benchmark: Option<&'a str>,
}

/// Replay `weights` over `returns`.
pub fn run_backtest(
    weights: &WeightVector,
    returns: &ReturnSeries,
    annualization_factor: f64,
) -> Result<BacktestResult, AdvisorError> {
    run_backtest_with(
        &BacktestRequest {
            weights,
            annualization_factor,
            benchmark: None,
        },
        returns,
    )
}

pub fn run_backtest_with(
    request: &BacktestRequest<'_>,
    returns: &ReturnSeries,
) -> Result<BacktestResult, AdvisorError> {
    let periods = returns.periods();
    if periods < MIN_BACKTEST_PERIODS {
        return Err(AdvisorError::InsufficientHistory {
            periods,
            minimum: MIN_BACKTEST_PERIODS,
        });
    }

    let w = request.weights.aligned_to(returns.symbols())?;
    let af = request.annualization_factor;

    let portfolio_returns: Vec<f64> = returns.rows().iter().map(|row| dot(row, &w)).collect();
    if let Some(t) = portfolio_returns.iter().position(|r| !r.is_finite()) {
        return Err(AdvisorError::DegenerateWeight {
            reason: format!("portfolio return for period {t} is not finite"),
        });
    }
    let cumulative_value_series = compound(&portfolio_returns);

    let last = cumulative_value_series.last().copied().unwrap_or(1.0);
    let total_return = last - 1.0;
    let cagr = last.powf(af / periods as f64) - 1.0;
    let volatility = sample_stddev(&portfolio_returns) * af.sqrt();

    let benchmark_return = request
        .benchmark
        .and_then(|symbol| returns.column(symbol))
        .map(|column| compound(&column).last().copied().unwrap_or(1.0) - 1.0);

    Ok(BacktestResult {
        period_start: returns.dates().first().copied(),
        period_end: returns.dates().last().copied(),
        periods,
        total_return,
        cagr,
        volatility,
        sharpe_ratio: guarded_ratio(cagr, volatility),
        max_drawdown: max_drawdown(&cumulative_value_series),
        cumulative_value_series,
        benchmark_return,
    })
}

/// Running product of (1 + r), one value per period.
fn compound(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0_f64, |value, r| {
            *value *= 1.0 + r;
            Some(*value)
        })
        .collect()
}

fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Most negative `(value - peak) / peak`, with the peak taken over all
/// values up to and including the current one. Returns 0 for an empty or
/// non-decreasing series, and NaN when any value is not finite.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    if values.iter().any(|v| !v.is_finite()) {
        return f64::NAN;
    }

    let mut peak = first;
    let mut worst = 0.0_f64;
    for &value in values {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < worst {
                worst = dd;
            }
        }
    }
    worst
}

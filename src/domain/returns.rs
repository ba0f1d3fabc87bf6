//! Periodic return series, mean and covariance.

use crate::domain::error::AdvisorError;
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;
use tracing::debug;

/// Aligned periodic fractional returns for a set of assets.
///
/// `rows[t][i]` is the return of `symbols[i]` over period `t`. All assets
/// share the same periods; `dates[t]` is the closing date of period `t`
/// (empty when the series was built from raw columns).
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
}

impl ReturnSeries {
    /// Derive simple returns from a price table.
    pub fn build(prices: &PriceTable) -> Result<Self, AdvisorError> {
        let aligned = prices.align()?;

        let dates = aligned.dates[1..].to_vec();
        let rows = aligned
            .rows
            .windows(2)
            .map(|pair| {
                pair[0]
                    .iter()
                    .zip(&pair[1])
                    .map(|(prev, curr)| (curr - prev) / prev)
                    .collect()
            })
            .collect();

        Self::finite_only(aligned.symbols, dates, rows)
    }

    /// Build from per-asset return columns of equal length.
    ///
    /// Periods where any asset's return is not finite are dropped, as in
    /// [`ReturnSeries::build`].
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self, AdvisorError> {
        if columns.is_empty() {
            return Err(AdvisorError::EmptyUniverse);
        }
        let (symbols, columns): (Vec<String>, Vec<Vec<f64>>) =
            columns
                .into_iter()
                .map(|(s, c)| (Into::<String>::into(s).trim().to_uppercase(), c))
                .unzip();

        let periods = columns[0].len();
        if periods == 0 {
            return Err(AdvisorError::InsufficientData {
                symbol: symbols[0].clone(),
                points: 0,
                minimum: 1,
            });
        }
        if columns.iter().any(|c| c.len() != periods) {
            return Err(AdvisorError::MisalignedData {
                symbols,
                common_dates: 0,
            });
        }

        let rows = (0..periods)
            .map(|t| columns.iter().map(|c| c[t]).collect())
            .collect();

        Self::finite_only(symbols, Vec::new(), rows)
    }

    /// Keep the rows whose returns are all finite. `dates` is either
    /// empty or parallel to `rows`.
    ///
    /// Fails with `InsufficientData` naming the first asset with a
    /// non-finite return when nothing survives.
    fn finite_only(
        symbols: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, AdvisorError> {
        let dated = !dates.is_empty();
        let mut kept_dates = Vec::with_capacity(dates.len());
        let mut kept_rows = Vec::with_capacity(rows.len());
        let mut culprit: Option<usize> = None;

        for (t, row) in rows.into_iter().enumerate() {
            match row.iter().position(|r| !r.is_finite()) {
                None => {
                    if dated {
                        kept_dates.push(dates[t]);
                    }
                    kept_rows.push(row);
                }
                Some(i) => {
                    culprit.get_or_insert(i);
                }
            }
        }

        if let Some(i) = culprit {
            debug!(
                first = %symbols[i],
                kept = kept_rows.len(),
                "dropped return rows with non-finite values"
            );
        }

        if kept_rows.is_empty() {
            return Err(AdvisorError::InsufficientData {
                symbol: symbols[culprit.unwrap_or(0)].clone(),
                points: 0,
                minimum: 1,
            });
        }

        Ok(Self {
            symbols,
            dates: kept_dates,
            rows: kept_rows,
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of return periods.
    pub fn periods(&self) -> usize {
        self.rows.len()
    }

    pub fn asset_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn column(&self, symbol: &str) -> Option<Vec<f64>> {
        let symbol = symbol.trim();
        let idx = self.symbols.iter().position(|s| s.eq_ignore_ascii_case(symbol))?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Mean return per asset, scaled by `annualization_factor`.
    pub fn mean(&self, annualization_factor: f64) -> Vec<f64> {
        let n = self.rows.len() as f64;
        (0..self.symbols.len())
            .map(|i| {
                let total: f64 = self.rows.iter().map(|row| row[i]).sum();
                total / n * annualization_factor
            })
            .collect()
    }

    /// Sample covariance matrix (n - 1 denominator), scaled by
    /// `annualization_factor`. A single period yields all zeros.
    pub fn covariance(&self, annualization_factor: f64) -> Vec<Vec<f64>> {
        let k = self.symbols.len();
        let n = self.rows.len();
        let means = self.mean(1.0);
        let mut cov = vec![vec![0.0; k]; k];
        if n < 2 {
            return cov;
        }

        let denom = (n - 1) as f64;
        for i in 0..k {
            for j in i..k {
                let s: f64 = self
                    .rows
                    .iter()
                    .map(|row| (row[i] - means[i]) * (row[j] - means[j]))
                    .sum();
                let value = s / denom * annualization_factor;
                cov[i][j] = value;
                cov[j][i] = value;
            }
        }
        cov
    }
}

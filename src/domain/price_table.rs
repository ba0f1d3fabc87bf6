//! Price tables and common-date alignment.

use crate::domain::error::AdvisorError;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Minimum finite price points an asset needs to yield one return.
pub const MIN_PRICE_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetPrices {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl AssetPrices {
    pub fn finite_count(&self) -> usize {
        self.points.iter().filter(|p| p.price.is_finite()).count()
    }
}

/// Per-asset price history, in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceTable {
    assets: Vec<AssetPrices>,
}

/// Prices on the dates every asset shares.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPrices {
    pub symbols: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// `rows[t][i]` is the price of `symbols[i]` on `dates[t]`.
    pub rows: Vec<Vec<f64>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an asset's history. Points are sorted by date.
    pub fn insert(&mut self, symbol: impl Into<String>, mut points: Vec<PricePoint>) {
        let symbol = symbol.into();
        points.sort_by_key(|p| p.date);
        match self.assets.iter_mut().find(|a| a.symbol == symbol) {
            Some(existing) => existing.points = points,
            None => self.assets.push(AssetPrices { symbol, points }),
        }
    }

    pub fn with_series(mut self, symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        self.insert(symbol, points);
        self
    }

    pub fn get(&self, symbol: &str) -> Option<&[PricePoint]> {
        self.assets
            .iter()
            .find(|a| a.symbol == symbol)
            .map(|a| a.points.as_slice())
    }

    pub fn symbols(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.symbol.clone()).collect()
    }

    pub fn assets(&self) -> &[AssetPrices] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Keep only the dates on which every asset has a finite price.
    ///
    /// Fails with `InsufficientData` when an asset has fewer than
    /// [`MIN_PRICE_POINTS`] finite prices, and with `MisalignedData`
    /// when the surviving common index is shorter than that.
    pub fn align(&self) -> Result<AlignedPrices, AdvisorError> {
        if self.assets.is_empty() {
            return Err(AdvisorError::EmptyUniverse);
        }

        for asset in &self.assets {
            let points = asset.finite_count();
            if points < MIN_PRICE_POINTS {
                return Err(AdvisorError::InsufficientData {
                    symbol: asset.symbol.clone(),
                    points,
                    minimum: MIN_PRICE_POINTS,
                });
            }
        }

        let lookups: Vec<HashMap<NaiveDate, f64>> = self
            .assets
            .iter()
            .map(|a| {
                a.points
                    .iter()
                    .filter(|p| p.price.is_finite())
                    .map(|p| (p.date, p.price))
                    .collect()
            })
            .collect();

        let timeline: BTreeSet<NaiveDate> = self
            .assets
            .iter()
            .flat_map(|a| a.points.iter().map(|p| p.date))
            .collect();

        let mut dates = Vec::with_capacity(timeline.len());
        let mut rows = Vec::with_capacity(timeline.len());
        for date in &timeline {
            let row: Option<Vec<f64>> = lookups.iter().map(|l| l.get(date).copied()).collect();
            if let Some(row) = row {
                dates.push(*date);
                rows.push(row);
            }
        }

        let dropped = timeline.len() - dates.len();
        if dropped > 0 {
            debug!(dropped, kept = dates.len(), "dropped price rows with missing values");
        }

        if dates.len() < MIN_PRICE_POINTS {
            return Err(AdvisorError::MisalignedData {
                symbols: self.symbols(),
                common_dates: dates.len(),
            });
        }

        Ok(AlignedPrices {
            symbols: self.symbols(),
            dates,
            rows,
        })
    }
}

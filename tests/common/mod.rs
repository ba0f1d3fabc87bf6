#![allow(dead_code)]

use chrono::NaiveDate;
use folioadvisor::domain::error::AdvisorError;
use folioadvisor::domain::price_table::{PricePoint, PriceTable};
use folioadvisor::domain::universe::AssetUniverse;
use folioadvisor::ports::price_port::PricePort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<(Vec<String>, NaiveDate, NaiveDate)>>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_prices(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(
        &self,
        universe: &AssetUniverse,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, AdvisorError> {
        self.calls
            .borrow_mut()
            .push((universe.symbols().to_vec(), start_date, end_date));

        let mut table = PriceTable::new();
        for symbol in universe.iter() {
            if let Some(reason) = self.errors.get(symbol) {
                return Err(AdvisorError::DataProvider {
                    reason: reason.clone(),
                });
            }
            let points = self
                .data
                .get(symbol)
                .map(|pts| {
                    pts.iter()
                        .filter(|p| p.date >= start_date && p.date <= end_date)
                        .copied()
                        .collect()
                })
                .unwrap_or_default();
            table.insert(symbol.clone(), points);
        }
        Ok(table)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily points from `start`, one per price.
pub fn series(start: &str, prices: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint::new(start + chrono::Duration::days(i as i64), p))
        .collect()
}

/// Prices compounding a fixed list of returns from 100.
pub fn prices_from_returns(returns: &[f64]) -> Vec<f64> {
    let mut out = vec![100.0];
    for r in returns {
        let last = *out.last().unwrap();
        out.push(last * (1.0 + r));
    }
    out
}

/// Deterministic wavy price path, distinct per `seed`.
pub fn generate_prices(seed: u32, count: usize, start_price: f64) -> Vec<f64> {
    let phase = seed as f64 * 0.7;
    (0..count)
        .map(|i| {
            let t = i as f64;
            start_price * (1.0 + 0.002 * t + 0.03 * (t * 0.9 + phase).sin())
        })
        .collect()
}

/// Mock port with `count` daily prices for each symbol from 2024-01-01.
pub fn port_with_symbols(symbols: &[&str], count: usize) -> MockPricePort {
    symbols
        .iter()
        .enumerate()
        .fold(MockPricePort::new(), |port, (i, s)| {
            port.with_prices(
                s,
                series("2024-01-01", &generate_prices(i as u32, count, 50.0 + 10.0 * i as f64)),
            )
        })
}

/// Two assets: A swings +1% then -1%, B stays flat.
pub fn two_asset_scenario() -> MockPricePort {
    MockPricePort::new()
        .with_prices("A", series("2024-01-01", &prices_from_returns(&[0.01, -0.01])))
        .with_prices("B", series("2024-01-01", &[50.0, 50.0, 50.0]))
}

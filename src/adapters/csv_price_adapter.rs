//! CSV file price adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with a header row. The
//! `date` column is `YYYY-MM-DD`; the price is taken from `adj_close`
//! when present, else `close`. Blank or `NaN` cells become NaN and are
//! left for alignment to drop.

use crate::domain::error::AdvisorError;
use crate::domain::price_table::{PricePoint, PriceTable};
use crate::domain::universe::AssetUniverse;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_symbol(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, AdvisorError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| AdvisorError::DataProvider {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| AdvisorError::DataProvider {
                reason: format!("{}: CSV header error: {}", path.display(), e),
            })?
            .clone();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let date_col = column("date").ok_or_else(|| AdvisorError::DataProvider {
            reason: format!("{}: missing date column", path.display()),
        })?;
        let price_col = column("adj_close")
            .or_else(|| column("close"))
            .ok_or_else(|| AdvisorError::DataProvider {
                reason: format!("{}: missing close column", path.display()),
            })?;

        let mut points = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| AdvisorError::DataProvider {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                AdvisorError::DataProvider {
                    reason: format!("{}: invalid date '{}': {}", path.display(), date_str, e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let cell = record.get(price_col).unwrap_or_default().trim();
            let price = if cell.is_empty() {
                f64::NAN
            } else {
                match cell.parse::<f64>() {
                    Ok(p) => p,
                    Err(_) => {
                        warn!(symbol, row = line + 2, value = cell, "unparseable price, treating as missing");
                        f64::NAN
                    }
                }
            };

            points.push(PricePoint::new(date, price));
        }

        debug!(symbol, points = points.len(), "loaded prices");
        Ok(points)
    }
}

impl PricePort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        universe: &AssetUniverse,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, AdvisorError> {
        let mut table = PriceTable::new();
        for symbol in universe.iter() {
            let points = self.read_symbol(symbol, start_date, end_date)?;
            table.insert(symbol.clone(), points);
        }
        Ok(table)
    }
}

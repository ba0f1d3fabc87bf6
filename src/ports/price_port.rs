//! Price data port trait.

use crate::domain::error::AdvisorError;
use crate::domain::price_table::PriceTable;
use crate::domain::universe::AssetUniverse;
use chrono::NaiveDate;

/// Source of already-fetched historical prices.
///
/// Implementations report their own failures as
/// `AdvisorError::DataProvider`; the core passes them through untouched.
pub trait PricePort {
    fn fetch_prices(
        &self,
        universe: &AssetUniverse,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, AdvisorError>;
}

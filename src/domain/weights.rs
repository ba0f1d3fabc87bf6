//! Weight vectors: ordered symbol → fraction-of-portfolio mappings.

use crate::domain::error::AdvisorError;
use std::collections::HashSet;
use std::fmt;

/// Tolerance for the sum-to-one invariant.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Ordered mapping from asset symbol to weight.
///
/// Order is the order symbols were first inserted, so every operation
/// over a vector is deterministic. A vector returned by [`normalized`]
/// sums to 1.0 within [`WEIGHT_SUM_TOLERANCE`] and has no negative entry.
///
/// [`normalized`]: WeightVector::normalized
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightVector {
    entries: Vec<(String, f64)>,
}

impl WeightVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw pairs without normalizing. A repeated symbol
    /// overwrites the earlier weight but keeps its position.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut wv = Self::new();
        for (symbol, weight) in pairs {
            wv.set(symbol, weight);
        }
        wv
    }

    /// Parse `"VTI=0.6, QQQ=0.4"`. Symbols are upper-cased.
    pub fn parse(input: &str) -> Result<Self, AdvisorError> {
        let mut wv = Self::new();
        for token in input.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(AdvisorError::InvalidWeight {
                    reason: "empty entry".into(),
                });
            }
            let (symbol, value) =
                token
                    .split_once('=')
                    .ok_or_else(|| AdvisorError::InvalidWeight {
                        reason: format!("expected SYMBOL=weight, got '{token}'"),
                    })?;
            let symbol = symbol.trim().to_uppercase();
            if symbol.is_empty() {
                return Err(AdvisorError::InvalidWeight {
                    reason: format!("missing symbol in '{token}'"),
                });
            }
            let weight: f64 = value
                .trim()
                .parse()
                .map_err(|e| AdvisorError::InvalidWeight {
                    reason: format!("bad weight for {symbol}: {e}"),
                })?;
            if !weight.is_finite() {
                return Err(AdvisorError::InvalidWeight {
                    reason: format!("weight for {symbol} is not finite"),
                });
            }
            if wv.get(&symbol).is_some() {
                return Err(AdvisorError::DuplicateSymbol(symbol));
            }
            wv.set(symbol, weight);
        }
        Ok(wv)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        let symbol = symbol.trim();
        self.entries
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
            .map(|&(_, w)| w)
    }

    /// Insert or overwrite a weight, keeping first-insertion order.
    /// Symbols are trimmed and upper-cased.
    pub fn set(&mut self, symbol: impl Into<String>, weight: f64) {
        let symbol: String = symbol.into();
        let symbol = symbol.trim().to_uppercase();
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((symbol, weight)),
        }
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(s, w)| (s.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
            && self.entries.iter().all(|&(_, w)| w >= 0.0)
    }

    /// Clamp negatives to zero, then divide by the new sum.
    pub fn normalized(mut self) -> Result<Self, AdvisorError> {
        for entry in &mut self.entries {
            if entry.1 < 0.0 {
                entry.1 = 0.0;
            }
        }
        let total = self.sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(AdvisorError::DegenerateWeight {
                reason: format!("weight sum is {total} after clamping, cannot normalize"),
            });
        }
        for entry in &mut self.entries {
            entry.1 /= total;
        }
        Ok(self)
    }

    /// Weights re-ordered to `symbols`.
    ///
    /// Fails when the two sides do not name exactly the same asset set.
    pub fn aligned_to(&self, symbols: &[String]) -> Result<Vec<f64>, AdvisorError> {
        let ours: HashSet<&str> = self.symbols().collect();
        let theirs: HashSet<&str> = symbols.iter().map(String::as_str).collect();
        if ours != theirs || self.len() != symbols.len() {
            return Err(AdvisorError::DimensionMismatch {
                weights: self.symbols().map(str::to_string).collect(),
                series: symbols.to_vec(),
            });
        }
        Ok(symbols
            .iter()
            .map(|s| self.get(s).unwrap_or(0.0))
            .collect())
    }
}

impl fmt::Display for WeightVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(s, w)| format!("{s}={w:.4}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

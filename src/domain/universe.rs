//! Asset universe: the ordered, duplicate-free list of candidate symbols.

use crate::domain::error::AdvisorError;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetUniverse {
    symbols: Vec<String>,
}

impl AssetUniverse {
    /// Build a universe from already-split symbols.
    ///
    /// Symbols are trimmed and upper-cased. Order is preserved.
    pub fn new<I, S>(symbols: I) -> Result<Self, AdvisorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        let mut seen = HashSet::new();

        for raw in symbols {
            let trimmed = raw.as_ref().trim();
            if trimmed.is_empty() {
                return Err(AdvisorError::EmptySymbol);
            }
            let symbol = trimmed.to_uppercase();
            if !seen.insert(symbol.clone()) {
                return Err(AdvisorError::DuplicateSymbol(symbol));
            }
            out.push(symbol);
        }

        if out.is_empty() {
            return Err(AdvisorError::EmptyUniverse);
        }

        Ok(Self { symbols: out })
    }

    /// Parse a comma-separated symbol list such as `"VTI, bnd,QQQ"`.
    pub fn parse(input: &str) -> Result<Self, AdvisorError> {
        if input.trim().is_empty() {
            return Err(AdvisorError::EmptyUniverse);
        }
        Self::new(input.split(','))
    }

    /// Built-in lists that are already upper-case, non-empty and unique.
    pub(crate) fn from_known(symbols: &[&str]) -> Self {
        Self {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.symbols.iter()
    }
}

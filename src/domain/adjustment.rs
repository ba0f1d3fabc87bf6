//! Keyword-triggered reallocation rules.
//!
//! A rule fires when every one of its trigger keywords occurs in the
//! instruction text (case-insensitive substring match). Rules apply in
//! slice order to a working copy of the weights, which is then clamped
//! and renormalized.

use crate::domain::error::AdvisorError;
use crate::domain::weights::WeightVector;
use crate::ports::config_port::ConfigPort;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Delta {
    /// Add to the current weight; absent symbols start at 0.
    Add(f64),
    /// Multiply the current weight; absent symbols are left absent.
    Scale(f64),
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delta::Add(d) if *d < 0.0 => write!(f, "{d}"),
            Delta::Add(d) => write!(f, "+{d}"),
            Delta::Scale(m) => write!(f, "*{m}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdjustmentRule {
    pub name: String,
    /// Stored lower-cased.
    pub triggers: Vec<String>,
    pub deltas: Vec<(String, Delta)>,
}

impl AdjustmentRule {
    pub fn new<T, D, S>(name: impl Into<String>, triggers: T, deltas: D) -> Self
    where
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
        D: IntoIterator<Item = (S, Delta)>,
    {
        Self {
            name: name.into(),
            triggers: triggers
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            deltas: deltas
                .into_iter()
                .map(|(s, d)| (s.as_ref().trim().to_uppercase(), d))
                .collect(),
        }
    }

    /// True when every trigger occurs in `instruction`. A rule without
    /// triggers never fires.
    pub fn matches(&self, instruction: &str) -> bool {
        if self.triggers.is_empty() {
            return false;
        }
        let text = instruction.to_lowercase();
        self.triggers.iter().all(|t| text.contains(t.as_str()))
    }

    fn apply(&self, weights: &mut WeightVector) {
        for (symbol, delta) in &self.deltas {
            match (*delta, weights.get(symbol)) {
                (Delta::Add(d), current) => weights.set(symbol.clone(), current.unwrap_or(0.0) + d),
                (Delta::Scale(m), Some(current)) => weights.set(symbol.clone(), current * m),
                (Delta::Scale(_), None) => {}
            }
        }
    }
}

/// Apply every matching rule in order, then clamp and renormalize.
pub fn adjust_portfolio(
    weights: &WeightVector,
    rules: &[AdjustmentRule],
    instruction: &str,
) -> Result<WeightVector, AdvisorError> {
    let mut working = weights.clone();
    for rule in rules {
        if rule.matches(instruction) {
            debug!(rule = %rule.name, "adjustment rule fired");
            rule.apply(&mut working);
        }
    }
    working.normalized()
}

const TECH_SYMBOLS: [&str; 5] = ["QQQ", "VGT", "AAPL", "MSFT", "GOOGL"];
const BOND_SYMBOLS: [&str; 3] = ["BND", "AGG", "TLT"];

/// Built-in tilts: raise tech by 20% on "increase ... tech", cut bonds
/// by 20% on "reduce ... bond".
pub fn default_rules() -> Vec<AdjustmentRule> {
    vec![
        AdjustmentRule::new(
            "tech_tilt",
            ["increase", "tech"],
            TECH_SYMBOLS.map(|s| (s, Delta::Scale(1.2))),
        ),
        AdjustmentRule::new(
            "bond_trim",
            ["reduce", "bond"],
            BOND_SYMBOLS.map(|s| (s, Delta::Scale(0.8))),
        ),
    ]
}

/// Parse a rule from text.
///
/// `triggers` is a comma list of keywords; `deltas` a comma list of
/// `SYM*factor`, `SYM+amount` or `SYM-amount`.
pub fn parse_rule(name: &str, triggers: &str, deltas: &str) -> Result<AdjustmentRule, AdvisorError> {
    let invalid = |reason: String| AdvisorError::RuleInvalid {
        rule: name.to_string(),
        reason,
    };

    let trigger_list: Vec<&str> = triggers
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if trigger_list.is_empty() {
        return Err(invalid("no trigger keywords".into()));
    }

    let mut delta_list = Vec::new();
    for token in deltas.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !token.contains(['*', '+', '-']) {
            return Err(invalid(format!("'{token}' has no operator (*, + or -)")));
        }
        // Symbols may contain '-' (BRK-B), so take the first operator that
        // leaves a symbol before it and a number after it.
        let (symbol, op, amount) = token
            .char_indices()
            .filter(|&(_, c)| matches!(c, '*' | '+' | '-'))
            .find_map(|(pos, op)| {
                let symbol = token[..pos].trim();
                let amount: f64 = token[pos + 1..].trim().parse().ok()?;
                (!symbol.is_empty()).then_some((symbol, op, amount))
            })
            .ok_or_else(|| {
                invalid(format!(
                    "'{token}' is not SYM*factor, SYM+amount or SYM-amount"
                ))
            })?;
        if !amount.is_finite() {
            return Err(invalid(format!("'{token}': amount is not finite")));
        }
        let delta = match op {
            '*' => Delta::Scale(amount),
            '+' => Delta::Add(amount),
            _ => Delta::Add(-amount),
        };
        delta_list.push((symbol, delta));
    }
    if delta_list.is_empty() {
        return Err(invalid("no deltas".into()));
    }

    Ok(AdjustmentRule::new(name, trigger_list, delta_list))
}

/// Rules named in `[adjustments] order`, each read from `[rule.<name>]`.
///
/// Returns `None` when the config declares no rule order, so callers can
/// fall back to [`default_rules`].
pub fn rules_from_config(config: &dyn ConfigPort) -> Result<Option<Vec<AdjustmentRule>>, AdvisorError> {
    let Some(order) = config.get_string("adjustments", "order") else {
        return Ok(None);
    };

    let mut rules = Vec::new();
    for name in order.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let section = format!("rule.{}", name.to_lowercase());
        let triggers = config
            .get_string(&section, "triggers")
            .ok_or_else(|| AdvisorError::ConfigMissing {
                section: section.clone(),
                key: "triggers".into(),
            })?;
        let deltas = config
            .get_string(&section, "deltas")
            .ok_or_else(|| AdvisorError::ConfigMissing {
                section: section.clone(),
                key: "deltas".into(),
            })?;
        rules.push(parse_rule(name, &triggers, &deltas)?);
    }
    Ok(Some(rules))
}

//! Client investment profiles.

use crate::domain::allocation::RiskTier;
use crate::domain::error::AdvisorError;

pub const MIN_CLIENT_AGE: u32 = 18;
pub const MAX_CLIENT_AGE: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientProfile {
    pub name: String,
    pub age: u32,
    pub risk_tolerance: RiskTier,
    /// Years.
    pub investment_horizon: u32,
    pub capital: f64,
    pub esg_preference: bool,
    pub sector_preferences: Vec<String>,
}

impl ClientProfile {
    pub fn new(name: impl Into<String>, age: u32, risk_tolerance: RiskTier) -> Self {
        Self {
            name: name.into(),
            age,
            risk_tolerance,
            investment_horizon: 1,
            capital: 0.0,
            esg_preference: false,
            sector_preferences: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), AdvisorError> {
        if self.name.trim().is_empty() {
            return Err(AdvisorError::ProfileInvalid {
                reason: "name must not be empty".into(),
            });
        }
        if !(MIN_CLIENT_AGE..=MAX_CLIENT_AGE).contains(&self.age) {
            return Err(AdvisorError::ProfileInvalid {
                reason: format!(
                    "age {} outside {}..={}",
                    self.age, MIN_CLIENT_AGE, MAX_CLIENT_AGE
                ),
            });
        }
        if self.investment_horizon < 1 {
            return Err(AdvisorError::ProfileInvalid {
                reason: "investment_horizon must be at least 1 year".into(),
            });
        }
        if !self.capital.is_finite() || self.capital < 0.0 {
            return Err(AdvisorError::ProfileInvalid {
                reason: "capital must be a non-negative amount".into(),
            });
        }
        Ok(())
    }
}

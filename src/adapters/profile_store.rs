//! Client profile repositories.
//!
//! [`InMemoryProfileStore`] is the read-write store used by tests and
//! embedding callers. [`ConfigProfileStore`] reads `[profile.<name>]`
//! sections from a [`ConfigPort`] and refuses writes.

use crate::domain::allocation::RiskTier;
use crate::domain::error::AdvisorError;
use crate::domain::profile::ClientProfile;
use crate::ports::config_port::ConfigPort;
use crate::ports::profile_port::ProfileRepository;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, ClientProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileRepository for InMemoryProfileStore {
    fn get_profile(&self, name: &str) -> Result<ClientProfile, AdvisorError> {
        let profiles = self.profiles.read().map_err(|_| AdvisorError::DataProvider {
            reason: "profile store lock poisoned".into(),
        })?;
        profiles
            .get(name)
            .cloned()
            .ok_or_else(|| AdvisorError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    fn save_profile(&self, profile: ClientProfile) -> Result<(), AdvisorError> {
        profile.validate()?;
        let mut profiles = self.profiles.write().map_err(|_| AdvisorError::DataProvider {
            reason: "profile store lock poisoned".into(),
        })?;
        debug!(name = %profile.name, "saving profile");
        profiles.insert(profile.name.clone(), profile);
        Ok(())
    }
}

pub struct ConfigProfileStore<'a> {
    config: &'a dyn ConfigPort,
}

impl<'a> ConfigProfileStore<'a> {
    pub fn new(config: &'a dyn ConfigPort) -> Self {
        Self { config }
    }

    fn section(name: &str) -> String {
        format!("profile.{}", name.trim().to_lowercase())
    }

    fn required(&self, section: &str, key: &str) -> Result<String, AdvisorError> {
        self.config
            .get_string(section, key)
            .ok_or_else(|| AdvisorError::ConfigMissing {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    fn parsed<T: std::str::FromStr>(
        &self,
        section: &str,
        key: &str,
        default: Option<T>,
    ) -> Result<T, AdvisorError> {
        match self.config.get_string(section, key) {
            Some(raw) => raw.trim().parse().map_err(|_| AdvisorError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("cannot parse '{}'", raw.trim()),
            }),
            None => default.ok_or_else(|| AdvisorError::ConfigMissing {
                section: section.to_string(),
                key: key.to_string(),
            }),
        }
    }
}

impl ProfileRepository for ConfigProfileStore<'_> {
    fn get_profile(&self, name: &str) -> Result<ClientProfile, AdvisorError> {
        let section = Self::section(name);

        // A profile exists when its section carries an age.
        if self.config.get_string(&section, "age").is_none() {
            return Err(AdvisorError::ProfileNotFound {
                name: name.to_string(),
            });
        }

        let age: u32 = self.parsed(&section, "age", None)?;
        let tier_raw = self.required(&section, "risk_tolerance")?;
        let risk_tolerance: RiskTier =
            tier_raw
                .parse()
                .map_err(|e: AdvisorError| AdvisorError::ConfigInvalid {
                    section: section.clone(),
                    key: "risk_tolerance".into(),
                    reason: e.to_string(),
                })?;

        let profile = ClientProfile {
            name: name.trim().to_string(),
            age,
            risk_tolerance,
            investment_horizon: self.parsed(&section, "investment_horizon", Some(1))?,
            capital: self.parsed(&section, "capital", Some(0.0))?,
            esg_preference: self.config.get_bool(&section, "esg_preference", false),
            sector_preferences: self
                .config
                .get_list(&section, "sector_preferences")
                .unwrap_or_default(),
        };
        profile.validate()?;
        Ok(profile)
    }

    fn save_profile(&self, _profile: ClientProfile) -> Result<(), AdvisorError> {
        Err(AdvisorError::ProfileStoreReadOnly)
    }
}

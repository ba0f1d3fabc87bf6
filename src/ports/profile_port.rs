//! Client profile repository port trait.

use crate::domain::error::AdvisorError;
use crate::domain::profile::ClientProfile;

pub trait ProfileRepository {
    /// `AdvisorError::ProfileNotFound` when no profile has this name.
    fn get_profile(&self, name: &str) -> Result<ClientProfile, AdvisorError>;

    fn save_profile(&self, profile: ClientProfile) -> Result<(), AdvisorError>;
}

//! Port traits for the collaborators the core depends on.

pub mod config_port;
pub mod price_port;
pub mod profile_port;

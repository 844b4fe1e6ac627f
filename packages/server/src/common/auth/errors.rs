use thiserror::Error;

use super::RegistryCapability;

/// Authorization errors raised before any registry rule runs
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Missing capability: {0}")]
    CapabilityRequired(RegistryCapability),

    #[error("Account is banned")]
    Banned,
}

/// Authorization module for the registry
///
/// Provides a fluent API for capability checks in action code:
///
/// ```ignore
/// use crate::common::auth::{Actor, RegistryCapability};
///
/// Actor::new(&user)
///     .can(RegistryCapability::ReviewSubmissions)
///     .check()?;
/// ```
///
/// Role checks live here. Ownership rules (a reviewer may not resolve their
/// own mod) are registry rules and live in the approval domain.

mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::RegistryCapability;
pub use errors::AuthError;

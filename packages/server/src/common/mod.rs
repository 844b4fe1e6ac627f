// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod errors;
pub mod id;
pub mod types;
pub mod utils;

pub use auth::{Actor, AuthError, RegistryCapability};
pub use entity_ids::*;
pub use errors::{RegistryError, RegistryResult, StoreError, StoreResult};
pub use id::Id;
pub use types::*;

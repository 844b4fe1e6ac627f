use thiserror::Error;

use super::auth::AuthError;

pub type RegistryResult<T> = Result<T, RegistryError>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by every registry operation.
///
/// Messages always name the offending id or value so they can be handed
/// straight back to the caller.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Data integrity error: {0}")]
    Integrity(String),

    #[error("External source failure: {0}")]
    ExternalSource(String),

    #[error("Store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl RegistryError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<AuthError> for RegistryError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired => RegistryError::Unauthorized,
            other => RegistryError::Forbidden(other.to_string()),
        }
    }
}

/// Errors returned by a [`BaseRegistryStore`](crate::kernel::BaseRegistryStore).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    ConstraintViolation(String),

    /// A persisted row could not be decoded into its domain type.
    #[error("{0}")]
    Integrity(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::ConstraintViolation(db_err.message().to_string());
            }
        }
        StoreError::Backend(err.into())
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConstraintViolation(msg) => RegistryError::ConstraintViolation(msg),
            StoreError::Integrity(msg) => RegistryError::Integrity(msg),
            StoreError::Backend(e) => RegistryError::Store(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::auth::RegistryCapability;

    #[test]
    fn test_store_errors_keep_their_kind() {
        let err: RegistryError = StoreError::ConstraintViolation("duplicate mod".into()).into();
        assert!(matches!(err, RegistryError::ConstraintViolation(_)));

        let err: RegistryError = StoreError::Integrity("bad row".into()).into();
        assert!(matches!(err, RegistryError::Integrity(_)));
    }

    #[test]
    fn test_auth_errors_map_to_unauthorized_or_forbidden() {
        let err: RegistryError = AuthError::AuthenticationRequired.into();
        assert!(matches!(err, RegistryError::Unauthorized));

        let err: RegistryError =
            AuthError::CapabilityRequired(RegistryCapability::ImportCatalog).into();
        assert!(matches!(err, RegistryError::Forbidden(_)));
    }
}

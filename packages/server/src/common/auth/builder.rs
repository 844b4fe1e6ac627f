use super::{AuthError, RegistryCapability};
use crate::common::UserRole;
use crate::domains::users::models::User;

/// Entry point for authorization checks
///
/// Usage:
/// ```ignore
/// Actor::new(&user)
///     .can(RegistryCapability::ReviewSubmissions)
///     .check()?;
/// ```
pub struct Actor<'a> {
    user: &'a User,
}

impl<'a> Actor<'a> {
    pub fn new(user: &'a User) -> Self {
        Self { user }
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: RegistryCapability) -> CapabilityBuilder<'a> {
        CapabilityBuilder {
            user: self.user,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder<'a> {
    user: &'a User,
    capability: RegistryCapability,
}

impl CapabilityBuilder<'_> {
    /// Perform the authorization check against the user's role set
    pub fn check(self) -> Result<(), AuthError> {
        check_capability(self.user, self.capability)
    }
}

/// A banned role overrides every other role the user holds.
fn check_capability(user: &User, capability: RegistryCapability) -> Result<(), AuthError> {
    if user.has_role(UserRole::Banned) {
        return Err(AuthError::Banned);
    }

    if capability
        .granted_by()
        .iter()
        .any(|role| user.has_role(*role))
    {
        return Ok(());
    }

    tracing::debug!(user_id = %user.id, capability = %capability, "Capability check failed");
    Err(AuthError::CapabilityRequired(capability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;

    fn user_with(roles: Vec<UserRole>) -> User {
        User {
            id: UserId::new(1),
            username: "reviewer".to_string(),
            roles,
            github_id: None,
        }
    }

    #[test]
    fn test_approver_can_review() {
        let user = user_with(vec![UserRole::Approver]);
        let result = Actor::new(&user)
            .can(RegistryCapability::ReviewSubmissions)
            .check();
        assert!(result.is_ok());
    }

    #[test]
    fn test_approver_cannot_import() {
        let user = user_with(vec![UserRole::Approver]);
        let result = Actor::new(&user)
            .can(RegistryCapability::ImportCatalog)
            .check();
        assert!(matches!(
            result,
            Err(AuthError::CapabilityRequired(RegistryCapability::ImportCatalog))
        ));
    }

    #[test]
    fn test_admin_can_import_and_review() {
        let user = user_with(vec![UserRole::Admin]);
        assert!(Actor::new(&user).can(RegistryCapability::ImportCatalog).check().is_ok());
        assert!(Actor::new(&user)
            .can(RegistryCapability::ReviewSubmissions)
            .check()
            .is_ok());
    }

    #[test]
    fn test_user_without_roles_rejected() {
        let user = user_with(vec![]);
        let result = Actor::new(&user)
            .can(RegistryCapability::ReviewSubmissions)
            .check();
        assert!(matches!(result, Err(AuthError::CapabilityRequired(_))));
    }

    #[test]
    fn test_banned_overrides_admin() {
        let user = user_with(vec![UserRole::Admin, UserRole::Banned]);
        let result = Actor::new(&user)
            .can(RegistryCapability::ReviewSubmissions)
            .check();
        assert!(matches!(result, Err(AuthError::Banned)));
    }
}

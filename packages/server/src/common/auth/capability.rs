use std::fmt;

use crate::common::UserRole;

/// Capabilities gated by user roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryCapability {
    /// Resolve pending mods, mod versions and queued edits
    ReviewSubmissions,

    /// Run a bulk import from the external catalog
    ImportCatalog,
}

impl RegistryCapability {
    /// Roles that grant this capability
    pub fn granted_by(&self) -> &'static [UserRole] {
        match self {
            RegistryCapability::ReviewSubmissions => &[
                UserRole::AllPermissions,
                UserRole::Admin,
                UserRole::Approver,
            ],
            RegistryCapability::ImportCatalog => &[UserRole::AllPermissions, UserRole::Admin],
        }
    }
}

impl fmt::Display for RegistryCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryCapability::ReviewSubmissions => write!(f, "review_submissions"),
            RegistryCapability::ImportCatalog => write!(f, "import_catalog"),
        }
    }
}

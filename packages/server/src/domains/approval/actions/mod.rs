//! Approval actions - entry-point functions for reviewer operations
//!
//! Actions are self-contained: they take typed input and the acting user,
//! run capability and self-approval checks, and return final models.

pub mod edits;
pub mod merge;
pub mod visibility;

pub use edits::{
    amend_edit, amend_pending_mod, amend_pending_mod_version, resolve_edit, submit_edit,
    EditOutcome, EditPatch,
};
pub use merge::{
    validate_mod_changes, validate_mod_version_changes, ResolvedModChanges,
    ResolvedModVersionChanges,
};
pub use visibility::{
    list_pending, list_pending_edits, set_mod_version_visibility, set_mod_visibility,
    PendingSubmissions,
};

use crate::common::{ModId, ModVersionId, RegistryError, RegistryResult};
use crate::domains::mods::models::{Mod, ModVersion};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// A reviewer may never decide on a mod they are listed as an author of.
pub(crate) fn ensure_not_author(m: &Mod, reviewer: &User) -> RegistryResult<()> {
    if m.is_authored_by(reviewer.id) {
        tracing::warn!(
            mod_id = %m.id,
            reviewer_id = %reviewer.id,
            "Rejected self-approval attempt"
        );
        return Err(RegistryError::Forbidden(format!(
            "User {} is an author of mod {} and cannot review it",
            reviewer.id, m.id
        )));
    }
    Ok(())
}

pub(crate) async fn load_mod(id: ModId, deps: &ServerDeps) -> RegistryResult<Mod> {
    deps.store
        .find_mod(id)
        .await?
        .ok_or_else(|| RegistryError::not_found(format!("Mod {}", id)))
}

pub(crate) async fn load_mod_version(
    id: ModVersionId,
    deps: &ServerDeps,
) -> RegistryResult<ModVersion> {
    deps.store
        .find_mod_version(id)
        .await?
        .ok_or_else(|| RegistryError::not_found(format!("Mod version {}", id)))
}

/// Authorship of a version is judged at the mod level.
pub(crate) async fn parent_mod(version: &ModVersion, deps: &ServerDeps) -> RegistryResult<Mod> {
    deps.store.find_mod(version.mod_id).await?.ok_or_else(|| {
        RegistryError::not_found(format!(
            "Mod {} (parent of mod version {})",
            version.mod_id, version.id
        ))
    })
}

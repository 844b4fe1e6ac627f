//! Queued edit actions
//!
//! An edit stays `pending` until a reviewer either merges it into its target
//! (the row is kept with `approved = true`) or rejects it (the row is
//! destroyed). Approved rows are never returned by the queue lookups, so an
//! edit can only be applied once.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::merge::{validate_mod_changes, validate_mod_version_changes};
use super::{ensure_not_author, load_mod, load_mod_version, parent_mod};
use crate::common::auth::{Actor, AuthError, RegistryCapability};
use crate::common::{
    EditId, ModId, ModVersionId, RegistryError, RegistryResult, UserRole, Visibility,
};
use crate::domains::approval::models::{
    EditApproval, EditSubject, MergedTarget, ModChanges, ModVersionChanges, NewEditApproval,
};
use crate::domains::mods::models::{Mod, ModVersion};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Result of resolving a queued edit
#[derive(Debug, Clone)]
pub enum EditOutcome {
    /// Changes were applied; carries the now-approved queue row
    Merged(EditApproval),
    /// The queue row was destroyed
    Discarded,
}

/// Reviewer amendments to a queued edit.
///
/// Mod and mod version fields never share a name, so a single body carries
/// either kind; it must match the edit's target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditPatch {
    #[serde(flatten)]
    pub mod_changes: ModChanges,
    #[serde(flatten)]
    pub version_changes: ModVersionChanges,
}

/// The mod whose authors may not review `subject`
async fn subject_owner(subject: &EditSubject, deps: &ServerDeps) -> RegistryResult<Mod> {
    match subject {
        EditSubject::Mod { obj_id, .. } => load_mod(*obj_id, deps).await,
        EditSubject::ModVersion { obj_id, .. } => {
            let version = load_mod_version(*obj_id, deps).await?;
            parent_mod(&version, deps).await
        }
    }
}

async fn load_pending_edit(edit_id: EditId, deps: &ServerDeps) -> RegistryResult<EditApproval> {
    deps.store
        .find_pending_edit(edit_id)
        .await?
        .ok_or_else(|| RegistryError::not_found(format!("Edit {}", edit_id)))
}

/// Accept (`verified`) or reject (`unverified`) a queued edit.
pub async fn resolve_edit(
    edit_id: EditId,
    status: Visibility,
    actor: &User,
    deps: &ServerDeps,
) -> RegistryResult<EditOutcome> {
    Actor::new(actor)
        .can(RegistryCapability::ReviewSubmissions)
        .check()?;

    if status == Visibility::Removed {
        return Err(RegistryError::validation(format!(
            "Invalid status for an edit: {}",
            status
        )));
    }

    let edit = load_pending_edit(edit_id, deps).await?;
    let owner = subject_owner(&edit.subject, deps).await?;
    ensure_not_author(&owner, actor)?;

    if status == Visibility::Unverified {
        deps.store.delete_edit(edit.id).await?;
        info!(
            reviewer_id = %actor.id,
            edit_id = %edit.id,
            target = %edit.subject.table_name(),
            target_id = edit.subject.target_id(),
            "Edit rejected"
        );
        return Ok(EditOutcome::Discarded);
    }

    let merged = match &edit.subject {
        EditSubject::Mod { obj_id, obj } => {
            let resolved = validate_mod_changes(obj, deps).await?;
            let mut target = load_mod(*obj_id, deps).await?;
            resolved.apply_to(&mut target);
            MergedTarget::Mod(target)
        }
        EditSubject::ModVersion { obj_id, obj } => {
            let resolved = validate_mod_version_changes(obj, deps).await?;
            let mut target = load_mod_version(*obj_id, deps).await?;
            resolved.apply_to(&mut target);
            MergedTarget::ModVersion(target)
        }
    };

    let edit = deps.store.apply_edit(&merged, &edit).await?;

    info!(
        reviewer_id = %actor.id,
        edit_id = %edit.id,
        target = %edit.subject.table_name(),
        target_id = edit.subject.target_id(),
        "Edit merged"
    );

    Ok(EditOutcome::Merged(edit))
}

/// Rewrite the payload of a pending edit before it is resolved.
///
/// The reviewer may neither be the submitter nor an author of the target mod.
pub async fn amend_edit(
    edit_id: EditId,
    patch: EditPatch,
    actor: &User,
    deps: &ServerDeps,
) -> RegistryResult<EditApproval> {
    Actor::new(actor)
        .can(RegistryCapability::ReviewSubmissions)
        .check()?;

    let mut edit = load_pending_edit(edit_id, deps).await?;
    if edit.submitter_id == actor.id {
        return Err(RegistryError::Forbidden(format!(
            "User {} submitted edit {} and cannot amend it",
            actor.id, edit.id
        )));
    }
    let owner = subject_owner(&edit.subject, deps).await?;
    ensure_not_author(&owner, actor)?;

    match &mut edit.subject {
        EditSubject::Mod { obj, .. } => {
            if !patch.version_changes.is_empty() {
                return Err(RegistryError::validation(format!(
                    "Edit {} targets mods but received mod version fields",
                    edit_id
                )));
            }
            validate_mod_changes(&patch.mod_changes, deps)
                .await?
                .write_into(obj);
        }
        EditSubject::ModVersion { obj, .. } => {
            if !patch.mod_changes.is_empty() {
                return Err(RegistryError::validation(format!(
                    "Edit {} targets modVersions but received mod fields",
                    edit_id
                )));
            }
            validate_mod_version_changes(&patch.version_changes, deps)
                .await?
                .write_into(obj);
        }
    }

    let edit = deps.store.update_edit(&edit).await?;
    info!(reviewer_id = %actor.id, edit_id = %edit.id, "Edit amended");

    Ok(edit)
}

/// Queue a change against an existing mod or mod version.
///
/// The payload always carries its target's identifying field; when the
/// submitter leaves it out, the current value is filled in.
pub async fn submit_edit(
    subject: EditSubject,
    submitter: &User,
    deps: &ServerDeps,
) -> RegistryResult<EditApproval> {
    if submitter.has_role(UserRole::Banned) {
        return Err(AuthError::Banned.into());
    }

    let subject = match subject {
        EditSubject::Mod { obj_id, mut obj } => {
            let target = load_mod(obj_id, deps).await?;
            if obj.name.as_deref().map_or(true, str::is_empty) {
                obj.name = Some(target.name);
            }
            EditSubject::Mod { obj_id, obj }
        }
        EditSubject::ModVersion { obj_id, mut obj } => {
            let target = load_mod_version(obj_id, deps).await?;
            if obj.mod_version.as_deref().map_or(true, str::is_empty) {
                obj.mod_version = Some(target.version.to_string());
            }
            EditSubject::ModVersion { obj_id, obj }
        }
    };

    let edit = deps
        .store
        .create_edit(NewEditApproval {
            subject,
            submitter_id: submitter.id,
        })
        .await?;

    info!(
        submitter_id = %submitter.id,
        edit_id = %edit.id,
        target = %edit.subject.table_name(),
        target_id = edit.subject.target_id(),
        "Edit queued"
    );

    Ok(edit)
}

/// Correct an unverified mod before it is accepted.
pub async fn amend_pending_mod(
    mod_id: ModId,
    changes: ModChanges,
    actor: &User,
    deps: &ServerDeps,
) -> RegistryResult<Mod> {
    Actor::new(actor)
        .can(RegistryCapability::ReviewSubmissions)
        .check()?;

    let mut m = load_mod(mod_id, deps).await?;
    if m.visibility != Visibility::Unverified {
        return Err(RegistryError::not_found(format!("Unverified mod {}", mod_id)));
    }
    ensure_not_author(&m, actor)?;

    validate_mod_changes(&changes, deps).await?.apply_to(&mut m);
    let updated = deps.store.update_mod(&m).await?;

    info!(reviewer_id = %actor.id, mod_id = %updated.id, "Pending mod amended");
    Ok(updated)
}

/// Correct an unverified mod version before it is accepted.
pub async fn amend_pending_mod_version(
    version_id: ModVersionId,
    changes: ModVersionChanges,
    actor: &User,
    deps: &ServerDeps,
) -> RegistryResult<ModVersion> {
    Actor::new(actor)
        .can(RegistryCapability::ReviewSubmissions)
        .check()?;

    let mut version = load_mod_version(version_id, deps).await?;
    if version.visibility != Visibility::Unverified {
        return Err(RegistryError::not_found(format!(
            "Unverified mod version {}",
            version_id
        )));
    }
    let parent = parent_mod(&version, deps).await?;
    ensure_not_author(&parent, actor)?;

    validate_mod_version_changes(&changes, deps)
        .await?
        .apply_to(&mut version);
    let updated = deps.store.update_mod_version(&version).await?;

    info!(
        reviewer_id = %actor.id,
        mod_version_id = %updated.id,
        "Pending mod version amended"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_splits_fields_by_target() {
        let patch: EditPatch = serde_json::from_value(serde_json::json!({
            "description": "Better description",
            "platform": "oculuspc"
        }))
        .unwrap();

        assert_eq!(
            patch.mod_changes.description.as_deref(),
            Some("Better description")
        );
        assert_eq!(patch.version_changes.platform.as_deref(), Some("oculuspc"));
        assert!(!patch.mod_changes.is_empty());
        assert!(!patch.version_changes.is_empty());
    }

    #[test]
    fn test_empty_patch() {
        let patch: EditPatch = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(patch.mod_changes.is_empty());
        assert!(patch.version_changes.is_empty());
    }
}

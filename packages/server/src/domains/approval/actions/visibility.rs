//! Visibility transitions for mods and mod versions

use serde::Serialize;
use tracing::info;

use super::{ensure_not_author, load_mod, load_mod_version, parent_mod};
use crate::common::auth::{Actor, RegistryCapability};
use crate::common::{ModId, ModVersionId, RegistryResult, Visibility};
use crate::domains::approval::models::EditApproval;
use crate::domains::mods::models::{Mod, ModVersion};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Everything still waiting for a first review
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubmissions {
    pub mods: Vec<Mod>,
    pub mod_versions: Vec<ModVersion>,
}

pub async fn list_pending(actor: &User, deps: &ServerDeps) -> RegistryResult<PendingSubmissions> {
    Actor::new(actor)
        .can(RegistryCapability::ReviewSubmissions)
        .check()?;

    let mods = deps
        .store
        .list_mods_by_visibility(Visibility::Unverified)
        .await?;
    let mod_versions = deps
        .store
        .list_mod_versions_by_visibility(Visibility::Unverified)
        .await?;

    Ok(PendingSubmissions { mods, mod_versions })
}

/// Queued edits that have not been accepted yet
pub async fn list_pending_edits(actor: &User, deps: &ServerDeps) -> RegistryResult<Vec<EditApproval>> {
    Actor::new(actor)
        .can(RegistryCapability::ReviewSubmissions)
        .check()?;

    Ok(deps.store.list_pending_edits().await?)
}

pub async fn set_mod_visibility(
    mod_id: ModId,
    status: Visibility,
    actor: &User,
    deps: &ServerDeps,
) -> RegistryResult<Mod> {
    Actor::new(actor)
        .can(RegistryCapability::ReviewSubmissions)
        .check()?;

    let mut m = load_mod(mod_id, deps).await?;
    ensure_not_author(&m, actor)?;

    m.visibility = status;
    let updated = deps.store.update_mod(&m).await?;

    info!(
        reviewer_id = %actor.id,
        reviewer = %actor.username,
        mod_id = %updated.id,
        mod_name = %updated.name,
        status = %updated.visibility,
        "Mod visibility changed"
    );

    Ok(updated)
}

/// Same as [`set_mod_visibility`] but for a single release. The self-approval
/// check uses the parent mod's authors, not the version's uploader.
pub async fn set_mod_version_visibility(
    version_id: ModVersionId,
    status: Visibility,
    actor: &User,
    deps: &ServerDeps,
) -> RegistryResult<ModVersion> {
    Actor::new(actor)
        .can(RegistryCapability::ReviewSubmissions)
        .check()?;

    let mut version = load_mod_version(version_id, deps).await?;
    let parent = parent_mod(&version, deps).await?;
    ensure_not_author(&parent, actor)?;

    version.visibility = status;
    let updated = deps.store.update_mod_version(&version).await?;

    info!(
        reviewer_id = %actor.id,
        reviewer = %actor.username,
        mod_name = %parent.name,
        mod_version_id = %updated.id,
        version = %updated.version,
        status = %updated.visibility,
        "Mod version visibility changed"
    );

    Ok(updated)
}

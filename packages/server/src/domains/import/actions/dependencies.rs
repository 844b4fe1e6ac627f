//! Dependency linking for imported versions
//!
//! References are consumed from a worklist in batch order. A pinned
//! reference whose exact version is missing materialises that package once;
//! the new package's own references are queued one level deeper and are
//! resolved by name only. Nothing is followed past `MAX_RESOLUTION_DEPTH`.
//!
//! Unresolvable references are logged and dropped. They never fail the run.

use std::collections::VecDeque;

use catalog_client::CatalogMod;
use tracing::{debug, info, warn};

use super::reconcile::{dependency_work, import_package};
use crate::common::utils::coerce_version;
use crate::common::{ModVersionId, RegistryResult};
use crate::domains::import::data::{DependencyWork, ImportReport};
use crate::domains::mods::models::{Mod, ModVersion};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

pub const MAX_RESOLUTION_DEPTH: u8 = 2;

pub async fn resolve_dependencies(
    mut worklist: VecDeque<DependencyWork>,
    author: &User,
    deps: &ServerDeps,
    report: &mut ImportReport,
) -> RegistryResult<()> {
    while let Some(work) = worklist.pop_front() {
        let name = work.reference.name().to_string();

        let Some(dependent) = deps.store.find_mod_version(work.dependent).await? else {
            warn!(mod_version_id = %work.dependent, dependency = %name, "Dependent version not found");
            report.dependencies_dropped += 1;
            continue;
        };

        let resolved = match work.reference.exact() {
            Some(pinned) if work.depth < MAX_RESOLUTION_DEPTH => {
                resolve_pinned(&dependent, pinned, work.depth, author, deps, report, &mut worklist)
                    .await?
            }
            _ => resolve_latest(&dependent, &name, deps).await?,
        };

        match resolved {
            Some(target) => link_dependency(dependent, target, deps, report).await?,
            None => {
                warn!(
                    mod_version_id = %work.dependent,
                    dependency = %name,
                    depth = work.depth,
                    "Dependency could not be resolved, dropping"
                );
                report.dependencies_dropped += 1;
            }
        }
    }

    Ok(())
}

async fn find_dependency_mod(name: &str, deps: &ServerDeps) -> RegistryResult<Option<Mod>> {
    Ok(deps
        .store
        .find_mod_by_name(name, &deps.import_options.game_name)
        .await?)
}

/// Latest public version of `name` supporting the dependent's game version
async fn resolve_latest(
    dependent: &ModVersion,
    name: &str,
    deps: &ServerDeps,
) -> RegistryResult<Option<ModVersionId>> {
    let Some(target_mod) = find_dependency_mod(name, deps).await? else {
        return Ok(None);
    };
    let Some(game_version) = dependent.primary_game_version() else {
        return Ok(None);
    };

    let versions = deps.store.list_mod_versions_for_mod(target_mod.id).await?;
    Ok(ModVersion::latest_compatible(&versions, game_version).map(|v| v.id))
}

/// Exact (mod, version, platform) match that supports the dependent's game version
async fn find_exact(
    target_mod: &Mod,
    pinned: &CatalogMod,
    dependent: &ModVersion,
    deps: &ServerDeps,
) -> RegistryResult<Option<ModVersionId>> {
    let Some(version) = coerce_version(&pinned.version) else {
        return Ok(None);
    };
    let Some(game_version) = dependent.primary_game_version() else {
        return Ok(None);
    };

    Ok(deps
        .store
        .find_mod_version_by_key(target_mod.id, &version, dependent.platform)
        .await?
        .filter(|v| v.supports(game_version))
        .map(|v| v.id))
}

async fn resolve_pinned(
    dependent: &ModVersion,
    pinned: &CatalogMod,
    depth: u8,
    author: &User,
    deps: &ServerDeps,
    report: &mut ImportReport,
    worklist: &mut VecDeque<DependencyWork>,
) -> RegistryResult<Option<ModVersionId>> {
    let Some(target_mod) = find_dependency_mod(&pinned.name, deps).await? else {
        return Ok(None);
    };

    if let Some(found) = find_exact(&target_mod, pinned, dependent, deps).await? {
        return Ok(Some(found));
    }

    info!(
        dependency = %pinned.name,
        version = %pinned.version,
        "Pinned dependency missing, importing it"
    );
    let created = import_package(pinned, author, deps, report).await?;

    // The new package's references are handled before the rest of the batch.
    for nested in dependency_work(pinned, &created, depth + 1).into_iter().rev() {
        worklist.push_front(nested);
    }

    find_exact(&target_mod, pinned, dependent, deps).await
}

/// Append `target` to the dependent's list. Existing links are left alone.
async fn link_dependency(
    mut dependent: ModVersion,
    target: ModVersionId,
    deps: &ServerDeps,
    report: &mut ImportReport,
) -> RegistryResult<()> {
    if dependent.dependencies.contains(&target) {
        debug!(mod_version_id = %dependent.id, dependency = %target, "Dependency already linked");
        return Ok(());
    }

    dependent.dependencies.push(target);
    deps.store.update_mod_version(&dependent).await?;
    report.dependencies_linked += 1;

    debug!(mod_version_id = %dependent.id, dependency = %target, "Linked dependency");
    Ok(())
}

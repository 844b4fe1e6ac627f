//! Catalog reconciliation
//!
//! Descriptors are processed strictly in order. Mods and versions are all
//! created before any dependency is linked, so references to packages later
//! in the same batch resolve.

use std::collections::VecDeque;

use catalog_client::{CatalogDownload, CatalogMod};
use tracing::{debug, info, warn};

use super::dependencies::resolve_dependencies;
use crate::common::auth::{Actor, RegistryCapability};
use crate::common::utils::{coerce_version, hash_artifact};
use crate::common::{Category, Platform, RegistryError, RegistryResult, Visibility};
use crate::domains::import::data::{DependencyWork, ImportFailure, ImportItemError, ImportReport};
use crate::domains::mods::models::{
    ContentHash, GameVersion, Mod, ModVersion, NewGameVersion, NewMod, NewModVersion,
};
use crate::domains::users::models::{NewUser, User};
use crate::kernel::ServerDeps;

/// Service account credited as author of everything imported
pub const IMPORT_USERNAME: &str = "BeatMods Import";
pub const DEFAULT_ICON: &str = "default.png";
/// Stored instead of a real hash when archives are not downloaded
pub const PLACEHOLDER_ZIP_HASH: &str = "not-downloaded";

const DECLINED_STATUS: &str = "declined";

/// Fetch the configured catalog and reconcile all of it into the registry.
pub async fn import_catalog(actor: &User, deps: &ServerDeps) -> RegistryResult<ImportReport> {
    Actor::new(actor)
        .can(RegistryCapability::ImportCatalog)
        .check()?;

    let descriptors = fetch_catalog(deps).await?;
    let author = ensure_import_user(deps).await?;

    info!(
        requested_by = %actor.id,
        descriptors = descriptors.len(),
        "Starting catalog import"
    );
    reconcile_descriptors(&descriptors, &author, deps).await
}

/// Any catalog failure aborts the whole run.
pub async fn fetch_catalog(deps: &ServerDeps) -> RegistryResult<Vec<CatalogMod>> {
    deps.catalog
        .fetch_mods(&deps.import_options.game_version)
        .await
        .map_err(|e| RegistryError::ExternalSource(e.to_string()))
}

/// Find or create the import service account.
pub async fn ensure_import_user(deps: &ServerDeps) -> RegistryResult<User> {
    if let Some(user) = deps.store.find_service_account(IMPORT_USERNAME).await? {
        return Ok(user);
    }

    let user = deps
        .store
        .create_user(NewUser {
            username: IMPORT_USERNAME.to_string(),
            roles: vec![],
            github_id: None,
        })
        .await?;
    info!(user_id = %user.id, "Created import service account");
    Ok(user)
}

/// Reconcile an already fetched batch, then link dependencies.
///
/// Only store failures abort the run. Download and artifact failures are
/// recorded on the report and the batch continues.
pub async fn reconcile_descriptors(
    descriptors: &[CatalogMod],
    author: &User,
    deps: &ServerDeps,
) -> RegistryResult<ImportReport> {
    let mut report = ImportReport {
        descriptors: descriptors.len(),
        ..Default::default()
    };
    let mut worklist = VecDeque::new();

    for (index, descriptor) in descriptors.iter().enumerate() {
        let created = import_package(descriptor, author, deps, &mut report).await?;
        worklist.extend(dependency_work(descriptor, &created, 1));

        let remaining = descriptors.len() - index - 1;
        if remaining > 0 && remaining % 100 == 0 {
            info!(remaining, "Catalog import progress");
        }
    }

    info!(pending = worklist.len(), "Resolving dependencies");
    resolve_dependencies(worklist, author, deps, &mut report).await?;

    info!(
        mods_created = report.mods_created,
        versions_created = report.versions_created,
        duplicates = report.duplicates,
        failures = report.failures.len(),
        linked = report.dependencies_linked,
        dropped = report.dependencies_dropped,
        "Catalog import finished"
    );
    Ok(report)
}

/// Work records for every reference of `descriptor` on each created version
pub(crate) fn dependency_work(
    descriptor: &CatalogMod,
    created: &[ModVersion],
    depth: u8,
) -> Vec<DependencyWork> {
    created
        .iter()
        .flat_map(|version| {
            descriptor.dependencies.iter().map(move |reference| DependencyWork {
                dependent: version.id,
                reference: reference.clone(),
                depth,
            })
        })
        .collect()
}

/// Import one catalog package: its mod and one version per download.
///
/// Returns the versions that were created; existing ones are skipped.
pub(crate) async fn import_package(
    descriptor: &CatalogMod,
    author: &User,
    deps: &ServerDeps,
    report: &mut ImportReport,
) -> RegistryResult<Vec<ModVersion>> {
    if descriptor.status == DECLINED_STATUS {
        debug!(name = %descriptor.name, "Skipping declined catalog entry");
        report.declined += 1;
        return Ok(vec![]);
    }

    let visibility = Visibility::from_catalog_status(&descriptor.status);
    let owner = find_or_create_mod(descriptor, visibility, author, deps, report).await?;

    let coerced = coerce_version(&descriptor.version);

    let mut created = Vec::new();
    for download in &descriptor.downloads {
        let Some(platform) = Platform::from_catalog_type(&download.kind) else {
            warn!(
                name = %descriptor.name,
                kind = %download.kind,
                "Unknown download platform, skipping"
            );
            continue;
        };

        // Resolved per entry, so a package with no usable downloads adds none
        let game_version = ensure_game_version(descriptor, deps).await?;

        let Some(version) = coerced.clone() else {
            warn!(
                name = %descriptor.name,
                version = %descriptor.version,
                platform = %platform,
                "Failed to parse version, skipping"
            );
            report.unparseable += 1;
            continue;
        };

        if deps
            .store
            .find_mod_version_by_key(owner.id, &version, platform)
            .await?
            .is_some()
        {
            debug!(
                name = %descriptor.name,
                version = %version,
                platform = %platform,
                "Version already exists, skipping"
            );
            report.duplicates += 1;
            continue;
        }

        let zip_hash = match store_artifact(download, deps).await {
            Ok(hash) => hash,
            Err(e) => {
                warn!(name = %descriptor.name, version = %descriptor.version, error = %e, "Import of download failed");
                report.failures.push(ImportFailure {
                    name: descriptor.name.clone(),
                    version: descriptor.version.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let mod_version = deps
            .store
            .create_mod_version(NewModVersion {
                mod_id: owner.id,
                version: version.clone(),
                platform,
                supported_game_version_ids: vec![game_version.id],
                dependencies: vec![],
                zip_hash,
                content_hashes: download
                    .hash_md5
                    .iter()
                    .map(|h| ContentHash {
                        path: h.file.clone(),
                        hash: h.hash.clone(),
                    })
                    .collect(),
                visibility,
                author_id: author.id,
            })
            .await?;

        report.versions_created += 1;
        created.push(mod_version);
    }

    Ok(created)
}

async fn find_or_create_mod(
    descriptor: &CatalogMod,
    visibility: Visibility,
    author: &User,
    deps: &ServerDeps,
    report: &mut ImportReport,
) -> RegistryResult<Mod> {
    let game_name = &deps.import_options.game_name;
    if let Some(existing) = deps.store.find_mod_by_name(&descriptor.name, game_name).await? {
        return Ok(existing);
    }

    let category = Category::from_catalog(&descriptor.category);
    if category == Category::Other && !descriptor.category.eq_ignore_ascii_case("other") {
        debug!(name = %descriptor.name, category = %descriptor.category, "Unknown category, using other");
    }

    let created = deps
        .store
        .create_mod(NewMod {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            category,
            git_url: descriptor.link.clone(),
            icon_file_name: DEFAULT_ICON.to_string(),
            author_ids: vec![author.id],
            game_name: game_name.clone(),
            visibility,
        })
        .await?;

    report.mods_created += 1;
    Ok(created)
}

/// Game version named by the descriptor, created on first sight
async fn ensure_game_version(
    descriptor: &CatalogMod,
    deps: &ServerDeps,
) -> RegistryResult<GameVersion> {
    let options = &deps.import_options;
    let version = if descriptor.game_version.is_empty() {
        options.game_version.as_str()
    } else {
        descriptor.game_version.as_str()
    };

    if let Some(existing) = deps
        .store
        .find_game_version_by_name(version, &options.game_name)
        .await?
    {
        return Ok(existing);
    }

    let created = deps
        .store
        .create_game_version(NewGameVersion {
            version: version.to_string(),
            game_name: options.game_name.clone(),
        })
        .await?;
    info!(game_version = %created.version, "Created game version");
    Ok(created)
}

async fn store_artifact(
    download: &CatalogDownload,
    deps: &ServerDeps,
) -> Result<String, ImportItemError> {
    if !deps.import_options.download_artifacts {
        return Ok(PLACEHOLDER_ZIP_HASH.to_string());
    }

    let bytes = deps
        .catalog
        .download(&download.url)
        .await
        .map_err(|cause| ImportItemError::Download {
            url: download.url.clone(),
            cause,
        })?;

    let hash = hash_artifact(&bytes);
    deps.artifacts
        .persist(&hash, &bytes)
        .await
        .map_err(|cause| ImportItemError::Persist {
            hash: hash.clone(),
            cause,
        })?;

    Ok(hash)
}

//! Edit merge validation
//!
//! Incoming change sets are validated in full before anything is written.
//! The result is a resolved change set whose every field is already known to
//! be valid, which can then be applied to the target entity or written back
//! into a queued edit's payload.

use semver::Version;
use tracing::debug;

use crate::common::{
    Category, GameVersionId, ModId, Platform, RegistryError, RegistryResult, UserId,
};
use crate::domains::approval::models::{ModChanges, ModVersionChanges};
use crate::domains::mods::models::{Mod, ModVersion};
use crate::kernel::ServerDeps;

/// Non-empty string values only
fn present(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

// =============================================================================
// Mods
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedModChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub git_url: Option<String>,
    pub category: Option<Category>,
    pub author_ids: Option<Vec<UserId>>,
}

impl ResolvedModChanges {
    pub fn apply_to(&self, m: &mut Mod) {
        if let Some(name) = &self.name {
            m.name = name.clone();
        }
        if let Some(description) = &self.description {
            m.description = description.clone();
        }
        if let Some(git_url) = &self.git_url {
            m.git_url = git_url.clone();
        }
        if let Some(category) = self.category {
            m.category = category;
        }
        if let Some(author_ids) = &self.author_ids {
            m.author_ids = author_ids.clone();
        }
    }

    /// Overwrite the matching fields of a queued payload
    pub fn write_into(&self, payload: &mut ModChanges) {
        if let Some(name) = &self.name {
            payload.name = Some(name.clone());
        }
        if let Some(description) = &self.description {
            payload.description = Some(description.clone());
        }
        if let Some(git_url) = &self.git_url {
            payload.git_url = Some(git_url.clone());
        }
        if let Some(category) = self.category {
            payload.category = Some(category.to_string());
        }
        if let Some(author_ids) = &self.author_ids {
            payload.author_ids = Some(author_ids.clone());
        }
    }
}

/// Validate a mod change set.
///
/// Empty strings and unknown categories are ignored. Every author id must
/// name an existing user, otherwise the whole change set is rejected.
pub async fn validate_mod_changes(
    changes: &ModChanges,
    deps: &ServerDeps,
) -> RegistryResult<ResolvedModChanges> {
    let category = changes.category.as_deref().and_then(|raw| {
        raw.parse::<Category>()
            .map_err(|_| debug!(category = %raw, "Ignoring unknown category"))
            .ok()
    });

    let author_ids = match &changes.author_ids {
        Some(ids) => {
            for id in ids {
                if deps.store.find_user(*id).await?.is_none() {
                    return Err(RegistryError::validation(format!(
                        "Author {} does not exist",
                        id
                    )));
                }
            }
            Some(ids.clone())
        }
        None => None,
    };

    Ok(ResolvedModChanges {
        name: present(&changes.name),
        description: present(&changes.description),
        git_url: present(&changes.git_url),
        category,
        author_ids,
    })
}

// =============================================================================
// Mod versions
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedModVersionChanges {
    pub version: Option<Version>,
    pub platform: Option<Platform>,
    pub game_versions: Option<Vec<GameVersionId>>,
    /// Validated only. A version's dependency list holds mod version ids, so
    /// mod-level dependencies are kept on the edit for reviewers.
    pub dependency_mods: Option<Vec<ModId>>,
}

impl ResolvedModVersionChanges {
    pub fn apply_to(&self, v: &mut ModVersion) {
        if let Some(version) = &self.version {
            v.version = version.clone();
        }
        if let Some(platform) = self.platform {
            v.platform = platform;
        }
        if let Some(game_versions) = &self.game_versions {
            v.supported_game_version_ids = game_versions.clone();
        }
    }

    /// Overwrite the matching fields of a queued payload
    pub fn write_into(&self, payload: &mut ModVersionChanges) {
        if let Some(version) = &self.version {
            payload.mod_version = Some(version.to_string());
        }
        if let Some(platform) = self.platform {
            payload.platform = Some(platform.to_string());
        }
        if let Some(game_versions) = &self.game_versions {
            payload.game_versions = Some(game_versions.clone());
        }
        if let Some(dependency_mods) = &self.dependency_mods {
            payload.dependencies = Some(dependency_mods.clone());
        }
    }
}

/// Validate a mod version change set.
///
/// Dependency mod ids and game version ids must all exist, a version string
/// must parse as semver, and an unknown platform is ignored.
pub async fn validate_mod_version_changes(
    changes: &ModVersionChanges,
    deps: &ServerDeps,
) -> RegistryResult<ResolvedModVersionChanges> {
    let dependency_mods = match &changes.dependencies {
        Some(ids) => {
            for id in ids {
                if deps.store.find_mod(*id).await?.is_none() {
                    return Err(RegistryError::validation(format!(
                        "Dependency mod {} does not exist",
                        id
                    )));
                }
            }
            Some(ids.clone())
        }
        None => None,
    };

    let game_versions = match &changes.game_versions {
        Some(ids) => {
            for id in ids {
                if deps.store.find_game_version(*id).await?.is_none() {
                    return Err(RegistryError::validation(format!(
                        "Game version {} does not exist",
                        id
                    )));
                }
            }
            Some(ids.clone())
        }
        None => None,
    };

    let version = match present(&changes.mod_version) {
        Some(raw) => Some(Version::parse(&raw).map_err(|e| {
            RegistryError::validation(format!("Invalid mod version {}: {}", raw, e))
        })?),
        None => None,
    };

    let platform = changes.platform.as_deref().and_then(|raw| {
        raw.parse::<Platform>()
            .map_err(|_| debug!(platform = %raw, "Ignoring unknown platform"))
            .ok()
    });

    Ok(ResolvedModVersionChanges {
        version,
        platform,
        game_versions,
        dependency_mods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{UserRole, Visibility};
    use crate::domains::mods::models::{NewGameVersion, NewMod};
    use crate::domains::users::models::NewUser;
    use crate::kernel::TestDependencies;

    async fn seeded() -> (ServerDeps, UserId, ModId, GameVersionId) {
        let deps = TestDependencies::new().into_deps();
        let user = deps
            .store
            .create_user(NewUser {
                username: "kyle".into(),
                roles: vec![UserRole::Moderator],
                github_id: Some("1".into()),
            })
            .await
            .unwrap();
        let m = deps
            .store
            .create_mod(NewMod {
                name: "SongCore".into(),
                description: String::new(),
                category: Category::Core,
                git_url: String::new(),
                icon_file_name: "default.png".into(),
                author_ids: vec![user.id],
                game_name: "Beat Saber".into(),
                visibility: Visibility::Verified,
            })
            .await
            .unwrap();
        let gv = deps
            .store
            .create_game_version(NewGameVersion {
                version: "1.39.0".into(),
                game_name: "Beat Saber".into(),
            })
            .await
            .unwrap();
        (deps, user.id, m.id, gv.id)
    }

    #[tokio::test]
    async fn test_mod_changes_skip_empty_strings_and_unknown_category() {
        let (deps, _, _, _) = seeded().await;
        let changes = ModChanges {
            name: Some(String::new()),
            description: Some("Custom levels".into()),
            category: Some("not-a-category".into()),
            ..Default::default()
        };

        let resolved = validate_mod_changes(&changes, &deps).await.unwrap();
        assert_eq!(resolved.name, None);
        assert_eq!(resolved.description.as_deref(), Some("Custom levels"));
        assert_eq!(resolved.category, None);
    }

    #[tokio::test]
    async fn test_mod_changes_reject_missing_author() {
        let (deps, user_id, _, _) = seeded().await;
        let changes = ModChanges {
            author_ids: Some(vec![user_id, UserId::new(999)]),
            ..Default::default()
        };

        let err = validate_mod_changes(&changes, &deps).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(msg) if msg.contains("999")));
    }

    #[tokio::test]
    async fn test_version_changes_validate_references() {
        let (deps, _, mod_id, gv) = seeded().await;

        let ok = ModVersionChanges {
            mod_version: Some("1.2.3".into()),
            platform: Some("steampc".into()),
            game_versions: Some(vec![gv]),
            dependencies: Some(vec![mod_id]),
        };
        let resolved = validate_mod_version_changes(&ok, &deps).await.unwrap();
        assert_eq!(resolved.version, Some(Version::new(1, 2, 3)));
        assert_eq!(resolved.platform, Some(Platform::Steam));
        assert_eq!(resolved.game_versions, Some(vec![gv]));

        let missing_dep = ModVersionChanges {
            dependencies: Some(vec![ModId::new(4040)]),
            ..Default::default()
        };
        let err = validate_mod_version_changes(&missing_dep, &deps)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(msg) if msg.contains("4040")));

        let missing_gv = ModVersionChanges {
            game_versions: Some(vec![GameVersionId::new(5050)]),
            ..Default::default()
        };
        let err = validate_mod_version_changes(&missing_gv, &deps)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(msg) if msg.contains("5050")));
    }

    #[tokio::test]
    async fn test_version_changes_reject_bad_semver_and_ignore_unknown_platform() {
        let (deps, _, _, _) = seeded().await;

        let bad = ModVersionChanges {
            mod_version: Some("one.two".into()),
            ..Default::default()
        };
        let err = validate_mod_version_changes(&bad, &deps).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(msg) if msg.contains("one.two")));

        let unknown_platform = ModVersionChanges {
            platform: Some("quest".into()),
            ..Default::default()
        };
        let resolved = validate_mod_version_changes(&unknown_platform, &deps)
            .await
            .unwrap();
        assert_eq!(resolved.platform, None);
    }

    #[test]
    fn test_write_into_overwrites_only_present_fields() {
        let mut payload = ModChanges {
            name: Some("Old".into()),
            description: Some("Keep me".into()),
            ..Default::default()
        };
        let resolved = ResolvedModChanges {
            name: Some("New".into()),
            category: Some(Category::Ui),
            ..Default::default()
        };

        resolved.write_into(&mut payload);
        assert_eq!(payload.name.as_deref(), Some("New"));
        assert_eq!(payload.description.as_deref(), Some("Keep me"));
        assert_eq!(payload.category.as_deref(), Some("ui"));
    }
}

//! Test fixtures for creating registry data and catalog entries.

#![allow(dead_code)]

use catalog_client::{CatalogDownload, CatalogMod, DependencyRef, FileHash};
use registry_core::common::{Category, GameVersionId, ModVersionId, Platform, UserRole, Visibility};
use registry_core::domains::mods::models::{
    GameVersion, Mod, ModVersion, NewGameVersion, NewMod, NewModVersion,
};
use registry_core::domains::users::models::{NewUser, User};
use registry_core::kernel::BaseRegistryStore;
use semver::Version;

pub const GAME_NAME: &str = "Beat Saber";
pub const GAME_VERSION: &str = "1.39.0";

// =============================================================================
// Users
// =============================================================================

pub async fn create_user(store: &dyn BaseRegistryStore, username: &str, roles: Vec<UserRole>) -> User {
    store
        .create_user(NewUser {
            username: username.to_string(),
            roles,
            github_id: Some(format!("gh-{}", username)),
        })
        .await
        .expect("Failed to create user")
}

pub async fn create_reviewer(store: &dyn BaseRegistryStore, username: &str) -> User {
    create_user(store, username, vec![UserRole::Approver]).await
}

pub async fn create_admin(store: &dyn BaseRegistryStore, username: &str) -> User {
    create_user(store, username, vec![UserRole::Admin]).await
}

// =============================================================================
// Registry entities
// =============================================================================

pub async fn create_game_version(store: &dyn BaseRegistryStore, version: &str) -> GameVersion {
    store
        .create_game_version(NewGameVersion {
            version: version.to_string(),
            game_name: GAME_NAME.to_string(),
        })
        .await
        .expect("Failed to create game version")
}

pub async fn create_mod(
    store: &dyn BaseRegistryStore,
    name: &str,
    author: &User,
    visibility: Visibility,
) -> Mod {
    store
        .create_mod(NewMod {
            name: name.to_string(),
            description: format!("{} description", name),
            category: Category::Other,
            git_url: format!("https://github.com/example/{}", name),
            icon_file_name: "default.png".to_string(),
            author_ids: vec![author.id],
            game_name: GAME_NAME.to_string(),
            visibility,
        })
        .await
        .expect("Failed to create mod")
}

pub async fn create_mod_version(
    store: &dyn BaseRegistryStore,
    owner: &Mod,
    version: &str,
    game_version_id: GameVersionId,
    visibility: Visibility,
) -> ModVersion {
    store
        .create_mod_version(NewModVersion {
            mod_id: owner.id,
            version: Version::parse(version).expect("Invalid fixture version"),
            platform: Platform::Universal,
            supported_game_version_ids: vec![game_version_id],
            dependencies: Vec::<ModVersionId>::new(),
            zip_hash: "fixture".to_string(),
            content_hashes: vec![],
            visibility,
            author_id: owner.author_ids[0],
        })
        .await
        .expect("Failed to create mod version")
}

// =============================================================================
// Catalog descriptors
// =============================================================================

/// Approved universal catalog entry for the default game version
pub fn catalog_mod(name: &str, version: &str) -> CatalogMod {
    CatalogMod {
        name: name.to_string(),
        version: version.to_string(),
        game_version: GAME_VERSION.to_string(),
        status: "approved".to_string(),
        description: format!("{} from the catalog", name),
        link: format!("https://github.com/example/{}", name),
        category: "Core".to_string(),
        downloads: vec![catalog_download("universal", name, version)],
        dependencies: vec![],
    }
}

pub fn catalog_download(kind: &str, name: &str, version: &str) -> CatalogDownload {
    CatalogDownload {
        kind: kind.to_string(),
        url: download_url(kind, name, version),
        hash_md5: vec![FileHash {
            hash: format!("md5-{}", name),
            file: format!("Plugins/{}.dll", name),
        }],
    }
}

pub fn download_url(kind: &str, name: &str, version: &str) -> String {
    format!("/uploads/{}/{}-{}.zip", kind, name, version)
}

pub fn named_dependency(name: &str) -> DependencyRef {
    DependencyRef::Named {
        name: name.to_string(),
    }
}

pub fn pinned_dependency(entry: CatalogMod) -> DependencyRef {
    DependencyRef::Exact(Box::new(entry))
}

pub trait CatalogModExt {
    fn with_status(self, status: &str) -> Self;
    fn with_category(self, category: &str) -> Self;
    fn with_dependencies(self, dependencies: Vec<DependencyRef>) -> Self;
    fn with_downloads(self, downloads: Vec<CatalogDownload>) -> Self;
    fn with_game_version(self, game_version: &str) -> Self;
}

impl CatalogModExt for CatalogMod {
    fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    fn with_dependencies(mut self, dependencies: Vec<DependencyRef>) -> Self {
        self.dependencies = dependencies;
        self
    }

    fn with_downloads(mut self, downloads: Vec<CatalogDownload>) -> Self {
        self.downloads = downloads;
        self
    }

    fn with_game_version(mut self, game_version: &str) -> Self {
        self.game_version = game_version.to_string();
        self
    }
}

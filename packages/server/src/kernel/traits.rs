// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Moderation and import rules are domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseRegistryStore, BaseCatalogSource)

use anyhow::Result;
use async_trait::async_trait;
use catalog_client::CatalogMod;
use semver::Version;

use crate::common::{
    EditId, GameVersionId, ModId, ModVersionId, Platform, StoreResult, UserId, Visibility,
};
use crate::domains::approval::models::{EditApproval, MergedTarget, NewEditApproval};
use crate::domains::mods::models::{
    GameVersion, Mod, ModVersion, NewGameVersion, NewMod, NewModVersion,
};
use crate::domains::users::models::{NewUser, User};

// =============================================================================
// Registry Store Trait (Infrastructure - persistence for every entity)
// =============================================================================

/// Entity store shared by the approval and import domains.
///
/// Creates enforce the registry's unique keys and report clashes as
/// `StoreError::ConstraintViolation`. Rows that cannot be decoded into their
/// domain type surface as `StoreError::Integrity`.
#[async_trait]
pub trait BaseRegistryStore: Send + Sync {
    // Users
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Service accounts have no external identity
    async fn find_service_account(&self, username: &str) -> StoreResult<Option<User>>;

    async fn create_user(&self, input: NewUser) -> StoreResult<User>;

    // Mods
    async fn find_mod(&self, id: ModId) -> StoreResult<Option<Mod>>;

    async fn find_mod_by_name(&self, name: &str, game_name: &str) -> StoreResult<Option<Mod>>;

    async fn list_mods_by_visibility(&self, visibility: Visibility) -> StoreResult<Vec<Mod>>;

    async fn create_mod(&self, input: NewMod) -> StoreResult<Mod>;

    async fn update_mod(&self, m: &Mod) -> StoreResult<Mod>;

    // Mod versions
    async fn find_mod_version(&self, id: ModVersionId) -> StoreResult<Option<ModVersion>>;

    async fn find_mod_version_by_key(
        &self,
        mod_id: ModId,
        version: &Version,
        platform: Platform,
    ) -> StoreResult<Option<ModVersion>>;

    async fn list_mod_versions_for_mod(&self, mod_id: ModId) -> StoreResult<Vec<ModVersion>>;

    async fn list_mod_versions_by_visibility(
        &self,
        visibility: Visibility,
    ) -> StoreResult<Vec<ModVersion>>;

    async fn create_mod_version(&self, input: NewModVersion) -> StoreResult<ModVersion>;

    async fn update_mod_version(&self, v: &ModVersion) -> StoreResult<ModVersion>;

    // Game versions
    async fn find_game_version(&self, id: GameVersionId) -> StoreResult<Option<GameVersion>>;

    async fn find_game_version_by_name(
        &self,
        version: &str,
        game_name: &str,
    ) -> StoreResult<Option<GameVersion>>;

    async fn create_game_version(&self, input: NewGameVersion) -> StoreResult<GameVersion>;

    // Edit approval queue
    async fn find_pending_edit(&self, id: EditId) -> StoreResult<Option<EditApproval>>;

    async fn list_pending_edits(&self) -> StoreResult<Vec<EditApproval>>;

    async fn create_edit(&self, input: NewEditApproval) -> StoreResult<EditApproval>;

    async fn update_edit(&self, edit: &EditApproval) -> StoreResult<EditApproval>;

    async fn delete_edit(&self, id: EditId) -> StoreResult<()>;

    /// Persist an accepted edit's merged target and mark the edit approved.
    ///
    /// Both writes land together or not at all. An edit that is missing or
    /// already approved yields `StoreError::ConstraintViolation`.
    async fn apply_edit(
        &self,
        target: &MergedTarget,
        edit: &EditApproval,
    ) -> StoreResult<EditApproval>;

    /// Liveness check used by the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}

// =============================================================================
// Catalog Source Trait (Infrastructure - external mod listing)
// =============================================================================

#[async_trait]
pub trait BaseCatalogSource: Send + Sync {
    /// Fetch the full listing for one game version
    async fn fetch_mods(&self, game_version: &str) -> Result<Vec<CatalogMod>>;

    /// Fetch raw artifact bytes from a catalog-relative path
    async fn download(&self, path: &str) -> Result<Vec<u8>>;
}

// =============================================================================
// Artifact Store Trait (Infrastructure - packaged zip storage)
// =============================================================================

#[async_trait]
pub trait BaseArtifactStore: Send + Sync {
    /// Persist an archive under its content hash
    async fn persist(&self, hash: &str, bytes: &[u8]) -> Result<()>;
}

//! Postgres-backed registry store.
//!
//! Each method delegates to the SQL living on the model types.

use async_trait::async_trait;
use semver::Version;
use sqlx::PgPool;

use crate::common::{
    EditId, GameVersionId, ModId, ModVersionId, Platform, StoreResult, UserId, Visibility,
};
use crate::domains::approval::models::{EditApproval, MergedTarget, NewEditApproval};
use crate::domains::mods::models::{
    GameVersion, Mod, ModVersion, NewGameVersion, NewMod, NewModVersion,
};
use crate::domains::users::models::{NewUser, User};
use crate::kernel::BaseRegistryStore;

#[derive(Clone)]
pub struct PostgresRegistryStore {
    pool: PgPool,
}

impl PostgresRegistryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseRegistryStore for PostgresRegistryStore {
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        User::find_by_id(id, &self.pool).await
    }

    async fn find_service_account(&self, username: &str) -> StoreResult<Option<User>> {
        User::find_service_account(username, &self.pool).await
    }

    async fn create_user(&self, input: NewUser) -> StoreResult<User> {
        User::create(input, &self.pool).await
    }

    async fn find_mod(&self, id: ModId) -> StoreResult<Option<Mod>> {
        Mod::find_by_id(id, &self.pool).await
    }

    async fn find_mod_by_name(&self, name: &str, game_name: &str) -> StoreResult<Option<Mod>> {
        Mod::find_by_name(name, game_name, &self.pool).await
    }

    async fn list_mods_by_visibility(&self, visibility: Visibility) -> StoreResult<Vec<Mod>> {
        Mod::find_by_visibility(visibility, &self.pool).await
    }

    async fn create_mod(&self, input: NewMod) -> StoreResult<Mod> {
        Mod::create(input, &self.pool).await
    }

    async fn update_mod(&self, m: &Mod) -> StoreResult<Mod> {
        Mod::update(m, &self.pool).await
    }

    async fn find_mod_version(&self, id: ModVersionId) -> StoreResult<Option<ModVersion>> {
        ModVersion::find_by_id(id, &self.pool).await
    }

    async fn find_mod_version_by_key(
        &self,
        mod_id: ModId,
        version: &Version,
        platform: Platform,
    ) -> StoreResult<Option<ModVersion>> {
        ModVersion::find_by_key(mod_id, version, platform, &self.pool).await
    }

    async fn list_mod_versions_for_mod(&self, mod_id: ModId) -> StoreResult<Vec<ModVersion>> {
        ModVersion::find_by_mod(mod_id, &self.pool).await
    }

    async fn list_mod_versions_by_visibility(
        &self,
        visibility: Visibility,
    ) -> StoreResult<Vec<ModVersion>> {
        ModVersion::find_by_visibility(visibility, &self.pool).await
    }

    async fn create_mod_version(&self, input: NewModVersion) -> StoreResult<ModVersion> {
        ModVersion::create(input, &self.pool).await
    }

    async fn update_mod_version(&self, v: &ModVersion) -> StoreResult<ModVersion> {
        ModVersion::update(v, &self.pool).await
    }

    async fn find_game_version(&self, id: GameVersionId) -> StoreResult<Option<GameVersion>> {
        GameVersion::find_by_id(id, &self.pool).await
    }

    async fn find_game_version_by_name(
        &self,
        version: &str,
        game_name: &str,
    ) -> StoreResult<Option<GameVersion>> {
        GameVersion::find_by_version(version, game_name, &self.pool).await
    }

    async fn create_game_version(&self, input: NewGameVersion) -> StoreResult<GameVersion> {
        GameVersion::create(input, &self.pool).await
    }

    async fn find_pending_edit(&self, id: EditId) -> StoreResult<Option<EditApproval>> {
        EditApproval::find_pending(id, &self.pool).await
    }

    async fn list_pending_edits(&self) -> StoreResult<Vec<EditApproval>> {
        EditApproval::find_all_pending(&self.pool).await
    }

    async fn create_edit(&self, input: NewEditApproval) -> StoreResult<EditApproval> {
        EditApproval::create(input, &self.pool).await
    }

    async fn update_edit(&self, edit: &EditApproval) -> StoreResult<EditApproval> {
        EditApproval::update(edit, &self.pool).await
    }

    async fn delete_edit(&self, id: EditId) -> StoreResult<()> {
        EditApproval::delete(id, &self.pool).await
    }

    async fn apply_edit(
        &self,
        target: &MergedTarget,
        edit: &EditApproval,
    ) -> StoreResult<EditApproval> {
        EditApproval::apply(target, edit, &self.pool).await
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

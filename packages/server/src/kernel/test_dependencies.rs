// TestDependencies - in-memory implementations for testing
//
// Provides a registry store and mock external services that can be injected
// into ServerDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use catalog_client::CatalogMod;
use chrono::Utc;
use semver::Version;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use super::{BaseArtifactStore, BaseCatalogSource, BaseRegistryStore, ServerDeps};
use crate::common::{
    EditId, GameVersionId, ModId, ModVersionId, Platform, StoreError, StoreResult, UserId,
    Visibility,
};
use crate::domains::approval::models::{
    decode_listable, EditApproval, EditApprovalRow, MergedTarget, NewEditApproval,
};
use crate::domains::auth::JwtService;
use crate::domains::import::ImportOptions;
use crate::domains::mods::models::{
    GameVersion, Mod, ModVersion, NewGameVersion, NewMod, NewModVersion,
};
use crate::domains::users::models::{NewUser, User};

// =============================================================================
// Memory Registry Store
// =============================================================================

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    mods: BTreeMap<i64, Mod>,
    mod_versions: BTreeMap<i64, ModVersion>,
    game_versions: BTreeMap<i64, GameVersion>,
    // Edits are kept in their persisted shape so decoding runs on every read
    edits: BTreeMap<i64, EditApprovalRow>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Store that keeps every table in memory and enforces the same unique keys
/// as the Postgres schema.
#[derive(Default)]
pub struct MemoryRegistryStore {
    tables: Mutex<Tables>,
}

impl MemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a queue row without validating its payload
    pub fn insert_raw_edit(
        &self,
        obj_table_name: &str,
        obj_id: i64,
        obj: serde_json::Value,
        submitter_id: UserId,
    ) -> EditId {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        tables.edits.insert(
            id,
            EditApprovalRow {
                id: EditId::new(id),
                obj_table_name: obj_table_name.to_string(),
                obj_id,
                obj,
                submitter_id,
                approved: false,
                created_at: Utc::now(),
            },
        );
        EditId::new(id)
    }

    /// Raw queue row, including approved ones
    pub fn edit_row(&self, id: EditId) -> Option<EditApprovalRow> {
        self.tables.lock().unwrap().edits.get(&id.get()).cloned()
    }

    pub fn all_mods(&self) -> Vec<Mod> {
        self.tables.lock().unwrap().mods.values().cloned().collect()
    }

    pub fn all_mod_versions(&self) -> Vec<ModVersion> {
        self.tables
            .lock()
            .unwrap()
            .mod_versions
            .values()
            .cloned()
            .collect()
    }

    pub fn all_game_versions(&self) -> Vec<GameVersion> {
        self.tables
            .lock()
            .unwrap()
            .game_versions
            .values()
            .cloned()
            .collect()
    }

    pub fn all_users(&self) -> Vec<User> {
        self.tables.lock().unwrap().users.values().cloned().collect()
    }
}

fn check_mod_write(tables: &Tables, m: &Mod) -> StoreResult<()> {
    if !tables.mods.contains_key(&m.id.get()) {
        return Err(StoreError::Backend(anyhow!("Mod {} does not exist", m.id)));
    }
    if tables
        .mods
        .values()
        .any(|other| other.id != m.id && other.name == m.name && other.game_name == m.game_name)
    {
        return Err(StoreError::ConstraintViolation(format!(
            "Mod {} already exists for {}",
            m.name, m.game_name
        )));
    }
    Ok(())
}

fn check_mod_version_write(tables: &Tables, v: &ModVersion) -> StoreResult<()> {
    if !tables.mod_versions.contains_key(&v.id.get()) {
        return Err(StoreError::Backend(anyhow!(
            "Mod version {} does not exist",
            v.id
        )));
    }
    if version_slot_taken(tables, v.mod_id, &v.version, v.platform, Some(v.id)) {
        return Err(StoreError::ConstraintViolation(format!(
            "Mod {} already has version {} for {}",
            v.mod_id, v.version, v.platform
        )));
    }
    Ok(())
}

fn version_slot_taken(
    tables: &Tables,
    mod_id: ModId,
    version: &Version,
    platform: Platform,
    except: Option<ModVersionId>,
) -> bool {
    tables.mod_versions.values().any(|v| {
        Some(v.id) != except && v.mod_id == mod_id && &v.version == version && v.platform == platform
    })
}

#[async_trait]
impl BaseRegistryStore for MemoryRegistryStore {
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables.lock().unwrap().users.get(&id.get()).cloned())
    }

    async fn find_service_account(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.username == username && u.github_id.is_none())
            .cloned())
    }

    async fn create_user(&self, input: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        let user = User {
            id: UserId::new(id),
            username: input.username,
            roles: input.roles,
            github_id: input.github_id,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_mod(&self, id: ModId) -> StoreResult<Option<Mod>> {
        Ok(self.tables.lock().unwrap().mods.get(&id.get()).cloned())
    }

    async fn find_mod_by_name(&self, name: &str, game_name: &str) -> StoreResult<Option<Mod>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .mods
            .values()
            .find(|m| m.name == name && m.game_name == game_name)
            .cloned())
    }

    async fn list_mods_by_visibility(&self, visibility: Visibility) -> StoreResult<Vec<Mod>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .mods
            .values()
            .filter(|m| m.visibility == visibility)
            .cloned()
            .collect())
    }

    async fn create_mod(&self, input: NewMod) -> StoreResult<Mod> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .mods
            .values()
            .any(|m| m.name == input.name && m.game_name == input.game_name)
        {
            return Err(StoreError::ConstraintViolation(format!(
                "Mod {} already exists for {}",
                input.name, input.game_name
            )));
        }

        let id = tables.next_id();
        let now = Utc::now();
        let m = Mod {
            id: ModId::new(id),
            name: input.name,
            description: input.description,
            category: input.category,
            git_url: input.git_url,
            icon_file_name: input.icon_file_name,
            author_ids: input.author_ids,
            game_name: input.game_name,
            visibility: input.visibility,
            created_at: now,
            updated_at: now,
        };
        tables.mods.insert(id, m.clone());
        Ok(m)
    }

    async fn update_mod(&self, m: &Mod) -> StoreResult<Mod> {
        let mut tables = self.tables.lock().unwrap();
        check_mod_write(&tables, m)?;

        let mut updated = m.clone();
        updated.updated_at = Utc::now();
        tables.mods.insert(m.id.get(), updated.clone());
        Ok(updated)
    }

    async fn find_mod_version(&self, id: ModVersionId) -> StoreResult<Option<ModVersion>> {
        Ok(self.tables.lock().unwrap().mod_versions.get(&id.get()).cloned())
    }

    async fn find_mod_version_by_key(
        &self,
        mod_id: ModId,
        version: &Version,
        platform: Platform,
    ) -> StoreResult<Option<ModVersion>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .mod_versions
            .values()
            .find(|v| v.mod_id == mod_id && &v.version == version && v.platform == platform)
            .cloned())
    }

    async fn list_mod_versions_for_mod(&self, mod_id: ModId) -> StoreResult<Vec<ModVersion>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .mod_versions
            .values()
            .filter(|v| v.mod_id == mod_id)
            .cloned()
            .collect())
    }

    async fn list_mod_versions_by_visibility(
        &self,
        visibility: Visibility,
    ) -> StoreResult<Vec<ModVersion>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .mod_versions
            .values()
            .filter(|v| v.visibility == visibility)
            .cloned()
            .collect())
    }

    async fn create_mod_version(&self, input: NewModVersion) -> StoreResult<ModVersion> {
        let mut tables = self.tables.lock().unwrap();
        if version_slot_taken(&tables, input.mod_id, &input.version, input.platform, None) {
            return Err(StoreError::ConstraintViolation(format!(
                "Mod {} already has version {} for {}",
                input.mod_id, input.version, input.platform
            )));
        }

        let id = tables.next_id();
        let now = Utc::now();
        let v = ModVersion {
            id: ModVersionId::new(id),
            mod_id: input.mod_id,
            version: input.version,
            platform: input.platform,
            supported_game_version_ids: input.supported_game_version_ids,
            dependencies: input.dependencies,
            zip_hash: input.zip_hash,
            content_hashes: input.content_hashes,
            visibility: input.visibility,
            author_id: input.author_id,
            created_at: now,
            updated_at: now,
        };
        tables.mod_versions.insert(id, v.clone());
        Ok(v)
    }

    async fn update_mod_version(&self, v: &ModVersion) -> StoreResult<ModVersion> {
        let mut tables = self.tables.lock().unwrap();
        check_mod_version_write(&tables, v)?;

        let mut updated = v.clone();
        updated.updated_at = Utc::now();
        tables.mod_versions.insert(v.id.get(), updated.clone());
        Ok(updated)
    }

    async fn find_game_version(&self, id: GameVersionId) -> StoreResult<Option<GameVersion>> {
        Ok(self.tables.lock().unwrap().game_versions.get(&id.get()).cloned())
    }

    async fn find_game_version_by_name(
        &self,
        version: &str,
        game_name: &str,
    ) -> StoreResult<Option<GameVersion>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .game_versions
            .values()
            .find(|g| g.version == version && g.game_name == game_name)
            .cloned())
    }

    async fn create_game_version(&self, input: NewGameVersion) -> StoreResult<GameVersion> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .game_versions
            .values()
            .any(|g| g.version == input.version && g.game_name == input.game_name)
        {
            return Err(StoreError::ConstraintViolation(format!(
                "Game version {} already exists for {}",
                input.version, input.game_name
            )));
        }

        let id = tables.next_id();
        let gv = GameVersion {
            id: GameVersionId::new(id),
            version: input.version,
            game_name: input.game_name,
        };
        tables.game_versions.insert(id, gv.clone());
        Ok(gv)
    }

    async fn find_pending_edit(&self, id: EditId) -> StoreResult<Option<EditApproval>> {
        let row = self
            .tables
            .lock()
            .unwrap()
            .edits
            .get(&id.get())
            .filter(|row| !row.approved)
            .cloned();
        row.map(EditApproval::try_from).transpose()
    }

    async fn list_pending_edits(&self) -> StoreResult<Vec<EditApproval>> {
        let rows: Vec<EditApprovalRow> = self
            .tables
            .lock()
            .unwrap()
            .edits
            .values()
            .filter(|row| !row.approved)
            .cloned()
            .collect();
        Ok(decode_listable(rows))
    }

    async fn create_edit(&self, input: NewEditApproval) -> StoreResult<EditApproval> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        let row = EditApprovalRow {
            id: EditId::new(id),
            obj_table_name: input.subject.table_name().to_string(),
            obj_id: input.subject.target_id(),
            obj: input.subject.payload_json(),
            submitter_id: input.submitter_id,
            approved: false,
            created_at: Utc::now(),
        };
        tables.edits.insert(id, row.clone());
        EditApproval::try_from(row)
    }

    async fn update_edit(&self, edit: &EditApproval) -> StoreResult<EditApproval> {
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .edits
            .get_mut(&edit.id.get())
            .ok_or_else(|| StoreError::Backend(anyhow!("Edit {} does not exist", edit.id)))?;
        row.obj = edit.subject.payload_json();
        row.approved = edit.approved;
        EditApproval::try_from(row.clone())
    }

    async fn delete_edit(&self, id: EditId) -> StoreResult<()> {
        self.tables.lock().unwrap().edits.remove(&id.get());
        Ok(())
    }

    async fn apply_edit(
        &self,
        target: &MergedTarget,
        edit: &EditApproval,
    ) -> StoreResult<EditApproval> {
        let mut tables = self.tables.lock().unwrap();

        // Every check runs before the first write so a failure leaves no trace
        if !tables
            .edits
            .get(&edit.id.get())
            .is_some_and(|row| !row.approved)
        {
            return Err(StoreError::ConstraintViolation(format!(
                "Edit {} is no longer pending",
                edit.id
            )));
        }
        match target {
            MergedTarget::Mod(m) => check_mod_write(&tables, m)?,
            MergedTarget::ModVersion(v) => check_mod_version_write(&tables, v)?,
        }

        let now = Utc::now();
        match target {
            MergedTarget::Mod(m) => {
                let mut updated = m.clone();
                updated.updated_at = now;
                tables.mods.insert(m.id.get(), updated);
            }
            MergedTarget::ModVersion(v) => {
                let mut updated = v.clone();
                updated.updated_at = now;
                tables.mod_versions.insert(v.id.get(), updated);
            }
        }

        let row = tables
            .edits
            .get_mut(&edit.id.get())
            .ok_or_else(|| StoreError::Backend(anyhow!("Edit {} does not exist", edit.id)))?;
        row.obj = edit.subject.payload_json();
        row.approved = true;
        EditApproval::try_from(row.clone())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

// =============================================================================
// Mock Catalog Source
// =============================================================================

pub struct MockCatalogSource {
    listing: Arc<Mutex<Vec<CatalogMod>>>,
    archives: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fetch_calls: Arc<Mutex<Vec<String>>>,
    download_calls: Arc<Mutex<Vec<String>>>,
    fail_fetch: bool,
}

impl MockCatalogSource {
    pub fn new() -> Self {
        Self {
            listing: Arc::new(Mutex::new(Vec::new())),
            archives: Arc::new(Mutex::new(HashMap::new())),
            fetch_calls: Arc::new(Mutex::new(Vec::new())),
            download_calls: Arc::new(Mutex::new(Vec::new())),
            fail_fetch: false,
        }
    }

    /// Catalog that refuses every listing request
    pub fn unreachable() -> Self {
        Self {
            fail_fetch: true,
            ..Self::new()
        }
    }

    pub fn with_listing(self, mods: Vec<CatalogMod>) -> Self {
        *self.listing.lock().unwrap() = mods;
        self
    }

    /// Serve `bytes` for downloads of `path`. Unknown paths fail.
    pub fn with_archive(self, path: &str, bytes: &[u8]) -> Self {
        self.archives
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        self
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn download_calls(&self) -> Vec<String> {
        self.download_calls.lock().unwrap().clone()
    }
}

impl Default for MockCatalogSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseCatalogSource for MockCatalogSource {
    async fn fetch_mods(&self, game_version: &str) -> Result<Vec<CatalogMod>> {
        self.fetch_calls
            .lock()
            .unwrap()
            .push(game_version.to_string());

        if self.fail_fetch {
            return Err(anyhow!("Catalog API error (503): unavailable"));
        }
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.download_calls.lock().unwrap().push(path.to_string());

        self.archives
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("Catalog API error (404): {}", path))
    }
}

// =============================================================================
// Mock Artifact Store
// =============================================================================

pub struct MockArtifactStore {
    persisted: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    fail: bool,
}

impl MockArtifactStore {
    pub fn new() -> Self {
        Self {
            persisted: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Store whose writes always fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn persisted_hashes(&self) -> Vec<String> {
        self.persisted
            .lock()
            .unwrap()
            .iter()
            .map(|(hash, _)| hash.clone())
            .collect()
    }
}

impl Default for MockArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseArtifactStore for MockArtifactStore {
    async fn persist(&self, hash: &str, bytes: &[u8]) -> Result<()> {
        if self.fail {
            return Err(anyhow!("disk full"));
        }
        self.persisted
            .lock()
            .unwrap()
            .push((hash.to_string(), bytes.to_vec()));
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

pub const TEST_JWT_SECRET: &str = "test-secret";
pub const TEST_JWT_ISSUER: &str = "mod-registry";

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<MemoryRegistryStore>,
    pub catalog: Arc<MockCatalogSource>,
    pub artifacts: Arc<MockArtifactStore>,
    pub import_options: ImportOptions,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryRegistryStore::new()),
            catalog: Arc::new(MockCatalogSource::new()),
            artifacts: Arc::new(MockArtifactStore::new()),
            import_options: ImportOptions::default(),
        }
    }

    /// Set a mock catalog
    pub fn mock_catalog(mut self, catalog: MockCatalogSource) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Set a mock artifact store
    pub fn mock_artifacts(mut self, artifacts: MockArtifactStore) -> Self {
        self.artifacts = Arc::new(artifacts);
        self
    }

    pub fn import_options(mut self, options: ImportOptions) -> Self {
        self.import_options = options;
        self
    }

    /// Convert into ServerDeps for testing
    pub fn into_deps(self) -> ServerDeps {
        ServerDeps::new(
            self.store,
            self.catalog,
            self.artifacts,
            Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
            self.import_options,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

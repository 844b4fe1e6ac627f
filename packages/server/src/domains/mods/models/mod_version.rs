use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::common::{
    GameVersionId, ModId, ModVersionId, Platform, StoreError, StoreResult, UserId, Visibility,
};

/// One packaged release of a mod for one platform.
///
/// (mod_id, version, platform) is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModVersion {
    pub id: ModVersionId,
    pub mod_id: ModId,
    #[serde(rename = "modVersion")]
    pub version: Version,
    pub platform: Platform,
    pub supported_game_version_ids: Vec<GameVersionId>,
    pub dependencies: Vec<ModVersionId>,
    pub zip_hash: String,
    pub content_hashes: Vec<ContentHash>,
    pub visibility: Visibility,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hash of a single file inside the packaged archive
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentHash {
    pub path: String,
    pub hash: String,
}

/// Input for creating a mod version
#[derive(Debug, Clone)]
pub struct NewModVersion {
    pub mod_id: ModId,
    pub version: Version,
    pub platform: Platform,
    pub supported_game_version_ids: Vec<GameVersionId>,
    pub dependencies: Vec<ModVersionId>,
    pub zip_hash: String,
    pub content_hashes: Vec<ContentHash>,
    pub visibility: Visibility,
    pub author_id: UserId,
}

impl ModVersion {
    pub fn supports(&self, game_version_id: GameVersionId) -> bool {
        self.supported_game_version_ids.contains(&game_version_id)
    }

    /// The game version a dependency of this release must also support.
    pub fn primary_game_version(&self) -> Option<GameVersionId> {
        self.supported_game_version_ids.first().copied()
    }

    /// Highest publicly visible version that supports `game_version_id`.
    pub fn latest_compatible(
        versions: &[ModVersion],
        game_version_id: GameVersionId,
    ) -> Option<&ModVersion> {
        versions
            .iter()
            .filter(|v| v.visibility.is_public() && v.supports(game_version_id))
            .max_by(|a, b| a.version.cmp(&b.version))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ModVersionRow {
    id: ModVersionId,
    mod_id: ModId,
    version: String,
    platform: String,
    supported_game_version_ids: Vec<GameVersionId>,
    dependencies: Vec<ModVersionId>,
    zip_hash: String,
    content_hashes: Json<Vec<ContentHash>>,
    visibility: String,
    author_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ModVersionRow> for ModVersion {
    type Error = StoreError;

    fn try_from(row: ModVersionRow) -> Result<Self, Self::Error> {
        let version = Version::parse(&row.version).map_err(|e| {
            StoreError::Integrity(format!(
                "Mod version {} has invalid semver {}: {}",
                row.id, row.version, e
            ))
        })?;
        let platform = row.platform.parse().map_err(|_| {
            StoreError::Integrity(format!(
                "Mod version {} has unknown platform {}",
                row.id, row.platform
            ))
        })?;
        let visibility = row.visibility.parse().map_err(|_| {
            StoreError::Integrity(format!(
                "Mod version {} has unknown visibility {}",
                row.id, row.visibility
            ))
        })?;

        Ok(ModVersion {
            id: row.id,
            mod_id: row.mod_id,
            version,
            platform,
            supported_game_version_ids: row.supported_game_version_ids,
            dependencies: row.dependencies,
            zip_hash: row.zip_hash,
            content_hashes: row.content_hashes.0,
            visibility,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn decode_all(rows: Vec<ModVersionRow>) -> StoreResult<Vec<ModVersion>> {
    rows.into_iter().map(ModVersion::try_from).collect()
}

// =============================================================================
// SQL Queries
// =============================================================================

impl ModVersion {
    pub async fn find_by_id(id: ModVersionId, pool: &PgPool) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, ModVersionRow>("SELECT * FROM mod_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(ModVersion::try_from)
            .transpose()
    }

    /// Find the release occupying a (mod, version, platform) slot
    pub async fn find_by_key(
        mod_id: ModId,
        version: &Version,
        platform: Platform,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, ModVersionRow>(
            "SELECT * FROM mod_versions WHERE mod_id = $1 AND version = $2 AND platform = $3",
        )
        .bind(mod_id)
        .bind(version.to_string())
        .bind(platform.to_string())
        .fetch_optional(pool)
        .await?
        .map(ModVersion::try_from)
        .transpose()
    }

    pub async fn find_by_mod(mod_id: ModId, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, ModVersionRow>(
            "SELECT * FROM mod_versions WHERE mod_id = $1 ORDER BY created_at ASC",
        )
        .bind(mod_id)
        .fetch_all(pool)
        .await?;

        decode_all(rows)
    }

    pub async fn find_by_visibility(visibility: Visibility, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, ModVersionRow>(
            "SELECT * FROM mod_versions WHERE visibility = $1 ORDER BY created_at ASC",
        )
        .bind(visibility.to_string())
        .fetch_all(pool)
        .await?;

        decode_all(rows)
    }

    pub async fn create(input: NewModVersion, pool: &PgPool) -> StoreResult<Self> {
        let row = sqlx::query_as::<_, ModVersionRow>(
            r#"
            INSERT INTO mod_versions (
                mod_id, version, platform, supported_game_version_ids, dependencies,
                zip_hash, content_hashes, visibility, author_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(input.mod_id)
        .bind(input.version.to_string())
        .bind(input.platform.to_string())
        .bind(&input.supported_game_version_ids)
        .bind(&input.dependencies)
        .bind(&input.zip_hash)
        .bind(Json(&input.content_hashes))
        .bind(input.visibility.to_string())
        .bind(input.author_id)
        .fetch_one(pool)
        .await?;

        ModVersion::try_from(row)
    }

    /// Persist every mutable field of `v`
    pub async fn update<'e>(v: &ModVersion, executor: impl PgExecutor<'e>) -> StoreResult<Self> {
        let row = sqlx::query_as::<_, ModVersionRow>(
            r#"
            UPDATE mod_versions
            SET version = $2,
                platform = $3,
                supported_game_version_ids = $4,
                dependencies = $5,
                zip_hash = $6,
                content_hashes = $7,
                visibility = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(v.id)
        .bind(v.version.to_string())
        .bind(v.platform.to_string())
        .bind(&v.supported_game_version_ids)
        .bind(&v.dependencies)
        .bind(&v.zip_hash)
        .bind(Json(&v.content_hashes))
        .bind(v.visibility.to_string())
        .fetch_one(executor)
        .await?;

        ModVersion::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(id: i64, version: &str, game_versions: &[i64], visibility: Visibility) -> ModVersion {
        ModVersion {
            id: ModVersionId::new(id),
            mod_id: ModId::new(1),
            version: Version::parse(version).unwrap(),
            platform: Platform::Universal,
            supported_game_version_ids: game_versions.iter().map(|g| GameVersionId::new(*g)).collect(),
            dependencies: vec![],
            zip_hash: String::new(),
            content_hashes: vec![],
            visibility,
            author_id: UserId::new(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_latest_compatible_picks_highest_semver() {
        let versions = vec![
            release(1, "1.9.0", &[10], Visibility::Verified),
            release(2, "1.10.0", &[10], Visibility::Unverified),
            release(3, "1.2.0", &[10], Visibility::Verified),
        ];

        let latest = ModVersion::latest_compatible(&versions, GameVersionId::new(10)).unwrap();
        assert_eq!(latest.id, ModVersionId::new(2));
    }

    #[test]
    fn test_latest_compatible_skips_other_game_versions_and_removed() {
        let versions = vec![
            release(1, "1.0.0", &[10], Visibility::Verified),
            release(2, "2.0.0", &[11], Visibility::Verified),
            release(3, "3.0.0", &[10], Visibility::Removed),
        ];

        let latest = ModVersion::latest_compatible(&versions, GameVersionId::new(10)).unwrap();
        assert_eq!(latest.id, ModVersionId::new(1));
        assert!(ModVersion::latest_compatible(&versions, GameVersionId::new(12)).is_none());
    }

    #[test]
    fn test_primary_game_version_is_first() {
        let v = release(1, "1.0.0", &[7, 8], Visibility::Verified);
        assert_eq!(v.primary_game_version(), Some(GameVersionId::new(7)));
        assert!(v.supports(GameVersionId::new(8)));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{Category, ModId, StoreError, StoreResult, UserId, Visibility};

/// Mod - a named package. Name is unique within a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Mod {
    pub id: ModId,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub git_url: String,
    pub icon_file_name: String,
    pub author_ids: Vec<UserId>,
    pub game_name: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mod {
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_ids.contains(&user_id)
    }
}

/// Input for creating a mod
#[derive(Debug, Clone)]
pub struct NewMod {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub git_url: String,
    pub icon_file_name: String,
    pub author_ids: Vec<UserId>,
    pub game_name: String,
    pub visibility: Visibility,
}

#[derive(Debug, sqlx::FromRow)]
struct ModRow {
    id: ModId,
    name: String,
    description: String,
    category: String,
    git_url: String,
    icon_file_name: String,
    author_ids: Vec<UserId>,
    game_name: String,
    visibility: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ModRow> for Mod {
    type Error = StoreError;

    fn try_from(row: ModRow) -> Result<Self, Self::Error> {
        let category = row.category.parse().map_err(|_| {
            StoreError::Integrity(format!("Mod {} has unknown category {}", row.id, row.category))
        })?;
        let visibility = row.visibility.parse().map_err(|_| {
            StoreError::Integrity(format!(
                "Mod {} has unknown visibility {}",
                row.id, row.visibility
            ))
        })?;

        Ok(Mod {
            id: row.id,
            name: row.name,
            description: row.description,
            category,
            git_url: row.git_url,
            icon_file_name: row.icon_file_name,
            author_ids: row.author_ids,
            game_name: row.game_name,
            visibility,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn decode_all(rows: Vec<ModRow>) -> StoreResult<Vec<Mod>> {
    rows.into_iter().map(Mod::try_from).collect()
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Mod {
    pub async fn find_by_id(id: ModId, pool: &PgPool) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, ModRow>("SELECT * FROM mods WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Mod::try_from)
            .transpose()
    }

    pub async fn find_by_name(name: &str, game_name: &str, pool: &PgPool) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, ModRow>("SELECT * FROM mods WHERE name = $1 AND game_name = $2")
            .bind(name)
            .bind(game_name)
            .fetch_optional(pool)
            .await?
            .map(Mod::try_from)
            .transpose()
    }

    pub async fn find_by_visibility(visibility: Visibility, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, ModRow>(
            "SELECT * FROM mods WHERE visibility = $1 ORDER BY created_at ASC",
        )
        .bind(visibility.to_string())
        .fetch_all(pool)
        .await?;

        decode_all(rows)
    }

    pub async fn create(input: NewMod, pool: &PgPool) -> StoreResult<Self> {
        let row = sqlx::query_as::<_, ModRow>(
            r#"
            INSERT INTO mods (name, description, category, git_url, icon_file_name, author_ids, game_name, visibility)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category.to_string())
        .bind(&input.git_url)
        .bind(&input.icon_file_name)
        .bind(&input.author_ids)
        .bind(&input.game_name)
        .bind(input.visibility.to_string())
        .fetch_one(pool)
        .await?;

        Mod::try_from(row)
    }

    /// Persist every mutable field of `m`
    pub async fn update<'e>(m: &Mod, executor: impl PgExecutor<'e>) -> StoreResult<Self> {
        let row = sqlx::query_as::<_, ModRow>(
            r#"
            UPDATE mods
            SET name = $2,
                description = $3,
                category = $4,
                git_url = $5,
                icon_file_name = $6,
                author_ids = $7,
                visibility = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(m.id)
        .bind(&m.name)
        .bind(&m.description)
        .bind(m.category.to_string())
        .bind(&m.git_url)
        .bind(&m.icon_file_name)
        .bind(&m.author_ids)
        .bind(m.visibility.to_string())
        .fetch_one(executor)
        .await?;

        Mod::try_from(row)
    }
}

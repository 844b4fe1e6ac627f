use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{GameVersionId, StoreResult};

/// A released version of a game. Looked up by (version, game_name).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GameVersion {
    pub id: GameVersionId,
    pub version: String,
    pub game_name: String,
}

#[derive(Debug, Clone)]
pub struct NewGameVersion {
    pub version: String,
    pub game_name: String,
}

impl GameVersion {
    pub async fn find_by_id(id: GameVersionId, pool: &PgPool) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM game_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_version(
        version: &str,
        game_name: &str,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM game_versions WHERE version = $1 AND game_name = $2",
        )
        .bind(version)
        .bind(game_name)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(input: NewGameVersion, pool: &PgPool) -> StoreResult<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO game_versions (version, game_name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&input.version)
        .bind(&input.game_name)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
